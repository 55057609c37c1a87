use anyhow::Result;
use unicode_segmentation::UnicodeSegmentation;

use crate::calc_engine::{evaluate_traced, AngleMode, EvalError, EvaluationTrace, Step};
use crate::display::{format_result, group_display};
use crate::history::History;
use crate::settings::{Settings, SettingsError};
use crate::store::Store;

/// What pressing `=` led to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(String),
    Error(EvalError),
    Unlock,
    OpenSettings,
}

/// Calculator state behind the display: the typed buffer, angle mode,
/// history and the secret that turns `=` into an unlock.
pub struct Session {
    input: String,
    angle_mode: AngleMode,
    history: History,
    settings: Settings,
    store: Option<Store>,
    pub detailed_mode: bool,
    pub last_steps: Vec<Step>,
}

impl Session {
    pub fn new(settings: Settings, history: History) -> Self {
        Session {
            input: String::new(),
            angle_mode: settings.initial_angle_mode(),
            history,
            settings,
            store: None,
            detailed_mode: false,
            last_steps: Vec::new(),
        }
    }

    /// Loads settings and history from `store` and saves back to it on change.
    pub fn open(store: Store) -> Result<Self> {
        let settings = store.load_settings()?;
        let history = store.load_history()?;
        log::info!(
            "session opened from {} with {} history entries",
            store.dir().display(),
            history.len()
        );
        let mut session = Session::new(settings, history);
        session.store = Some(store);
        Ok(session)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// What the display shows: the grouped buffer, or `0` when empty.
    pub fn display(&self) -> String {
        if self.input.is_empty() {
            "0".to_string()
        } else {
            group_display(&self.input, self.settings.group_separator)
        }
    }

    pub fn append(&mut self, text: &str) {
        if self.input == "0" && text != "." {
            self.input.clear();
        }
        self.input.push_str(text);
    }

    /// Appends `name(`, e.g. `sin(`.
    pub fn append_function(&mut self, name: &str) {
        if self.input == "0" {
            self.input.clear();
        }
        self.input.push_str(name);
        self.input.push('(');
    }

    /// Opens a group when parentheses are balanced or one was just opened,
    /// closes one otherwise.
    pub fn paren(&mut self) {
        let open = self.input.matches('(').count();
        let close = self.input.matches(')').count();
        if open == close || self.input.ends_with('(') {
            self.append("(");
        } else {
            self.append(")");
        }
    }

    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.input.grapheme_indices(true).next_back() {
            self.input.truncate(idx);
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    pub fn toggle_angle_mode(&mut self) {
        self.angle_mode = self.angle_mode.toggled();
        log::debug!("angle mode switched to {}", self.angle_mode);
    }

    /// Leaving the unlocked area must not leave the secret on screen.
    pub fn lock(&mut self) {
        self.input.clear();
        log::info!("locked");
    }

    pub fn submit(&mut self) -> Outcome {
        if self.input == self.settings.settings_code {
            log::info!("settings code entered");
            self.input.clear();
            return Outcome::OpenSettings;
        }
        if self.input == self.settings.secret {
            log::info!("secret entered, unlocking");
            return Outcome::Unlock;
        }

        let mut trace = EvaluationTrace::new(self.detailed_mode);
        let evaluated = evaluate_traced(&self.input, self.angle_mode, &mut trace).and_then(|v| {
            if v.is_finite() {
                Ok(v)
            } else {
                Err(EvalError::NonFiniteResult(v))
            }
        });
        self.last_steps = trace.steps;

        match evaluated {
            Ok(value) => {
                let shown = format_result(value);
                if self.input != shown {
                    self.history.push(format!("{} = {}", self.input, shown));
                    self.persist_history();
                }
                self.input = shown.clone();
                Outcome::Value(shown)
            }
            Err(e) => {
                log::debug!("evaluation of {:?} failed: {}", self.input, e);
                self.input.clear();
                Outcome::Error(e)
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }

    pub fn change_secret(&mut self, old: &str, new: &str) -> Result<(), SettingsError> {
        self.settings.change_secret(old, new)?;
        log::info!("secret changed");
        if let Some(store) = &self.store {
            if let Err(e) = store.save_settings(&self.settings) {
                log::warn!("could not save settings: {:#}", e);
            }
        }
        Ok(())
    }

    fn persist_history(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save_history(&self.history) {
                log::warn!("could not save history: {:#}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Settings::default(), History::new())
    }

    fn type_and_submit(session: &mut Session, keys: &str) -> Outcome {
        session.append(keys);
        session.submit()
    }

    #[test]
    fn value_is_formatted_and_recorded() {
        let mut s = session();
        assert_eq!(type_and_submit(&mut s, "1/3"), Outcome::Value("0.3333333333".to_string()));
        assert_eq!(s.input(), "0.3333333333");
        assert_eq!(s.history().get(0), Some("1/3 = 0.3333333333"));
    }

    #[test]
    fn result_can_be_continued() {
        let mut s = session();
        type_and_submit(&mut s, "2*3");
        assert_eq!(type_and_submit(&mut s, "+4"), Outcome::Value("10".to_string()));
        assert_eq!(s.history().get(0), Some("6+4 = 10"));
    }

    #[test]
    fn unchanged_value_is_not_recorded() {
        let mut s = session();
        assert_eq!(type_and_submit(&mut s, "42"), Outcome::Value("42".to_string()));
        assert!(s.history().is_empty());
    }

    #[test]
    fn secret_unlocks_without_evaluating() {
        let mut s = session();
        assert_eq!(type_and_submit(&mut s, "1234"), Outcome::Unlock);
        assert!(s.history().is_empty());
        assert_eq!(s.display(), "1,234");
        s.lock();
        assert_eq!(s.display(), "0");
    }

    #[test]
    fn settings_code_opens_settings() {
        let mut s = session();
        assert_eq!(type_and_submit(&mut s, "+0+0"), Outcome::OpenSettings);
        assert_eq!(s.input(), "");
    }

    #[test]
    fn failures_clear_the_buffer() {
        let mut s = session();
        assert!(matches!(type_and_submit(&mut s, "5/0"), Outcome::Error(EvalError::NonFiniteResult(_))));
        assert_eq!(s.display(), "0");
        assert_eq!(
            type_and_submit(&mut s, "xyz(5)"),
            Outcome::Error(EvalError::UnknownToken("xyz".to_string()))
        );
        assert_eq!(type_and_submit(&mut s, ""), Outcome::Error(EvalError::UnexpectedEnd));
        assert!(s.history().is_empty());
    }

    #[test]
    fn leading_zero_is_replaced() {
        let mut s = session();
        s.append("0");
        s.append("7");
        assert_eq!(s.input(), "7");

        s.clear();
        s.append("0");
        s.append(".");
        s.append("5");
        assert_eq!(s.input(), "0.5");

        s.clear();
        s.append("0");
        s.append_function("sin");
        assert_eq!(s.input(), "sin(");
    }

    #[test]
    fn paren_key_balances() {
        let mut s = session();
        s.paren();
        s.paren();
        assert_eq!(s.input(), "((");
        s.append("2+3");
        s.paren();
        assert_eq!(s.input(), "((2+3)");
        s.paren();
        s.paren();
        assert_eq!(s.input(), "((2+3))(");
    }

    #[test]
    fn backspace_removes_whole_symbols() {
        let mut s = session();
        s.append("2*π");
        s.backspace();
        assert_eq!(s.input(), "2*");
        s.clear();
        s.backspace();
        assert_eq!(s.input(), "");
    }

    #[test]
    fn angle_mode_is_applied() {
        let mut s = session();
        assert_eq!(type_and_submit(&mut s, "sin(90)"), Outcome::Value("1".to_string()));
        s.toggle_angle_mode();
        s.clear();
        assert_eq!(type_and_submit(&mut s, "asin(1)"), Outcome::Value("1.5707963268".to_string()));
    }

    #[test]
    fn change_secret_takes_effect() {
        let mut s = session();
        assert_eq!(s.change_secret("0000", "55"), Err(SettingsError::WrongSecret));
        s.change_secret("1234", "55").unwrap();
        assert_eq!(type_and_submit(&mut s, "1234"), Outcome::Value("1234".to_string()));
        s.clear();
        assert_eq!(type_and_submit(&mut s, "55"), Outcome::Unlock);
    }

    #[test]
    fn details_mode_keeps_steps() {
        let mut s = session();
        s.detailed_mode = true;
        type_and_submit(&mut s, "2+3*4");
        assert_eq!(s.last_steps.len(), 2);
    }
}

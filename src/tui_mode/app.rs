use calcvault::calc_engine::EvalError;
use calcvault::session::{Outcome, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Calculator,
    Help,
    Unlocked,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    OldSecret,
    NewSecret,
}

pub struct SettingsForm {
    pub old_secret: String,
    pub new_secret: String,
    pub focus: SettingsField,
    pub message: Option<String>,
}

impl SettingsForm {
    fn new() -> Self {
        SettingsForm {
            old_secret: String::new(),
            new_secret: String::new(),
            focus: SettingsField::OldSecret,
            message: None,
        }
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            SettingsField::OldSecret => &mut self.old_secret,
            SettingsField::NewSecret => &mut self.new_secret,
        }
    }

    pub fn switch_focus(&mut self) {
        self.focus = match self.focus {
            SettingsField::OldSecret => SettingsField::NewSecret,
            SettingsField::NewSecret => SettingsField::OldSecret,
        };
    }
}

pub struct App {
    pub session: Session,
    pub screen: Screen,
    pub last_error: Option<EvalError>,
    pub settings_form: SettingsForm,
    pub should_quit: bool,
    pub help_scroll: usize,
    pub history_scroll: usize,
    pub list_height: usize,
    pub terminal_too_small: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        App {
            session,
            screen: Screen::Calculator,
            last_error: None,
            settings_form: SettingsForm::new(),
            should_quit: false,
            help_scroll: 0,
            history_scroll: 0,
            list_height: 5,
            terminal_too_small: false,
        }
    }

    /// The calculator display: `Error` right after a failure, else the grouped input.
    pub fn display_text(&self) -> String {
        if self.last_error.is_some() {
            "Error".to_string()
        } else {
            self.session.display()
        }
    }

    /// Maps a typed character onto a calculator key.
    pub fn press_char(&mut self, c: char) {
        self.last_error = None;
        match c {
            '=' => self.submit(),
            'p' => self.session.append("π"),
            'r' => self.session.append_function("√"),
            '0'..='9' | '.' | '+' | '-' | '*' | '/' | '%' | '^' | '!' | '(' | ')' | 'π' | '√' => {
                let mut buf = [0u8; 4];
                self.session.append(c.encode_utf8(&mut buf));
            }
            c if c.is_ascii_lowercase() => {
                let mut buf = [0u8; 4];
                self.session.append(c.encode_utf8(&mut buf));
            }
            _ => {}
        }
    }

    pub fn paren(&mut self) {
        self.last_error = None;
        self.session.paren();
    }

    pub fn backspace(&mut self) {
        self.last_error = None;
        self.session.backspace();
    }

    pub fn clear_input(&mut self) {
        self.last_error = None;
        self.session.clear();
    }

    pub fn submit(&mut self) {
        match self.session.submit() {
            Outcome::Value(_) => {
                self.last_error = None;
                self.history_scroll = 0;
            }
            Outcome::Error(e) => self.last_error = Some(e),
            Outcome::Unlock => self.screen = Screen::Unlocked,
            Outcome::OpenSettings => {
                self.settings_form = SettingsForm::new();
                self.screen = Screen::Settings;
            }
        }
    }

    pub fn lock(&mut self) {
        self.session.lock();
        self.screen = Screen::Calculator;
    }

    pub fn submit_settings(&mut self) {
        if self.settings_form.focus == SettingsField::OldSecret {
            self.settings_form.switch_focus();
            return;
        }

        let form = &mut self.settings_form;
        match self.session.change_secret(&form.old_secret, &form.new_secret) {
            Ok(()) => {
                self.screen = Screen::Calculator;
                self.settings_form = SettingsForm::new();
            }
            Err(e) => {
                form.message = Some(e.to_string());
                form.old_secret.clear();
                form.new_secret.clear();
                form.focus = SettingsField::OldSecret;
            }
        }
    }

    pub fn scroll_history(&mut self, direction: i32) {
        let step = self.list_height.saturating_sub(1).max(1);
        if direction < 0 {
            self.history_scroll = self.history_scroll.saturating_sub(step);
        } else {
            self.history_scroll = self
                .history_scroll
                .saturating_add(step)
                .min(self.session.history().len().saturating_sub(1));
        }
    }
}

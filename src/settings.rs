use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calc_engine::AngleMode;

pub const DEFAULT_SECRET: &str = "1234";
pub const DEFAULT_SETTINGS_CODE: &str = "+0+0";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("Wrong old secret")]
    WrongSecret,

    #[error("New secret cannot be empty")]
    EmptySecret,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Typed on the calculator and confirmed with `=` to unlock.
    pub secret: String,
    /// Typed the same way to open the settings screen.
    pub settings_code: String,
    pub group_separator: char,
    pub start_in_degrees: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            secret: DEFAULT_SECRET.to_string(),
            settings_code: DEFAULT_SETTINGS_CODE.to_string(),
            group_separator: ',',
            start_in_degrees: true,
        }
    }
}

impl Settings {
    pub fn initial_angle_mode(&self) -> AngleMode {
        if self.start_in_degrees {
            AngleMode::Degree
        } else {
            AngleMode::Radian
        }
    }

    pub fn change_secret(&mut self, old: &str, new: &str) -> Result<(), SettingsError> {
        if old != self.secret {
            return Err(SettingsError::WrongSecret);
        }
        if new.is_empty() {
            return Err(SettingsError::EmptySecret);
        }
        self.secret = new.to_string();
        Ok(())
    }
}

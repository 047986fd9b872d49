//! A simple [`PreferenceSource`]: a map of user settings, that can be read from a JSON file

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SyncResult;
use crate::traits::PreferenceSource;

/// Key of the "enable reminders" setting
pub const REMINDER_ENABLED_KEY: &str = "calendarReminder";
/// Key of the reminder lead time setting, in minutes, stored as text
pub const REMINDER_INTERVAL_KEY: &str = "calendarReminderInterval";
/// Key of the "also show done tasks" setting
pub const SHOW_DONE_KEY: &str = "calendarShowDone";
/// Key of the "also show habits" setting
pub const SHOW_HABITS_KEY: &str = "calendarHabits";
/// Key of the display name of the target calendar
pub const CALENDAR_NAME_KEY: &str = "calendarName";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Text(String),
}

/// User settings, as a flat map of values
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    values: HashMap<String, PreferenceValue>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from a JSON object, such as `{"calendarName": "Org", "calendarReminder": true}`
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), PreferenceValue::Bool(value));
    }

    pub fn set_string(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), PreferenceValue::Text(value));
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

impl PreferenceSource for Preferences {
    /// Booleans stored as text (`"true"`/`"false"`) are accepted too
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            None => default,
            Some(PreferenceValue::Bool(b)) => *b,
            Some(PreferenceValue::Text(s)) => match s.trim().parse::<bool>() {
                Ok(b) => b,
                Err(_) => {
                    log::warn!("Setting {} is not a boolean ({:?}), using {}", key, s, default);
                    default
                },
            },
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key) {
            None => None,
            Some(PreferenceValue::Text(s)) => Some(s.clone()),
            Some(PreferenceValue::Bool(b)) => Some(b.to_string()),
        }
    }
}

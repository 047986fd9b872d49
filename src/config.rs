//! Support for library configuration options, and the per-sync snapshot of user settings

use std::collections::HashSet;

use crate::calendar::{self, CalendarId};
use crate::error::{SyncError, SyncResult};
use crate::settings::{CALENDAR_NAME_KEY, REMINDER_ENABLED_KEY, REMINDER_INTERVAL_KEY, SHOW_DONE_KEY, SHOW_HABITS_KEY};
use crate::traits::{CalendarStore, PreferenceSource, TodoKeywordRegistry};

/// Tag that starts the description of every event this crate writes.
/// Only events carrying it are ever deleted. See [`CalendarSync::with_owner_tag`](crate::CalendarSync::with_owner_tag) to use another one.
pub const DEFAULT_OWNER_TAG: &str = "MobileOrg";

/// The aggregated agenda file. It only repeats entries of the other files, so full syncs leave it alone
pub const AGENDA_FILE: &str = "agendas.org";

/// Longest accepted reminder lead time, in minutes (four weeks)
pub const MAX_REMINDER_MINUTES: i64 = 4 * 7 * 24 * 60;

/// User settings, as they were when a sync started
///
/// A snapshot is built by [`SyncConfig::refresh`] at the beginning of every sync operation and never changes afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncConfig {
    calendar_name: String,
    calendar_id: Option<CalendarId>,
    reminder_enabled: bool,
    reminder_minutes: i64,
    show_done: bool,
    show_habits: bool,
    todo_keywords: HashSet<String>,
    active_todo_keywords: HashSet<String>,
}

impl SyncConfig {
    /// Read the current settings, look up the target calendar and the todo keywords.
    ///
    /// This fails with [`SyncError::Configuration`] when reminders are enabled without a valid lead time.
    /// A calendar that cannot be found is not an error yet, see [`Self::calendar_id`]
    pub async fn refresh<P, S, K>(prefs: &P, store: &S, keywords: &K) -> SyncResult<Self>
    where
        P: PreferenceSource + ?Sized,
        S: CalendarStore + ?Sized,
        K: TodoKeywordRegistry + ?Sized,
    {
        let reminder_enabled = prefs.get_bool(REMINDER_ENABLED_KEY, false);
        let reminder_minutes = if reminder_enabled {
            parse_reminder_interval(prefs.get_string(REMINDER_INTERVAL_KEY))?
        } else {
            0
        };

        let show_done = prefs.get_bool(SHOW_DONE_KEY, true);
        let show_habits = prefs.get_bool(SHOW_HABITS_KEY, true);
        let calendar_name = prefs.get_string(CALENDAR_NAME_KEY).unwrap_or_default();
        let calendar_id = calendar::resolve(store, &calendar_name).await;

        let todo_keywords = keywords.todo_keywords().await?;
        let active_todo_keywords = keywords.active_todo_keywords().await?;

        log::debug!("Settings: calendar {:?} ({:?}), reminders {} ({} min), show done {}, show habits {}",
            calendar_name, calendar_id, reminder_enabled, reminder_minutes, show_done, show_habits);

        Ok(Self {
            calendar_name,
            calendar_id,
            reminder_enabled,
            reminder_minutes,
            show_done,
            show_habits,
            todo_keywords,
            active_todo_keywords,
        })
    }

    pub fn calendar_name(&self) -> &str              { &self.calendar_name    }
    /// The id of the configured calendar, or `None` in case the store has no calendar with this name
    pub fn calendar_id(&self) -> Option<CalendarId>  { self.calendar_id       }
    pub fn reminder_enabled(&self) -> bool           { self.reminder_enabled  }
    pub fn reminder_minutes(&self) -> i64            { self.reminder_minutes  }
    pub fn show_done(&self) -> bool                  { self.show_done         }
    pub fn show_habits(&self) -> bool                { self.show_habits       }
    pub fn todo_keywords(&self) -> &HashSet<String>         { &self.todo_keywords        }
    pub fn active_todo_keywords(&self) -> &HashSet<String>  { &self.active_todo_keywords }

    /// Whether a task with this todo keyword is still to be done.
    /// Unknown (or empty) keywords are considered active
    pub fn is_active(&self, todo: &str) -> bool {
        if self.todo_keywords.contains(todo) {
            self.active_todo_keywords.contains(todo)
        } else {
            true
        }
    }
}

fn parse_reminder_interval(value: Option<String>) -> SyncResult<i64> {
    let text = match value {
        None => return Err(SyncError::Configuration("Missing calendar reminder interval".to_string())),
        Some(t) => t,
    };
    match text.trim().parse::<i64>() {
        Ok(minutes) if minutes > MAX_REMINDER_MINUTES => Err(SyncError::Configuration(
            format!("Calendar reminder interval is too long: {} minutes, at most {} are allowed", minutes, MAX_REMINDER_MINUTES)
        )),
        Ok(minutes) if minutes >= 0 => Ok(minutes),
        _ => Err(SyncError::Configuration(format!("Invalid calendar reminder interval: {:?}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Preferences;
    use crate::source::MemorySource;
    use crate::store::MemoryStore;

    fn keywords() -> MemorySource {
        MemorySource::with_keywords(
            vec!["TODO".to_string(), "NEXT".to_string(), "DONE".to_string()],
            vec!["TODO".to_string(), "NEXT".to_string()],
        )
    }

    #[tokio::test]
    async fn defaults() {
        let store = MemoryStore::new();
        let config = SyncConfig::refresh(&Preferences::new(), &store, &keywords()).await.unwrap();

        assert_eq!(config.reminder_enabled(), false);
        assert_eq!(config.reminder_minutes(), 0);
        assert_eq!(config.show_done(), true);
        assert_eq!(config.show_habits(), true);
        assert_eq!(config.calendar_name(), "");
        assert_eq!(config.calendar_id(), None);
    }

    #[tokio::test]
    async fn reminder_interval_is_checked_only_when_enabled() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::new();
        prefs.set_string(REMINDER_INTERVAL_KEY, "soon".to_string());
        assert!(SyncConfig::refresh(&prefs, &store, &keywords()).await.is_ok());

        prefs.set_bool(REMINDER_ENABLED_KEY, true);
        match SyncConfig::refresh(&prefs, &store, &keywords()).await {
            Err(SyncError::Configuration(_)) => (),
            other => panic!("Unexpected result {:?}", other),
        }

        prefs.remove(REMINDER_INTERVAL_KEY);
        match SyncConfig::refresh(&prefs, &store, &keywords()).await {
            Err(SyncError::Configuration(_)) => (),
            other => panic!("Unexpected result {:?}", other),
        }

        prefs.set_string(REMINDER_INTERVAL_KEY, "1000000000000".to_string());
        match SyncConfig::refresh(&prefs, &store, &keywords()).await {
            Err(SyncError::Configuration(_)) => (),
            other => panic!("Unexpected result {:?}", other),
        }

        prefs.set_string(REMINDER_INTERVAL_KEY, MAX_REMINDER_MINUTES.to_string());
        let config = SyncConfig::refresh(&prefs, &store, &keywords()).await.unwrap();
        assert_eq!(config.reminder_minutes(), MAX_REMINDER_MINUTES);

        prefs.set_string(REMINDER_INTERVAL_KEY, " 10 ".to_string());
        let config = SyncConfig::refresh(&prefs, &store, &keywords()).await.unwrap();
        assert_eq!(config.reminder_minutes(), 10);
    }

    #[tokio::test]
    async fn calendar_is_resolved() {
        let mut store = MemoryStore::new();
        store.add_calendar("Home".to_string());
        let work = store.add_calendar("Work".to_string());
        let mut prefs = Preferences::new();
        prefs.set_string(CALENDAR_NAME_KEY, "Work".to_string());

        let config = SyncConfig::refresh(&prefs, &store, &keywords()).await.unwrap();
        assert_eq!(config.calendar_id(), Some(work));

        prefs.set_string(CALENDAR_NAME_KEY, "Missing".to_string());
        let config = SyncConfig::refresh(&prefs, &store, &keywords()).await.unwrap();
        assert_eq!(config.calendar_id(), None);
        assert_eq!(config.calendar_name(), "Missing");
    }

    #[tokio::test]
    async fn active_keywords() {
        let store = MemoryStore::new();
        let config = SyncConfig::refresh(&Preferences::new(), &store, &keywords()).await.unwrap();

        assert!(config.is_active("TODO"));
        assert!(config.is_active("NEXT"));
        assert!(config.is_active("DONE") == false);
        assert!(config.is_active("WAITING"));
        assert!(config.is_active(""));
    }
}

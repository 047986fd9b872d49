//! The external collaborators of a [`CalendarSync`](crate::CalendarSync)

use std::collections::HashSet;

use async_trait::async_trait;

use crate::calendar::CalendarInfo;
use crate::error::SyncResult;
use crate::event::{Alert, CalendarEntry, EventId, Reminder, ReminderId};
use crate::store::{DescriptionFilter, StoreCapabilities};
use crate::task::{RecordId, TaskRecord};

/// Where the scheduled tasks come from
#[async_trait]
pub trait TaskSource {
    /// Returns the names of every task file this source knows
    async fn file_names(&self) -> SyncResult<Vec<String>>;

    /// Returns the scheduled records of a file.
    /// Habits are left out unless `include_habits` is set.
    ///
    /// Fails with [`SyncError::FileNotFound`](crate::SyncError::FileNotFound) for unknown files
    async fn file_schedule(&self, file_name: &str, include_habits: bool) -> SyncResult<Vec<TaskRecord>>;

    /// Fails with [`SyncError::RecordNotFound`](crate::SyncError::RecordNotFound) for unknown records
    async fn get_record(&self, id: RecordId) -> SyncResult<TaskRecord>;

    /// Returns the name of the file a record comes from.
    ///
    /// Fails with [`SyncError::FileNotFound`](crate::SyncError::FileNotFound) when it cannot be told
    async fn get_record_file(&self, id: RecordId) -> SyncResult<String>;
}

/// Knows which todo keywords exist, and which of them mean "not done yet"
#[async_trait]
pub trait TodoKeywordRegistry {
    /// Every known todo keyword
    async fn todo_keywords(&self) -> SyncResult<HashSet<String>>;
    /// The subset of [`Self::todo_keywords`] that are not "done" states
    async fn active_todo_keywords(&self) -> SyncResult<HashSet<String>>;
}

/// A calendar storage, that holds events, reminders and (maybe) alerts
#[async_trait]
pub trait CalendarStore {
    /// What this store supports besides events and reminders
    fn capabilities(&self) -> StoreCapabilities;

    /// Returns the calendars of this store, in store order
    async fn get_calendars(&self) -> SyncResult<Vec<CalendarInfo>>;

    /// Returns every event of this store, along with its id
    async fn get_events(&self) -> SyncResult<Vec<(EventId, CalendarEntry)>>;

    /// Insert an event and return the id the store gave it
    async fn insert_event(&mut self, entry: CalendarEntry) -> SyncResult<EventId>;

    /// Delete every event matching the filter (and its reminders and alerts).
    /// Returns how many events have been deleted
    async fn delete_events(&mut self, filter: &DescriptionFilter) -> SyncResult<usize>;

    /// Set the "has alarm" flag of an event
    async fn update_event_alarm(&mut self, id: EventId, has_alarm: bool) -> SyncResult<()>;

    async fn insert_reminder(&mut self, reminder: Reminder) -> SyncResult<ReminderId>;

    /// Only called when [`Self::capabilities`] contain [`StoreCapabilities::ALERTS`]
    async fn insert_alert(&mut self, alert: Alert) -> SyncResult<()>;
}

/// Where user settings are read from
pub trait PreferenceSource {
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn get_string(&self, key: &str) -> Option<String>;
}

//! Calendar stores this crate can write into
//!
//! Two [`CalendarStore`] implementations are provided: a [`MemoryStore`], and a [`FileStore`] that persists the very same data to a JSON file.
//! [`StoreHandle::probe`] picks the one the environment supports, once and for all.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarId, CalendarInfo};
use crate::error::{SyncError, SyncResult};
use crate::event::{Alert, CalendarEntry, EventId, Reminder, ReminderId};
use crate::traits::CalendarStore;

mod memory_store;
pub use memory_store::MemoryStore;
mod file_store;
pub use file_store::FileStore;

bitflags! {
    /// Optional features of a calendar store
    pub struct StoreCapabilities: u8 {
        /// The store keeps alert instances besides reminders
        const ALERTS = 1;
    }
}

impl Default for StoreCapabilities {
    fn default() -> Self {
        StoreCapabilities::ALERTS
    }
}


/// Selects events by the beginning of their description
///
/// An empty prefix matches nothing: this prevents deleting events this crate does not own.
#[derive(Clone, Debug, PartialEq)]
pub struct DescriptionFilter {
    prefix: String,
    excluded_prefixes: Vec<String>,
}

impl DescriptionFilter {
    pub fn starting_with(prefix: String) -> Self {
        Self { prefix, excluded_prefixes: Vec::new() }
    }

    /// Do not match descriptions that start with `prefix`, even if they would match otherwise
    pub fn excluding(mut self, prefix: String) -> Self {
        self.excluded_prefixes.push(prefix);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, description: &str) -> bool {
        if self.prefix.is_empty() {
            return false;
        }
        description.starts_with(&self.prefix)
            && self.excluded_prefixes.iter().all(|excluded| description.starts_with(excluded.as_str()) == false)
    }
}


/// The contents of a store
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoreData {
    calendars: Vec<CalendarInfo>,
    events: BTreeMap<EventId, CalendarEntry>,
    reminders: BTreeMap<ReminderId, Reminder>,
    alerts: Vec<Alert>,
    last_calendar_id: CalendarId,
    last_event_id: EventId,
    last_reminder_id: ReminderId,
}

impl StoreData {
    fn add_calendar(&mut self, display_name: String) -> CalendarId {
        self.last_calendar_id += 1;
        self.calendars.push(CalendarInfo::new(self.last_calendar_id, display_name));
        self.last_calendar_id
    }

    fn insert_event(&mut self, entry: CalendarEntry) -> EventId {
        self.last_event_id += 1;
        self.events.insert(self.last_event_id, entry);
        self.last_event_id
    }

    /// Removes the matching events, along with their reminders and alerts
    fn delete_events(&mut self, filter: &DescriptionFilter) -> usize {
        let doomed: Vec<EventId> = self.events.iter()
            .filter(|(_, entry)| filter.matches(entry.description()))
            .map(|(id, _)| *id)
            .collect();

        for id in &doomed {
            self.events.remove(id);
        }
        self.reminders.retain(|_, reminder| doomed.contains(&reminder.event_id()) == false);
        self.alerts.retain(|alert| doomed.contains(&alert.event_id()) == false);
        doomed.len()
    }

    fn update_event_alarm(&mut self, id: EventId, has_alarm: bool) -> SyncResult<()> {
        match self.events.get_mut(&id) {
            None => Err(SyncError::Store(format!("No event with id {}", id))),
            Some(entry) => {
                entry.set_has_alarm(has_alarm);
                Ok(())
            },
        }
    }

    fn insert_reminder(&mut self, reminder: Reminder) -> SyncResult<ReminderId> {
        if self.events.contains_key(&reminder.event_id()) == false {
            return Err(SyncError::Store(format!("Cannot add a reminder to missing event {}", reminder.event_id())));
        }
        self.last_reminder_id += 1;
        self.reminders.insert(self.last_reminder_id, reminder);
        Ok(self.last_reminder_id)
    }

    fn insert_alert(&mut self, alert: Alert) -> SyncResult<()> {
        if self.events.contains_key(&alert.event_id()) == false {
            return Err(SyncError::Store(format!("Cannot add an alert to missing event {}", alert.event_id())));
        }
        self.alerts.push(alert);
        Ok(())
    }

    fn event_list(&self) -> Vec<(EventId, CalendarEntry)> {
        self.events.iter()
            .map(|(id, entry)| (*id, entry.clone()))
            .collect()
    }
}


/// A calendar store, whose actual kind has been picked at startup
#[derive(Debug)]
pub enum StoreHandle {
    Memory(MemoryStore),
    File(FileStore),
}

impl StoreHandle {
    /// Find out which store the environment supports.
    ///
    /// * no path: a [`MemoryStore`]
    /// * a path to a valid store file: a [`FileStore`] loaded from it
    /// * a path to an invalid store file, or to a missing file in an existing folder: an empty [`FileStore`]
    /// * a path in a missing folder: a [`MemoryStore`]
    pub fn probe(path: Option<&Path>) -> Self {
        let path = match path {
            None => {
                log::debug!("No store file given, using an in-memory store");
                return StoreHandle::Memory(MemoryStore::new());
            },
            Some(p) => p,
        };

        if path.is_file() {
            return match FileStore::from_file(path) {
                Ok(store) => StoreHandle::File(store),
                Err(err) => {
                    log::warn!("Invalid store file {:?}: {}. Using an empty store", path, err);
                    StoreHandle::File(FileStore::new(path))
                },
            };
        }

        let folder_exists = match path.parent() {
            None => false,
            Some(parent) => parent.as_os_str().is_empty() || parent.is_dir(),
        };
        if folder_exists {
            log::info!("Creating a new store file at {:?}", path);
            StoreHandle::File(FileStore::new(path))
        } else {
            log::warn!("Unable to keep a store file at {:?}. Using an in-memory store", path);
            StoreHandle::Memory(MemoryStore::new())
        }
    }

    /// Add a calendar to the underlying store
    pub fn add_calendar(&mut self, display_name: String) -> SyncResult<CalendarId> {
        match self {
            StoreHandle::Memory(s) => Ok(s.add_calendar(display_name)),
            StoreHandle::File(s) => s.add_calendar(display_name),
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, StoreHandle::File(_))
    }
}

#[async_trait]
impl CalendarStore for StoreHandle {
    fn capabilities(&self) -> StoreCapabilities {
        match self {
            StoreHandle::Memory(s) => s.capabilities(),
            StoreHandle::File(s) => s.capabilities(),
        }
    }

    async fn get_calendars(&self) -> SyncResult<Vec<CalendarInfo>> {
        match self {
            StoreHandle::Memory(s) => s.get_calendars().await,
            StoreHandle::File(s) => s.get_calendars().await,
        }
    }

    async fn get_events(&self) -> SyncResult<Vec<(EventId, CalendarEntry)>> {
        match self {
            StoreHandle::Memory(s) => s.get_events().await,
            StoreHandle::File(s) => s.get_events().await,
        }
    }

    async fn insert_event(&mut self, entry: CalendarEntry) -> SyncResult<EventId> {
        match self {
            StoreHandle::Memory(s) => s.insert_event(entry).await,
            StoreHandle::File(s) => s.insert_event(entry).await,
        }
    }

    async fn delete_events(&mut self, filter: &DescriptionFilter) -> SyncResult<usize> {
        match self {
            StoreHandle::Memory(s) => s.delete_events(filter).await,
            StoreHandle::File(s) => s.delete_events(filter).await,
        }
    }

    async fn update_event_alarm(&mut self, id: EventId, has_alarm: bool) -> SyncResult<()> {
        match self {
            StoreHandle::Memory(s) => s.update_event_alarm(id, has_alarm).await,
            StoreHandle::File(s) => s.update_event_alarm(id, has_alarm).await,
        }
    }

    async fn insert_reminder(&mut self, reminder: Reminder) -> SyncResult<ReminderId> {
        match self {
            StoreHandle::Memory(s) => s.insert_reminder(reminder).await,
            StoreHandle::File(s) => s.insert_reminder(reminder).await,
        }
    }

    async fn insert_alert(&mut self, alert: Alert) -> SyncResult<()> {
        match self {
            StoreHandle::Memory(s) => s.insert_alert(alert).await,
            StoreHandle::File(s) => s.insert_alert(alert).await,
        }
    }
}

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::calendar::{CalendarId, CalendarInfo};
use crate::error::{SyncError, SyncResult};
use crate::event::{Alert, CalendarEntry, EventId, Reminder, ReminderId};
use crate::mock_behaviour::MockBehaviour;
use crate::store::{DescriptionFilter, StoreCapabilities, StoreData};
use crate::traits::CalendarStore;


/// A calendar store that lives in memory
///
/// Its operations can be made to fail with a [`MockBehaviour`], which is what most tests do.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: StoreData,
    capabilities: StoreCapabilities,
    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

impl MemoryStore {
    /// Create an empty store, that supports every capability
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store, that only supports the given capabilities
    pub fn with_capabilities(capabilities: StoreCapabilities) -> Self {
        Self { capabilities, ..Self::default() }
    }

    pub fn set_mock_behaviour(&mut self, mock_behaviour: MockBehaviour) {
        self.mock_behaviour = Some(Arc::new(Mutex::new(mock_behaviour)));
    }

    /// Returns the mock behaviour, so that a test can tweak it while the store is in use
    pub fn mock_behaviour(&self) -> Option<Arc<Mutex<MockBehaviour>>> {
        self.mock_behaviour.clone()
    }

    pub fn add_calendar(&mut self, display_name: String) -> CalendarId {
        self.data.add_calendar(display_name)
    }

    pub fn calendars(&self) -> &[CalendarInfo] {
        &self.data.calendars
    }

    pub fn events(&self) -> impl Iterator<Item = (&EventId, &CalendarEntry)> {
        self.data.events.iter()
    }

    pub fn event(&self, id: EventId) -> Option<&CalendarEntry> {
        self.data.events.get(&id)
    }

    pub fn reminders(&self) -> impl Iterator<Item = &Reminder> {
        self.data.reminders.values()
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.data.alerts
    }

    /// Compares two stores to check they show the same events
    ///
    /// This is not a complete equality test: event ids, alarm flags and timezones may differ
    pub fn has_same_observable_content_as(&self, other: &Self) -> bool {
        let mut left: Vec<&CalendarEntry> = self.data.events.values().collect();
        let mut right: Vec<&CalendarEntry> = other.data.events.values().collect();
        if left.len() != right.len() {
            log::debug!("Count of events mismatch: {} and {}", left.len(), right.len());
            return false;
        }

        let sort_key = |e: &&CalendarEntry| (e.description().to_string(), e.title().to_string(), *e.begin(), *e.end());
        left.sort_by_key(sort_key);
        right.sort_by_key(sort_key);
        left.iter()
            .zip(right.iter())
            .all(|(l, r)| l.has_same_observable_content_as(r))
    }

    fn check<F>(&self, can: F) -> SyncResult<()>
    where
        F: FnOnce(&mut MockBehaviour) -> SyncResult<()>,
    {
        match &self.mock_behaviour {
            None => Ok(()),
            Some(mb) => match mb.lock() {
                Ok(mut behaviour) => can(&mut behaviour),
                Err(_) => Err(SyncError::Store("Mock behaviour is poisoned".to_string())),
            },
        }
    }
}

#[async_trait]
impl CalendarStore for MemoryStore {
    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    async fn get_calendars(&self) -> SyncResult<Vec<CalendarInfo>> {
        self.check(MockBehaviour::can_get_calendars)?;
        Ok(self.data.calendars.clone())
    }

    async fn get_events(&self) -> SyncResult<Vec<(EventId, CalendarEntry)>> {
        self.check(MockBehaviour::can_get_events)?;
        Ok(self.data.event_list())
    }

    async fn insert_event(&mut self, entry: CalendarEntry) -> SyncResult<EventId> {
        self.check(MockBehaviour::can_insert_event)?;
        Ok(self.data.insert_event(entry))
    }

    async fn delete_events(&mut self, filter: &DescriptionFilter) -> SyncResult<usize> {
        self.check(MockBehaviour::can_delete_events)?;
        Ok(self.data.delete_events(filter))
    }

    async fn update_event_alarm(&mut self, id: EventId, has_alarm: bool) -> SyncResult<()> {
        self.check(MockBehaviour::can_update_event)?;
        self.data.update_event_alarm(id, has_alarm)
    }

    async fn insert_reminder(&mut self, reminder: Reminder) -> SyncResult<ReminderId> {
        self.check(MockBehaviour::can_insert_reminder)?;
        self.data.insert_reminder(reminder)
    }

    async fn insert_alert(&mut self, alert: Alert) -> SyncResult<()> {
        self.check(MockBehaviour::can_insert_alert)?;
        if self.capabilities.contains(StoreCapabilities::ALERTS) == false {
            return Err(SyncError::Store("This store does not support alerts".to_string()));
        }
        self.data.insert_alert(alert)
    }
}

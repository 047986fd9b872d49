use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::calendar::{CalendarId, CalendarInfo};
use crate::error::{SyncError, SyncResult};
use crate::event::{Alert, CalendarEntry, EventId, Reminder, ReminderId};
use crate::store::{DescriptionFilter, StoreCapabilities, StoreData};
use crate::traits::CalendarStore;


/// A calendar store that saves itself to a JSON file after every change
#[derive(Debug, PartialEq)]
pub struct FileStore {
    backing_file: PathBuf,
    data: StoreData,
}

impl FileStore {
    /// Initialize a store from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let data = match std::fs::File::open(path) {
            Err(err) => {
                return Err(SyncError::Store(format!("Unable to open file {:?}: {}", path, err)));
            },
            Ok(file) => serde_json::from_reader(std::io::BufReader::new(file))?,
        };

        Ok(Self{
            backing_file: PathBuf::from(path),
            data,
        })
    }

    /// Initialize an empty store. Nothing is written until the first change
    pub fn new(path: &Path) -> Self {
        Self{
            backing_file: PathBuf::from(path),
            data: StoreData::default(),
        }
    }

    pub fn backing_file(&self) -> &Path {
        &self.backing_file
    }

    pub fn calendars(&self) -> &[CalendarInfo] {
        &self.data.calendars
    }

    pub fn add_calendar(&mut self, display_name: String) -> SyncResult<CalendarId> {
        self.commit(|data| Ok(data.add_calendar(display_name)))
    }

    /// Apply a change to a copy of the contents, and only keep it once it has been saved
    fn commit<T, F>(&mut self, change: F) -> SyncResult<T>
    where
        F: FnOnce(&mut StoreData) -> SyncResult<T>,
    {
        let mut data = self.data.clone();
        let result = change(&mut data)?;
        save_to_file(&self.backing_file, &data)?;
        self.data = data;
        Ok(result)
    }
}

/// Write store contents to a JSON file
fn save_to_file(path: &Path, data: &StoreData) -> SyncResult<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer(&mut writer, data)?;
    writer.flush()?;
    log::trace!("Store saved to {:?}", path);
    Ok(())
}

#[async_trait]
impl CalendarStore for FileStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::ALERTS
    }

    async fn get_calendars(&self) -> SyncResult<Vec<CalendarInfo>> {
        Ok(self.data.calendars.clone())
    }

    async fn get_events(&self) -> SyncResult<Vec<(EventId, CalendarEntry)>> {
        Ok(self.data.event_list())
    }

    async fn insert_event(&mut self, entry: CalendarEntry) -> SyncResult<EventId> {
        self.commit(|data| Ok(data.insert_event(entry)))
    }

    async fn delete_events(&mut self, filter: &DescriptionFilter) -> SyncResult<usize> {
        let matching = self.data.events.values().filter(|entry| filter.matches(entry.description())).count();
        if matching == 0 {
            return Ok(0);
        }
        self.commit(|data| Ok(data.delete_events(filter)))
    }

    async fn update_event_alarm(&mut self, id: EventId, has_alarm: bool) -> SyncResult<()> {
        self.commit(|data| data.update_event_alarm(id, has_alarm))
    }

    async fn insert_reminder(&mut self, reminder: Reminder) -> SyncResult<ReminderId> {
        self.commit(|data| data.insert_reminder(reminder))
    }

    async fn insert_alert(&mut self, alert: Alert) -> SyncResult<()> {
        self.commit(|data| data.insert_alert(alert))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crate::event::ReminderMethod;

    #[tokio::test]
    async fn serde_store() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("store.json");

        let mut store = FileStore::new(&store_path);
        let cal = store.add_calendar("Org".to_string()).unwrap();
        let begin = Utc::now() + Duration::days(2);
        let entry = CalendarEntry::new(cal, "DL: Taxes".to_string(), "MobileOrg:a.org\n".to_string(), Some("Office".to_string()),
                                       begin, begin + Duration::hours(1), false, "UTC".to_string());
        let id = store.insert_event(entry).await.unwrap();
        store.insert_reminder(Reminder::new(id, 15, ReminderMethod::Alert)).await.unwrap();
        store.update_event_alarm(id, true).await.unwrap();

        let retrieved_store = FileStore::from_file(&store_path).unwrap();
        assert_eq!(store, retrieved_store);
    }

    #[tokio::test]
    async fn failed_saves_change_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("sub");
        std::fs::create_dir(&folder).unwrap();
        let store_path = folder.join("store.json");

        let mut store = FileStore::new(&store_path);
        let cal = store.add_calendar("Org".to_string()).unwrap();
        let begin = Utc::now() + Duration::days(2);
        let entry = CalendarEntry::new(cal, "SC: Kept".to_string(), "MobileOrg:a.org\n".to_string(), None,
                                       begin, begin + Duration::hours(1), false, "UTC".to_string());
        let id = store.insert_event(entry.clone()).await.unwrap();

        std::fs::remove_dir_all(&folder).unwrap();

        assert!(store.insert_event(entry).await.is_err());
        assert!(store.add_calendar("Home".to_string()).is_err());
        assert!(store.update_event_alarm(id, true).await.is_err());
        assert!(store.insert_reminder(Reminder::new(id, 15, ReminderMethod::Alert)).await.is_err());
        let filter = DescriptionFilter::starting_with("MobileOrg:".to_string());
        assert!(store.delete_events(&filter).await.is_err());

        let events = store.get_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, id);
        assert!(events[0].1.has_alarm() == false);
        assert_eq!(store.calendars().len(), 1);
        assert_eq!(store.data.reminders.len(), 0);

        // Nothing to delete: nothing to save either
        let nothing = DescriptionFilter::starting_with("Other:".to_string());
        assert_eq!(store.delete_events(&nothing).await.unwrap(), 0);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileStore::from_file(&dir.path().join("nope.json")).is_err());
    }
}

//! Calendars of a store, and how the configured one is looked up

use serde::{Deserialize, Serialize};

use crate::traits::CalendarStore;
use crate::error::SyncResult;

/// Numeric identifier of a calendar, assigned by its store
pub type CalendarId = i64;

/// A calendar as listed by a [`CalendarStore`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarInfo {
    id: CalendarId,
    display_name: String,
}

impl CalendarInfo {
    pub fn new(id: CalendarId, display_name: String) -> Self {
        Self { id, display_name }
    }

    pub fn id(&self) -> CalendarId      { self.id            }
    pub fn display_name(&self) -> &str  { &self.display_name }
}

/// Returns the id of the calendar whose display name is exactly `name`.
///
/// This returns `None` when the store has no such calendar, and also when it cannot list its calendars:
/// the caller will only complain about it when it actually has something to write.
pub async fn resolve<S>(store: &S, name: &str) -> Option<CalendarId>
where
    S: CalendarStore + ?Sized,
{
    let calendars = match store.get_calendars().await {
        Err(err) => {
            log::warn!("Unable to list calendars to find {:?}: {}", name, err);
            return None;
        },
        Ok(cals) => cals,
    };

    let found = calendars.iter()
        .find(|cal| cal.display_name() == name)
        .map(|cal| cal.id());
    if found.is_none() {
        log::debug!("No calendar named {:?} among {} calendars", name, calendars.len());
    }
    found
}

/// Display names of every calendar in the store, in store order
pub async fn list_calendar_names<S>(store: &S) -> SyncResult<Vec<String>>
where
    S: CalendarStore + ?Sized,
{
    Ok(store.get_calendars().await?
        .into_iter()
        .map(|cal| cal.display_name)
        .collect()
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::mock_behaviour::MockBehaviour;

    #[tokio::test]
    async fn resolve_by_exact_name() {
        let mut store = MemoryStore::new();
        let home = store.add_calendar("Home".to_string());
        let work = store.add_calendar("Work".to_string());

        assert_eq!(resolve(&store, "Work").await, Some(work));
        assert_eq!(resolve(&store, "Home").await, Some(home));
        assert_eq!(resolve(&store, "work").await, None);
        assert_eq!(resolve(&store, "Missing").await, None);
        assert_eq!(list_calendar_names(&store).await.unwrap(), vec!["Home".to_string(), "Work".to_string()]);
    }

    #[tokio::test]
    async fn resolve_without_calendars() {
        let store = MemoryStore::new();
        assert_eq!(resolve(&store, "").await, None);
        assert!(list_calendar_names(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_with_a_failing_store() {
        let mut store = MemoryStore::new();
        store.add_calendar("Work".to_string());
        store.set_mock_behaviour(MockBehaviour::fail_now(1));

        assert_eq!(resolve(&store, "Work").await, None);
        assert_eq!(resolve(&store, "Work").await.is_some(), true);
    }
}

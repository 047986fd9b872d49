//! This module provides ways to tweak mocked stores, so that they can return errors on some tests

use crate::error::{SyncError, SyncResult};

/// This stores some behaviour tweaks, that describe how a mocked store will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    pub get_calendars_behaviour: (u32, u32),
    pub get_events_behaviour: (u32, u32),
    pub insert_event_behaviour: (u32, u32),
    pub delete_events_behaviour: (u32, u32),
    pub update_event_behaviour: (u32, u32),
    pub insert_reminder_behaviour: (u32, u32),
    pub insert_alert_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All items will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            get_calendars_behaviour: (0, n_fails),
            get_events_behaviour: (0, n_fails),
            insert_event_behaviour: (0, n_fails),
            delete_events_behaviour: (0, n_fails),
            update_event_behaviour: (0, n_fails),
            insert_reminder_behaviour: (0, n_fails),
            insert_alert_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_get_calendars(&mut self) -> SyncResult<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.get_calendars_behaviour, "get_calendars")
    }
    pub fn can_get_events(&mut self) -> SyncResult<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.get_events_behaviour, "get_events")
    }
    pub fn can_insert_event(&mut self) -> SyncResult<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.insert_event_behaviour, "insert_event")
    }
    pub fn can_delete_events(&mut self) -> SyncResult<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.delete_events_behaviour, "delete_events")
    }
    pub fn can_update_event(&mut self) -> SyncResult<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.update_event_behaviour, "update_event")
    }
    pub fn can_insert_reminder(&mut self) -> SyncResult<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.insert_reminder_behaviour, "insert_reminder")
    }
    pub fn can_insert_alert(&mut self) -> SyncResult<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.insert_alert_behaviour, "insert_alert")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> SyncResult<()> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 -= 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else if remaining_failures > 0 {
        value.1 -= 1;
        log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
        Err(SyncError::Store(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value)))
    } else {
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mock_behaviour() {
        let mut ok = MockBehaviour::new();
        assert!(ok.can_get_calendars().is_ok());
        assert!(ok.can_get_calendars().is_ok());
        assert!(ok.can_insert_event().is_ok());
        assert!(ok.can_delete_events().is_ok());

        let mut now = MockBehaviour::fail_now(2);
        assert!(now.can_get_calendars().is_err());
        assert!(now.can_insert_event().is_err());
        assert!(now.can_insert_event().is_err());
        assert!(now.can_get_calendars().is_err());
        assert!(now.can_get_calendars().is_ok());
        assert!(now.can_insert_event().is_ok());

        let mut custom = MockBehaviour{
            insert_reminder_behaviour: (0,1),
            delete_events_behaviour: (1,3),
            ..MockBehaviour::default()
        };
        assert!(custom.can_insert_reminder().is_err());
        assert!(custom.can_insert_reminder().is_ok());
        assert!(custom.can_delete_events().is_ok());
        assert!(custom.can_delete_events().is_err());
        assert!(custom.can_delete_events().is_err());
        assert!(custom.can_delete_events().is_err());
        assert!(custom.can_delete_events().is_ok());

        let mut suspended = MockBehaviour::fail_now(5);
        suspended.suspend();
        assert!(suspended.can_insert_alert().is_ok());
        suspended.resume();
        assert!(suspended.can_insert_alert().is_err());
    }
}

//! Calendar events, reminders and alerts, as written into a [`CalendarStore`](crate::traits::CalendarStore)

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};

use crate::calendar::CalendarId;

/// Store-assigned identifier of an event
pub type EventId = i64;
/// Store-assigned identifier of a reminder
pub type ReminderId = i64;

/// A calendar event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    calendar_id: CalendarId,
    title: String,
    /// Starts with `<owner tag>:<file name>\n`, see [`CalendarEntry::owner_line`]
    description: String,
    location: Option<String>,
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
    all_day: bool,
    has_alarm: bool,
    /// IANA name of the timezone this event was written in
    timezone: String,
}

impl CalendarEntry {
    /// Create an event, that has no alarm yet
    pub fn new(calendar_id: CalendarId, title: String, description: String, location: Option<String>,
               begin: DateTime<Utc>, end: DateTime<Utc>, all_day: bool, timezone: String,
            ) -> Self
    {
        Self {
            calendar_id, title, description, location,
            begin, end, all_day,
            has_alarm: false,
            timezone,
        }
    }

    /// The first line of the description of every event owned by `owner_tag` and coming from `file_name`
    pub fn owner_line(owner_tag: &str, file_name: &str) -> String {
        format!("{}:{}\n", owner_tag, file_name)
    }

    pub fn calendar_id(&self) -> CalendarId      { self.calendar_id   }
    pub fn title(&self) -> &str                  { &self.title        }
    pub fn description(&self) -> &str            { &self.description  }
    pub fn location(&self) -> Option<&str>       { self.location.as_deref() }
    pub fn begin(&self) -> &DateTime<Utc>        { &self.begin        }
    pub fn end(&self) -> &DateTime<Utc>          { &self.end          }
    pub fn all_day(&self) -> bool                { self.all_day       }
    pub fn has_alarm(&self) -> bool              { self.has_alarm     }
    pub fn timezone(&self) -> &str               { &self.timezone     }

    pub fn set_has_alarm(&mut self, has_alarm: bool) {
        self.has_alarm = has_alarm;
    }

    /// Whether this event is equivalent to `other`, regardless of alarm state and timezone
    pub fn has_same_observable_content_as(&self, other: &CalendarEntry) -> bool {
           self.calendar_id == other.calendar_id
        && self.title == other.title
        && self.description == other.description
        && self.location == other.location
        && self.begin == other.begin
        && self.end == other.end
        && self.all_day == other.all_day
    }
}


/// How a reminder reaches the user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderMethod {
    /// A notification on the device
    Alert,
}

/// A reminder attached to an event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    event_id: EventId,
    /// How long before the beginning of the event the user should be reminded
    minutes: i64,
    method: ReminderMethod,
}

impl Reminder {
    pub fn new(event_id: EventId, minutes: i64, method: ReminderMethod) -> Self {
        Self { event_id, minutes, method }
    }

    pub fn event_id(&self) -> EventId        { self.event_id }
    pub fn minutes(&self) -> i64             { self.minutes  }
    pub fn method(&self) -> ReminderMethod   { self.method   }
}


#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertState {
    /// Not fired yet
    Scheduled,
}

/// An alert instance, only written into stores that support
/// [`StoreCapabilities::ALERTS`](crate::store::StoreCapabilities::ALERTS)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    event_id: EventId,
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
    alarm_time: DateTime<Utc>,
    minutes: i64,
    state: AlertState,
}

impl Alert {
    /// A scheduled alert, that fires `minutes` before `begin`.
    /// `minutes` is at most [`MAX_REMINDER_MINUTES`](crate::config::MAX_REMINDER_MINUTES)
    pub fn scheduled(event_id: EventId, begin: DateTime<Utc>, end: DateTime<Utc>, minutes: i64) -> Self {
        Self {
            event_id, begin, end,
            alarm_time: begin - Duration::minutes(minutes),
            minutes,
            state: AlertState::Scheduled,
        }
    }

    pub fn event_id(&self) -> EventId             { self.event_id    }
    pub fn begin(&self) -> &DateTime<Utc>         { &self.begin      }
    pub fn end(&self) -> &DateTime<Utc>           { &self.end        }
    pub fn alarm_time(&self) -> &DateTime<Utc>    { &self.alarm_time }
    pub fn minutes(&self) -> i64                  { self.minutes     }
    pub fn state(&self) -> AlertState             { self.state       }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn alert_fires_before_the_event() {
        let begin = Utc.with_ymd_and_hms(2031, 1, 2, 14, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2031, 1, 2, 15, 30, 0).unwrap();
        let alert = Alert::scheduled(7, begin, end, 10);

        assert_eq!(*alert.alarm_time(), Utc.with_ymd_and_hms(2031, 1, 2, 14, 20, 0).unwrap());
        assert_eq!(alert.state(), AlertState::Scheduled);
        assert_eq!(alert.event_id(), 7);
    }

    #[test]
    fn observable_content_ignores_alarm_and_timezone() {
        let begin = Utc.with_ymd_and_hms(2031, 1, 2, 14, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2031, 1, 2, 15, 30, 0).unwrap();
        let left = CalendarEntry::new(1, "SC: Dentist".to_string(), "MobileOrg:a.org\n".to_string(), None,
                                      begin, end, false, "Europe/Paris".to_string());
        let mut right = CalendarEntry::new(1, "SC: Dentist".to_string(), "MobileOrg:a.org\n".to_string(), None,
                                           begin, end, false, "UTC".to_string());
        right.set_has_alarm(true);

        assert!(left.has_same_observable_content_as(&right));
        assert_eq!(CalendarEntry::owner_line("MobileOrg", "a.org"), "MobileOrg:a.org\n");
    }
}

//! Some utility functions

use crate::event::{CalendarEntry, EventId};
use crate::traits::CalendarStore;

/// A debug utility that pretty-prints the calendars of a store, and their events
pub async fn print_store<S>(store: &S)
where
    S: CalendarStore + ?Sized,
{
    let calendars = match store.get_calendars().await {
        Err(err) => {
            println!("Unable to list calendars: {}", err);
            return;
        },
        Ok(cals) => cals,
    };
    let events = match store.get_events().await {
        Err(err) => {
            println!("Unable to list events: {}", err);
            return;
        },
        Ok(events) => events,
    };

    for cal in calendars {
        println!("CAL {} ({})", cal.display_name(), cal.id());
        for (id, entry) in events.iter().filter(|(_, e)| e.calendar_id() == cal.id()) {
            print_entry(*id, entry);
        }
    }
}

pub fn print_entry(id: EventId, entry: &CalendarEntry) {
    let alarm = if entry.has_alarm() { "⏰" } else { " " };
    let when = if entry.all_day() {
        entry.begin().format("%Y-%m-%d").to_string()
    } else {
        entry.begin().format("%Y-%m-%d %H:%M").to_string()
    };
    let origin = entry.description().lines().next().unwrap_or_default();
    println!("    {} {}\t{}\t{}\t#{}", alarm, when, entry.title(), origin, id);
}

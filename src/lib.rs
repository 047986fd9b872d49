//! This crate mirrors scheduled org tasks into a calendar.
//!
//! Tasks come from a [`TaskSource`](traits::TaskSource), which also tells which todo keywords mean "done" (see [`TodoKeywordRegistry`](traits::TodoKeywordRegistry)). \
//! Every date of every task becomes an event of a [`CalendarStore`](traits::CalendarStore), maybe with a reminder, depending on the user settings read from a [`PreferenceSource`](traits::PreferenceSource).
//!
//! A [`CalendarSync`] ties these together. \
//! Each sync deletes the events it wrote previously, then writes them again, so that running it twice is harmless.
//! Events this crate did not write are never touched: every event it writes carries an owner tag in its description.
//!
//! Two stores are provided in the [`store`] module: one in memory, and one backed by a JSON file.

pub mod traits;
pub mod error;
pub use error::{SyncError, SyncResult};

pub mod calendar;
pub mod config;
pub use config::SyncConfig;
pub mod settings;
mod task;
pub use task::{Occurrence, RecordId, TaskRecord, DEADLINE_TAG, LOCATION_PROPERTY, SCHEDULED_TAG, STYLE_PROPERTY};
mod event;
pub use event::{Alert, AlertState, CalendarEntry, EventId, Reminder, ReminderId, ReminderMethod};
pub mod syncer;
pub use syncer::{CalendarSync, SyncReport};

pub mod store;
pub mod source;

pub mod mock_behaviour;
pub mod utils;

//! This module mirrors the scheduled tasks of a [`TaskSource`] into a [`CalendarStore`]
//!
//! There is no diffing: every sync first deletes the events it wrote earlier for the files it handles, then writes them again.

use chrono::Utc;

use crate::calendar;
use crate::config::{SyncConfig, AGENDA_FILE, DEFAULT_OWNER_TAG};
use crate::error::{SyncError, SyncResult};
use crate::event::{Alert, CalendarEntry, EventId, Reminder, ReminderMethod};
use crate::store::{DescriptionFilter, StoreCapabilities};
use crate::task::{Occurrence, RecordId, TaskRecord};
use crate::traits::{CalendarStore, PreferenceSource, TaskSource, TodoKeywordRegistry};

pub mod sync_progress;
use sync_progress::SyncProgress;
use sync_progress::{FeedbackSender, SyncEvent};

/// What a sync operation has done
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Events deleted before writing
    pub purged: usize,
    /// Dates of scheduled records that have been looked at
    pub occurrences_considered: usize,
    /// Dates that have not been written because their task is done
    pub occurrences_filtered: usize,
    pub entries_written: usize,
    pub reminders_scheduled: usize,
    /// Events the store refused to insert
    pub failed_writes: usize,
    /// Files that vanished from the task source while syncing
    pub skipped_files: usize,
    /// Errors and warnings that did not stop the sync (see the logs for details)
    pub errors: u32,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }
}

/// Mirrors tasks into a calendar.
///
/// `T` provides both the tasks and the todo keywords, `P` provides the user settings.
/// Settings are read again at the beginning of every operation (see [`SyncConfig`]).
///
/// Operations take `&mut self`: one instance cannot run two syncs at the same time.
/// Nothing prevents two instances from writing into the same store though.
#[derive(Debug)]
pub struct CalendarSync<S, T, P>
where
    S: CalendarStore,
    T: TaskSource + TodoKeywordRegistry,
    P: PreferenceSource,
{
    store: S,
    tasks: T,
    prefs: P,
    owner_tag: String,
}

impl<S, T, P> CalendarSync<S, T, P>
where
    S: CalendarStore,
    T: TaskSource + TodoKeywordRegistry,
    P: PreferenceSource,
{
    pub fn new(store: S, tasks: T, prefs: P) -> Self {
        Self { store, tasks, prefs, owner_tag: DEFAULT_OWNER_TAG.to_string() }
    }

    /// Use another tag to recognize the events this instance owns.
    /// An empty tag is ignored
    pub fn with_owner_tag(mut self, owner_tag: &str) -> Self {
        if owner_tag.is_empty() {
            log::warn!("Refusing an empty owner tag, keeping {:?}", self.owner_tag);
        } else {
            self.owner_tag = owner_tag.to_string();
        }
        self
    }

    pub fn store(&self) -> &S          { &self.store     }
    pub fn store_mut(&mut self) -> &mut S  { &mut self.store }
    pub fn tasks(&self) -> &T          { &self.tasks     }
    pub fn tasks_mut(&mut self) -> &mut T  { &mut self.tasks }
    pub fn prefs(&self) -> &P          { &self.prefs     }
    pub fn prefs_mut(&mut self) -> &mut P  { &mut self.prefs }
    pub fn owner_tag(&self) -> &str    { &self.owner_tag }

    /// Take a snapshot of the current settings
    pub async fn refresh_config(&self) -> SyncResult<SyncConfig> {
        SyncConfig::refresh(&self.prefs, &self.store, &self.tasks).await
    }

    /// Display names of the calendars of the store
    pub async fn list_calendar_names(&self) -> SyncResult<Vec<String>> {
        calendar::list_calendar_names(&self.store).await
    }

    /// Delete every event this crate wrote, then write every scheduled task of every file again.
    ///
    /// The agenda file is skipped, both when deleting and when writing.
    /// This fails with [`SyncError::Configuration`] before touching the store in case the settings are invalid,
    /// and with [`SyncError::CalendarNotFound`] as soon as something has to be written into a calendar that does not exist.
    pub async fn sync_all(&mut self) -> SyncResult<SyncReport> {
        let mut progress = SyncProgress::new();
        let result = self.run_sync_all(&mut progress).await;
        finish(&mut progress, result)
    }

    /// Same as [`Self::sync_all`], and provide feedback to the user about the progress
    pub async fn sync_all_with_feedback(&mut self, feedback_sender: FeedbackSender) -> SyncResult<SyncReport> {
        let mut progress = SyncProgress::new_with_feedback_channel(feedback_sender);
        let result = self.run_sync_all(&mut progress).await;
        finish(&mut progress, result)
    }

    /// Delete the events this crate wrote for one file, then write its scheduled tasks again.
    ///
    /// See [`Self::sync_all`] for the possible errors
    pub async fn sync_file(&mut self, file_name: &str) -> SyncResult<SyncReport> {
        let mut progress = SyncProgress::new();
        let result = self.run_sync_file(file_name, &mut progress).await;
        finish(&mut progress, result)
    }

    /// Same as [`Self::sync_file`], and provide feedback to the user about the progress
    pub async fn sync_file_with_feedback(&mut self, file_name: &str, feedback_sender: FeedbackSender) -> SyncResult<SyncReport> {
        let mut progress = SyncProgress::new_with_feedback_channel(feedback_sender);
        let result = self.run_sync_file(file_name, &mut progress).await;
        finish(&mut progress, result)
    }

    /// Delete every event this crate wrote (except the ones of the agenda file).
    /// Returns how many events have been deleted, which is 0 in case the store failed
    pub async fn purge_all(&mut self) -> usize {
        let filter = self.full_purge_filter();
        self.purge(&filter, &mut SyncProgress::new()).await
    }

    /// Delete every event this crate wrote for this file.
    /// Returns how many events have been deleted, which is 0 in case the store failed
    pub async fn purge_file(&mut self, file_name: &str) -> usize {
        let filter = self.file_purge_filter(file_name);
        self.purge(&filter, &mut SyncProgress::new()).await
    }

    /// Write the events of a single record, without deleting anything first.
    ///
    /// Nothing happens in case the record or its file cannot be found.
    /// Invalid settings and a missing calendar are still reported
    pub async fn insert_single_record(&mut self, id: RecordId) -> SyncResult<SyncReport> {
        let mut progress = SyncProgress::new();
        let result = self.run_insert_single_record(id, &mut progress).await;
        finish(&mut progress, result)
    }

    async fn run_sync_all(&mut self, progress: &mut SyncProgress) -> SyncResult<SyncReport> {
        progress.info("Starting a full sync.");
        progress.feedback(SyncEvent::Started);

        let config = self.refresh_config().await?;
        let mut report = SyncReport::default();

        let filter = self.full_purge_filter();
        report.purged = self.purge(&filter, progress).await;

        let file_names = self.tasks.file_names().await?;
        for file_name in file_names {
            if file_name == AGENDA_FILE {
                progress.trace(&format!("Skipping {}", file_name));
                continue;
            }
            self.insert_file_entries(&config, &file_name, &mut report, progress).await?;
        }

        progress.info("Sync ended");
        Ok(report)
    }

    async fn run_sync_file(&mut self, file_name: &str, progress: &mut SyncProgress) -> SyncResult<SyncReport> {
        progress.info(&format!("Starting a sync of {}.", file_name));
        progress.feedback(SyncEvent::Started);

        let config = self.refresh_config().await?;
        let mut report = SyncReport::default();

        let filter = self.file_purge_filter(file_name);
        report.purged = self.purge(&filter, progress).await;
        self.insert_file_entries(&config, file_name, &mut report, progress).await?;

        progress.info("Sync ended");
        Ok(report)
    }

    async fn run_insert_single_record(&mut self, id: RecordId, progress: &mut SyncProgress) -> SyncResult<SyncReport> {
        let config = self.refresh_config().await?;
        let mut report = SyncReport::default();

        let record = match self.tasks.get_record(id).await {
            Err(err) if err.is_recoverable() => {
                progress.debug(&format!("Not inserting record {}: {}", id, err));
                return Ok(report);
            },
            other => other?,
        };
        let file_name = match self.tasks.get_record_file(id).await {
            Err(err) if err.is_recoverable() => {
                progress.debug(&format!("Not inserting record {}: {}", id, err));
                return Ok(report);
            },
            other => other?,
        };

        self.insert_record(&config, &record, &file_name, &mut report, progress).await?;
        Ok(report)
    }

    fn full_purge_filter(&self) -> DescriptionFilter {
        DescriptionFilter::starting_with(format!("{}:", self.owner_tag))
            .excluding(CalendarEntry::owner_line(&self.owner_tag, AGENDA_FILE))
    }

    fn file_purge_filter(&self, file_name: &str) -> DescriptionFilter {
        DescriptionFilter::starting_with(CalendarEntry::owner_line(&self.owner_tag, file_name))
    }

    /// Failures are logged but not returned: writing can go on, at the risk of duplicated events
    async fn purge(&mut self, filter: &DescriptionFilter, progress: &mut SyncProgress) -> usize {
        match self.store.delete_events(filter).await {
            Err(err) => {
                progress.warn(&format!("Unable to delete events starting with {:?}: {}", filter.prefix(), err));
                0
            },
            Ok(count) => {
                progress.debug(&format!("Deleted {} events starting with {:?}", count, filter.prefix()));
                count
            },
        }
    }

    async fn insert_file_entries(&mut self, config: &SyncConfig, file_name: &str, report: &mut SyncReport, progress: &mut SyncProgress) -> SyncResult<()> {
        let schedule = match self.tasks.file_schedule(file_name, config.show_habits()).await {
            Err(err) if err.is_recoverable() => {
                progress.debug(&format!("Skipping {}: {}", file_name, err));
                report.skipped_files += 1;
                return Ok(());
            },
            other => other?,
        };

        progress.debug(&format!("Writing {} scheduled records of {}", schedule.len(), file_name));
        progress.reset_counter();
        progress.feedback(SyncEvent::InProgress{
            file: file_name.to_string(),
            entries_done_already: 0,
            details: "started".to_string(),
        });

        for record in &schedule {
            self.insert_record(config, record, file_name, report, progress).await?;
        }
        Ok(())
    }

    /// Every date of the record becomes its own event
    async fn insert_record(&mut self, config: &SyncConfig, record: &TaskRecord, file_name: &str, report: &mut SyncReport, progress: &mut SyncProgress) -> SyncResult<()> {
        let is_active = config.is_active(record.todo());

        for occurrence in record.occurrences() {
            report.occurrences_considered += 1;
            if self.insert_entry(config, record, occurrence, is_active, file_name, report, progress).await?.is_some() {
                progress.increment_counter(1);
                progress.feedback(SyncEvent::InProgress{
                    file: file_name.to_string(),
                    entries_done_already: progress.counter(),
                    details: record.name().to_string(),
                });
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_entry(&mut self, config: &SyncConfig, record: &TaskRecord, occurrence: &Occurrence, is_active: bool,
                          file_name: &str, report: &mut SyncReport, progress: &mut SyncProgress) -> SyncResult<Option<EventId>>
    {
        if config.show_done() == false && is_active == false {
            progress.trace(&format!("Not showing done task {} ({})", record.id(), record.todo()));
            report.occurrences_filtered += 1;
            return Ok(None);
        }

        let calendar_id = config.calendar_id()
            .ok_or_else(|| SyncError::CalendarNotFound(config.calendar_name().to_string()))?;

        let entry = CalendarEntry::new(
            calendar_id,
            format!("{}{}", occurrence.kind(), record.name()),
            format!("{}{}", CalendarEntry::owner_line(&self.owner_tag, file_name), record.payload()),
            record.location().map(|l| l.to_string()),
            *occurrence.begin(),
            *occurrence.end(),
            occurrence.all_day(),
            local_timezone(),
        );

        let event_id = match self.store.insert_event(entry).await {
            Err(err) => {
                progress.error(&format!("Unable to write an event for record {} of {}: {}", record.id(), file_name, err));
                report.failed_writes += 1;
                return Ok(None);
            },
            Ok(id) => id,
        };
        report.entries_written += 1;
        progress.trace(&format!("Record {} written as event {}", record.id(), event_id));

        // "In the future" means "after this very write", not "after the sync started"
        if config.reminder_enabled()
            && occurrence.all_day() == false
            && *occurrence.begin() > Utc::now()
        {
            if self.schedule_reminder(config, event_id, occurrence, progress).await {
                report.reminders_scheduled += 1;
            }
        }

        Ok(Some(event_id))
    }

    /// Nothing is rolled back on failure: the event stays, maybe with no reminder or no alarm flag.
    /// Returns whether the reminder itself was written
    async fn schedule_reminder(&mut self, config: &SyncConfig, event_id: EventId, occurrence: &Occurrence, progress: &mut SyncProgress) -> bool {
        let minutes = config.reminder_minutes();

        if let Err(err) = self.store.insert_reminder(Reminder::new(event_id, minutes, ReminderMethod::Alert)).await {
            progress.warn(&format!("Unable to add a reminder to event {}: {}", event_id, err));
            return false;
        }

        if self.store.capabilities().contains(StoreCapabilities::ALERTS) {
            let alert = Alert::scheduled(event_id, *occurrence.begin(), *occurrence.end(), minutes);
            if let Err(err) = self.store.insert_alert(alert).await {
                progress.warn(&format!("Unable to add an alert to event {}: {}", event_id, err));
            }
        }

        if let Err(err) = self.store.update_event_alarm(event_id, true).await {
            progress.warn(&format!("Unable to flag event {} as having an alarm: {}", event_id, err));
        }
        true
    }
}

fn finish(progress: &mut SyncProgress, result: SyncResult<SyncReport>) -> SyncResult<SyncReport> {
    match result {
        Ok(mut report) => {
            report.errors = progress.n_errors();
            progress.feedback(SyncEvent::Finished{ success: progress.is_success() });
            Ok(report)
        },
        Err(err) => {
            progress.error(&format!("Sync terminated because of an error: {}", err));
            progress.feedback(SyncEvent::Finished{ success: false });
            Err(err)
        },
    }
}

/// IANA name of the current system timezone
fn local_timezone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(tz) => tz,
        Err(err) => {
            log::warn!("Unable to get the local timezone ({}), using UTC", err);
            "UTC".to_string()
        },
    }
}

use std::path::Path;

use org_calendar_sync::settings::{Preferences, CALENDAR_NAME_KEY};
use org_calendar_sync::source::MemorySource;
use org_calendar_sync::store::StoreHandle;
use org_calendar_sync::traits::PreferenceSource;
use org_calendar_sync::CalendarSync;

const USAGE: &str = "Usage: org-calendar-sync <tasks.json> <settings.json> [store.json]";

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let tasks = match MemorySource::from_file(Path::new(&args[0])) {
        Ok(tasks) => tasks,
        Err(err) => {
            log::error!("Unable to read tasks from {}: {}", args[0], err);
            std::process::exit(1);
        }
    };
    let prefs = match Preferences::from_file(Path::new(&args[1])) {
        Ok(prefs) => prefs,
        Err(err) => {
            log::error!("Unable to read settings from {}: {}", args[1], err);
            std::process::exit(1);
        }
    };

    let mut store = StoreHandle::probe(args.get(2).map(Path::new));
    let calendar_name = prefs.get_string(CALENDAR_NAME_KEY).unwrap_or_default();
    ensure_calendar(&mut store, &calendar_name).await;
    let mut syncer = CalendarSync::new(store, tasks, prefs);

    println!("Calendars: {:?}", syncer.list_calendar_names().await.unwrap_or_default());
    println!("---- before sync -----");
    org_calendar_sync::utils::print_store(syncer.store()).await;

    match syncer.sync_all().await {
        Err(err) => {
            log::error!("Unable to sync: {}", err);
            std::process::exit(1);
        },
        Ok(report) => {
            if report.is_success() == false {
                log::warn!("Sync did not complete, see the previous log lines for more info. You can safely start a new sync.");
            }
            println!("{:?}", report);
        },
    }

    println!("---- after sync -----");
    org_calendar_sync::utils::print_store(syncer.store()).await;
}

/// The demo creates the configured calendar in case the store does not have it yet
async fn ensure_calendar(store: &mut StoreHandle, calendar_name: &str) {
    let names = org_calendar_sync::calendar::list_calendar_names(&*store).await.unwrap_or_default();
    if calendar_name.is_empty() == false && names.iter().any(|n| n == calendar_name) == false {
        log::info!("Creating calendar {:?}", calendar_name);
        if let Err(err) = store.add_calendar(calendar_name.to_string()) {
            log::warn!("Unable to create calendar {:?}: {}", calendar_name, err);
        }
    }
}

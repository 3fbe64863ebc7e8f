use clap::Subcommand;
use tracing::info;

use carepulse_core::{
    Config, Database, DeliveryChannel, Event, NotificationRequest, Notifier, ReminderEngine,
};

use super::load_engine;

#[derive(Subcommand)]
pub enum EngineAction {
    /// Evaluate schedules once against the current time
    Tick,
    /// Scan for missed reminders once
    Sweep,
    /// Print current engine state as JSON
    Status,
    /// Run the scheduler loop until interrupted
    Run,
}

/// Notifier that logs deliveries. Stands in for an OS notification
/// surface; a silent channel is dropped entirely.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, request: &NotificationRequest) {
        match request.channel {
            DeliveryChannel::Silent => {}
            DeliveryChannel::Badge => {
                info!(tag = %request.tag, "{}", request.title);
            }
            DeliveryChannel::Toast => {
                info!(
                    tag = %request.tag,
                    require_interaction = request.require_interaction,
                    "{}: {}",
                    request.title,
                    request.body
                );
            }
        }
    }
}

/// Append engine events to the history table and surface notifications.
fn handle_events(db: &Database, config: &Config, notifier: &dyn Notifier, events: &[Event]) {
    for event in events {
        let (kind, id, title) = match event {
            Event::ReminderFired { reminder, .. } => {
                ("fired", reminder.id.as_str(), reminder.title.as_str())
            }
            Event::ReminderRearmed { reminder, .. } => {
                ("rearmed", reminder.id.as_str(), reminder.title.as_str())
            }
            Event::ReminderMissed { reminder, .. } => {
                ("missed", reminder.id.as_str(), reminder.title.as_str())
            }
            Event::AlertRaised { alert, .. } => ("alert", alert.id.as_str(), alert.title.as_str()),
            Event::ReminderSnoozed { id, .. } => ("snoozed", id.as_str(), ""),
            Event::ReminderDismissed { id, .. } => ("dismissed", id.as_str(), ""),
            Event::StateSnapshot { .. } => continue,
        };
        if let Err(e) = db.record_event(kind, id, title, chrono::Utc::now()) {
            tracing::warn!("failed to record event: {e}");
        }

        if let Event::ReminderFired { reminder, at } | Event::ReminderRearmed { reminder, at } =
            event
        {
            let request = NotificationRequest::for_reminder(
                reminder,
                &config.notifications.quiet_hours,
                config.notifications.enabled,
                *at,
            );
            notifier.notify(&request);
        }
    }
}

fn tick_once(
    db: &Database,
    engine: &mut ReminderEngine,
    config: &Config,
    notifier: &dyn Notifier,
) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let events = engine.tick(chrono::Utc::now());
    handle_events(db, config, notifier, &events);
    db.save_engine(engine)?;
    Ok(events)
}

fn sweep_once(
    db: &Database,
    engine: &mut ReminderEngine,
    config: &Config,
    notifier: &dyn Notifier,
) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let events = engine.sweep(chrono::Utc::now());
    handle_events(db, config, notifier, &events);
    db.save_engine(engine)?;
    Ok(events)
}

fn run_loop(db: Database, mut engine: ReminderEngine, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let notifier = ConsoleNotifier;
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(
            config.scheduler.tick_secs.max(1),
        ));
        let mut sweep = tokio::time::interval(std::time::Duration::from_secs(
            config.scheduler.sweep_secs.max(1),
        ));
        info!(
            tick_secs = config.scheduler.tick_secs,
            sweep_secs = config.scheduler.sweep_secs,
            "scheduler loop started"
        );
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(e) = tick_once(&db, &mut engine, &config, &notifier) {
                        tracing::warn!("tick failed: {e}");
                    }
                }
                _ = sweep.tick() => {
                    if let Err(e) = sweep_once(&db, &mut engine, &config, &notifier) {
                        tracing::warn!("sweep failed: {e}");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("scheduler loop stopping");
                    break;
                }
            }
        }
        db.save_engine(&engine)?;
        Ok(())
    })
}

pub fn run(action: EngineAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut engine = load_engine(&db);
    let config = Config::load_or_default();

    match action {
        EngineAction::Tick => {
            let events = tick_once(&db, &mut engine, &config, &ConsoleNotifier)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        EngineAction::Sweep => {
            let events = sweep_once(&db, &mut engine, &config, &ConsoleNotifier)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        EngineAction::Status => {
            let snapshot = engine.snapshot(chrono::Utc::now());
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        EngineAction::Run => run_loop(db, engine, config)?,
    }
    Ok(())
}

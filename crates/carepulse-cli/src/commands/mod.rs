pub mod alert;
pub mod config;
pub mod engine;
pub mod reminder;
pub mod stats;

use carepulse_core::{Config, Database, ReminderEngine};

/// Open the database and load the persisted engine, applying the current
/// config's tuning on top.
pub fn load_engine(db: &Database) -> ReminderEngine {
    let config = Config::load_or_default();
    let mut engine = db.load_engine(ReminderEngine::default);
    engine.set_config(config.engine_config());
    engine
}

/// Parse a category name as the UI presents them.
pub fn parse_category(
    s: &str,
) -> Result<carepulse_core::ReminderCategory, Box<dyn std::error::Error>> {
    use carepulse_core::ReminderCategory::*;
    Ok(match s.to_ascii_lowercase().as_str() {
        "medication" => Medication,
        "meal" => Meal,
        "appointment" => Appointment,
        "task" => Task,
        "routine" => Routine,
        "visitor" => Visitor,
        "weather" => Weather,
        "location" => Location,
        other => return Err(format!("unknown category: {other}").into()),
    })
}

pub fn parse_priority(s: &str) -> Result<carepulse_core::Priority, Box<dyn std::error::Error>> {
    use carepulse_core::Priority::*;
    Ok(match s.to_ascii_lowercase().as_str() {
        "low" => Low,
        "medium" => Medium,
        "high" => High,
        "critical" => Critical,
        other => return Err(format!("unknown priority: {other}").into()),
    })
}

/// Parse "1,2,3" into weekday numbers (0 = Sunday .. 6 = Saturday).
pub fn parse_days(s: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    s.split(',')
        .map(|part| {
            let day: u8 = part.trim().parse()?;
            if day > 6 {
                return Err(format!("weekday out of range (0-6): {day}").into());
            }
            Ok(day)
        })
        .collect()
}

/// Build a scheduled instant from "HH:MM" and an optional "YYYY-MM-DD"
/// (defaults to today).
pub fn parse_scheduled_time(
    time: &str,
    date: Option<&str>,
) -> Result<chrono::DateTime<chrono::Utc>, Box<dyn std::error::Error>> {
    let time = chrono::NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| format!("invalid time (expected HH:MM): {time}"))?;
    let date = match date {
        Some(d) => chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|_| format!("invalid date (expected YYYY-MM-DD): {d}"))?,
        None => chrono::Utc::now().date_naive(),
    };
    Ok(chrono::DateTime::from_naive_utc_and_offset(
        date.and_time(time),
        chrono::Utc,
    ))
}

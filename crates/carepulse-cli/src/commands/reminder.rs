use clap::Subcommand;

use carepulse_core::{Database, RecurrenceRule, Reminder};

use super::{load_engine, parse_category, parse_days, parse_priority, parse_scheduled_time};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Create a reminder
    Add {
        /// Short title shown in the prompt
        title: String,
        /// Longer message body
        #[arg(long, default_value = "")]
        message: String,
        /// medication | meal | appointment | task | routine | visitor | weather | location
        #[arg(long, default_value = "task")]
        category: String,
        /// Scheduled time, HH:MM
        #[arg(long)]
        time: String,
        /// Scheduled date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// low | medium | high | critical
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Repeat on these weekdays, e.g. "1,2,3,4,5" (0 = Sunday)
        #[arg(long)]
        days: Option<String>,
        /// Maximum snoozes before the reminder stops re-arming
        #[arg(long, default_value = "3")]
        max_snoozes: u32,
    },
    /// List reminders
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update a reminder's fields
    Update {
        /// Reminder id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        days: Option<String>,
        /// Enable or disable the reminder
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a reminder
    Delete {
        /// Reminder id
        id: String,
    },
    /// Snooze the reminder (10-minute cool-down by default)
    Snooze {
        /// Reminder id
        id: String,
    },
    /// Dismiss the reminder and cancel any pending re-arm
    Dismiss {
        /// Reminder id
        id: String,
    },
    /// Show a reminder's scheduling state
    Status {
        /// Reminder id (omit for all reminders)
        id: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut engine = load_engine(&db);

    match action {
        ReminderAction::Add {
            title,
            message,
            category,
            time,
            date,
            priority,
            days,
            max_snoozes,
        } => {
            let mut reminder = Reminder::new(
                title,
                message,
                parse_category(&category)?,
                parse_scheduled_time(&time, date.as_deref())?,
                parse_priority(&priority)?,
            );
            reminder.max_snoozes = max_snoozes;
            if let Some(days) = days {
                reminder.is_recurring = true;
                reminder.recurrence = Some(RecurrenceRule {
                    days_of_week: parse_days(&days)?,
                });
            }
            let id = reminder.id.clone();
            engine.store_mut().add(reminder)?;
            db.save_engine(&engine)?;
            println!("Reminder created: {id}");
        }
        ReminderAction::List { json } => {
            let reminders = engine.store().reminders();
            if json {
                println!("{}", serde_json::to_string_pretty(reminders)?);
            } else {
                for r in reminders {
                    let days = r
                        .recurrence
                        .as_ref()
                        .map(|rule| format!(" days={:?}", rule.days_of_week))
                        .unwrap_or_default();
                    println!(
                        "{}  {:<24} {:?}/{:?} at {}{}{}",
                        r.id,
                        r.title,
                        r.category,
                        r.priority,
                        r.scheduled_time.format("%H:%M"),
                        days,
                        if r.is_active { "" } else { " (disabled)" },
                    );
                }
            }
        }
        ReminderAction::Update {
            id,
            title,
            message,
            category,
            time,
            date,
            priority,
            days,
            active,
        } => {
            let Some(mut reminder) = engine.store().get(&id).cloned() else {
                return Err(format!("unknown reminder id: {id}").into());
            };
            if let Some(title) = title {
                reminder.title = title;
            }
            if let Some(message) = message {
                reminder.message = message;
            }
            if let Some(category) = category {
                reminder.category = parse_category(&category)?;
            }
            if time.is_some() || date.is_some() {
                let time = time.unwrap_or_else(|| reminder.scheduled_time.format("%H:%M").to_string());
                reminder.scheduled_time = parse_scheduled_time(&time, date.as_deref())?;
            }
            if let Some(priority) = priority {
                reminder.priority = parse_priority(&priority)?;
            }
            if let Some(days) = days {
                reminder.is_recurring = true;
                reminder.recurrence = Some(RecurrenceRule {
                    days_of_week: parse_days(&days)?,
                });
            }
            if let Some(active) = active {
                reminder.is_active = active;
            }
            engine.store_mut().update(reminder);
            db.save_engine(&engine)?;
            println!("ok");
        }
        ReminderAction::Delete { id } => {
            engine.remove(&id);
            db.save_engine(&engine)?;
            println!("ok");
        }
        ReminderAction::Snooze { id } => {
            let now = chrono::Utc::now();
            match engine.snooze(&id, now) {
                Some(event) => {
                    db.save_engine(&engine)?;
                    println!("{}", serde_json::to_string_pretty(&event)?);
                }
                None => return Err(format!("cannot snooze {id}: unknown or out of snoozes").into()),
            }
        }
        ReminderAction::Dismiss { id } => {
            let event = engine.dismiss(&id, chrono::Utc::now());
            db.save_engine(&engine)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        ReminderAction::Status { id, json } => {
            let store = engine.store();
            let targets: Vec<&Reminder> = match &id {
                Some(id) => match store.get(id) {
                    Some(r) => vec![r],
                    None => return Err(format!("unknown reminder id: {id}").into()),
                },
                None => store.reminders().iter().collect(),
            };
            if json {
                let statuses: Vec<serde_json::Value> = targets
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "id": r.id,
                            "title": r.title,
                            "active": r.is_active,
                            "presented": store.active().is_some_and(|a| a.id == r.id),
                            "snoozed": store.is_snoozed(&r.id),
                            "snoozeCount": r.snooze_count,
                            "maxSnoozes": r.max_snoozes,
                            "rearmAt": engine.rearm_at(&r.id),
                            "lastTriggered": r.last_triggered,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                for r in targets {
                    let state = if !r.is_active {
                        "disabled".to_string()
                    } else if let Some(at) = engine.rearm_at(&r.id) {
                        format!("snoozed until {}", at.format("%H:%M"))
                    } else if store.active().is_some_and(|a| a.id == r.id) {
                        "presenting".to_string()
                    } else {
                        "scheduled".to_string()
                    };
                    println!(
                        "{}  {:<24} {} ({}/{} snoozes)",
                        r.id, r.title, state, r.snooze_count, r.max_snoozes,
                    );
                }
            }
        }
    }
    Ok(())
}

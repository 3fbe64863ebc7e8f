use clap::Subcommand;

use carepulse_core::Database;

use super::load_engine;

#[derive(Subcommand)]
pub enum AlertAction {
    /// List caregiver alerts, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
        /// Only unread alerts
        #[arg(long)]
        unread: bool,
    },
    /// Mark an alert as read
    Read {
        /// Alert id
        id: String,
    },
    /// Mark an alert as resolved
    Resolve {
        /// Alert id
        id: String,
        /// Resolving caregiver's name or id
        #[arg(long, default_value = "caregiver")]
        by: String,
    },
}

pub fn run(action: AlertAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut engine = load_engine(&db);

    match action {
        AlertAction::List { json, unread } => {
            let alerts: Vec<_> = engine
                .store()
                .alerts()
                .iter()
                .filter(|a| !unread || !a.is_read)
                .cloned()
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&alerts)?);
            } else {
                for a in &alerts {
                    println!(
                        "{}  [{:?}/{:?}] {} -- {}{}{}",
                        a.id,
                        a.alert_type,
                        a.priority,
                        a.title,
                        a.timestamp.format("%Y-%m-%d %H:%M"),
                        if a.is_read { "" } else { " (unread)" },
                        if a.is_resolved { " (resolved)" } else { "" },
                    );
                }
            }
        }
        AlertAction::Read { id } => {
            let Some(mut alert) = engine.store().alerts().iter().find(|a| a.id == id).cloned()
            else {
                return Err(format!("unknown alert id: {id}").into());
            };
            alert.is_read = true;
            engine.store_mut().update_alert(alert);
            db.save_engine(&engine)?;
            println!("ok");
        }
        AlertAction::Resolve { id, by } => {
            let Some(mut alert) = engine.store().alerts().iter().find(|a| a.id == id).cloned()
            else {
                return Err(format!("unknown alert id: {id}").into());
            };
            alert.is_read = true;
            alert.resolve(by, chrono::Utc::now());
            engine.store_mut().update_alert(alert);
            db.save_engine(&engine)?;
            println!("ok");
        }
    }
    Ok(())
}

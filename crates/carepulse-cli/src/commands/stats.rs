use clap::Subcommand;

use carepulse_core::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Print fired/missed/alert counts as JSON
    Show,
    /// List recent engine events
    History {
        /// Number of events to show
        #[arg(long, default_value = "20")]
        limit: u32,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        StatsAction::Show => {
            let stats = db.stats(chrono::Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::History { limit, json } => {
            let events = db.recent_events(limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                for e in &events {
                    println!(
                        "{}  {:<10} {}  {}",
                        e.at.format("%Y-%m-%d %H:%M"),
                        e.event_type,
                        e.reminder_id,
                        e.title,
                    );
                }
            }
        }
    }
    Ok(())
}

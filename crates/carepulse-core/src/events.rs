use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reminder::{CaregiverAlert, Priority, Reminder, ReminderCategory};

/// Every observable state change in the engine produces an Event.
/// The CLI prints them; the daemon loop maps them to notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A reminder matched its schedule and took the active slot.
    ReminderFired {
        reminder: Reminder,
        at: DateTime<Utc>,
    },
    /// A snoozed reminder's cool-down elapsed and it was re-presented.
    ReminderRearmed {
        reminder: Reminder,
        at: DateTime<Utc>,
    },
    ReminderSnoozed {
        id: String,
        snooze_count: u32,
        rearm_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    ReminderDismissed {
        id: String,
        at: DateTime<Utc>,
    },
    /// The sweeper classified a reminder as missed.
    ReminderMissed {
        reminder: Reminder,
        at: DateTime<Utc>,
    },
    /// Escalation produced a caregiver alert.
    AlertRaised {
        alert: CaregiverAlert,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        reminder_count: usize,
        active_id: Option<String>,
        active_title: Option<String>,
        active_category: Option<ReminderCategory>,
        active_priority: Option<Priority>,
        snoozed_count: usize,
        missed_count: usize,
        unread_alerts: usize,
        at: DateTime<Utc>,
    },
}

mod store;
mod types;

pub use store::{MissedEntry, ReminderStore};
pub use types::{
    AlertType, CaregiverAlert, Priority, RecurrenceRule, Reminder, ReminderCategory,
};

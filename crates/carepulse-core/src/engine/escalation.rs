//! Caregiver alert escalation.
//!
//! Pure mapping from a (reminder, trigger reason) pair to zero-or-one
//! caregiver alert. Low/medium reminders that fire normally produce no
//! alert -- intentional noise reduction. Missed reminders always escalate
//! at forced high priority.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reminder::{AlertType, CaregiverAlert, Priority, Reminder, ReminderCategory};

/// Why escalation is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerReason {
    /// The reminder fired on schedule.
    Fired,
    /// The sweeper classified the reminder as missed.
    Missed,
}

/// Alert type for a missed reminder, derived from its category.
fn missed_alert_type(category: ReminderCategory) -> AlertType {
    match category {
        ReminderCategory::Medication => AlertType::MissedMedication,
        ReminderCategory::Meal => AlertType::MissedMeal,
        _ => AlertType::TaskOverdue,
    }
}

/// Alert type for a reminder that fired at escalating priority.
fn fired_alert_type(category: ReminderCategory) -> AlertType {
    match category {
        ReminderCategory::Medication => AlertType::MissedMedication,
        ReminderCategory::Meal => AlertType::MissedMeal,
        ReminderCategory::Location => AlertType::LocationAlert,
        _ => AlertType::TaskOverdue,
    }
}

/// Map a reminder and trigger reason to a caregiver alert, if one is due.
///
/// `Fired` escalates only for high/critical priority, mirroring the
/// reminder's priority. `Missed` escalates unconditionally at high
/// priority. `action_required` is always set.
pub fn escalate(
    reminder: &Reminder,
    reason: TriggerReason,
    patient_id: &str,
    now: DateTime<Utc>,
) -> Option<CaregiverAlert> {
    match reason {
        TriggerReason::Fired => {
            if !reminder.priority.escalates() {
                return None;
            }
            Some(CaregiverAlert::new(
                patient_id,
                fired_alert_type(reminder.category),
                format!("{:?} reminder triggered", reminder.category),
                format!("{}: {}", reminder.title, reminder.message),
                reminder.priority,
                now,
            ))
        }
        TriggerReason::Missed => Some(CaregiverAlert::new(
            patient_id,
            missed_alert_type(reminder.category),
            "Missed Reminder",
            format!(
                "{} was missed at {}",
                reminder.title,
                reminder.scheduled_time.format("%H:%M")
            ),
            Priority::High,
            now,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reminder(priority: Priority, category: ReminderCategory) -> Reminder {
        let t = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        Reminder::new("Meds", "Take morning pills", category, t, priority)
    }

    #[test]
    fn critical_fire_raises_exactly_one_alert() {
        let r = reminder(Priority::Critical, ReminderCategory::Medication);
        let now = Utc::now();
        let alert = escalate(&r, TriggerReason::Fired, "p1", now).unwrap();
        assert!(alert.action_required);
        assert_eq!(alert.priority, Priority::Critical);
        assert_eq!(alert.alert_type, AlertType::MissedMedication);
        assert_eq!(alert.patient_id, "p1");
        assert!(alert.caregiver_id.is_empty());
    }

    #[test]
    fn low_fire_raises_nothing() {
        let r = reminder(Priority::Low, ReminderCategory::Meal);
        assert!(escalate(&r, TriggerReason::Fired, "p1", Utc::now()).is_none());
        let r = reminder(Priority::Medium, ReminderCategory::Meal);
        assert!(escalate(&r, TriggerReason::Fired, "p1", Utc::now()).is_none());
    }

    #[test]
    fn missed_always_escalates_forced_high() {
        let r = reminder(Priority::Low, ReminderCategory::Meal);
        let alert = escalate(&r, TriggerReason::Missed, "p1", Utc::now()).unwrap();
        assert_eq!(alert.priority, Priority::High);
        assert_eq!(alert.alert_type, AlertType::MissedMeal);
        assert!(alert.action_required);
    }

    #[test]
    fn missed_type_follows_category() {
        let r = reminder(Priority::High, ReminderCategory::Medication);
        let alert = escalate(&r, TriggerReason::Missed, "p1", Utc::now()).unwrap();
        assert_eq!(alert.alert_type, AlertType::MissedMedication);

        let r = reminder(Priority::High, ReminderCategory::Appointment);
        let alert = escalate(&r, TriggerReason::Missed, "p1", Utc::now()).unwrap();
        assert_eq!(alert.alert_type, AlertType::TaskOverdue);
    }
}

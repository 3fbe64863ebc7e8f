//! Reminder and caregiver-alert data model.
//!
//! A [`Reminder`] is a scheduled prompt shown to the patient; a
//! [`CaregiverAlert`] is the derived record surfaced on the caregiver side
//! when a reminder fires at high priority or is missed entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of prompt this reminder carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderCategory {
    Medication,
    Meal,
    Appointment,
    Task,
    Routine,
    Visitor,
    Weather,
    Location,
}

/// Priority determines escalation and interruption behavior.
///
/// Ordered so that `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Whether a reminder at this priority escalates to a caregiver alert
    /// when it fires normally.
    pub fn escalates(self) -> bool {
        matches!(self, Priority::High | Priority::Critical)
    }
}

/// Weekly recurrence rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    /// Weekdays the reminder repeats on. 0 = Sunday .. 6 = Saturday.
    pub days_of_week: Vec<u8>,
}

impl RecurrenceRule {
    pub fn weekdays() -> Self {
        Self {
            days_of_week: vec![1, 2, 3, 4, 5],
        }
    }

    pub fn matches(&self, weekday: u8) -> bool {
        self.days_of_week.contains(&weekday)
    }
}

/// A scheduled prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub title: String,
    pub message: String,
    pub category: ReminderCategory,
    /// Scheduled instant. For recurring reminders only the time-of-day
    /// portion matters; the date records when the schedule was created.
    pub scheduled_time: DateTime<Utc>,
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRule>,
    pub priority: Priority,
    /// Whether the reminder is enabled at all. Distinct from "currently
    /// firing" -- that is the store's single active slot.
    pub is_active: bool,
    #[serde(default)]
    pub last_triggered: Option<DateTime<Utc>>,
    #[serde(default)]
    pub snooze_count: u32,
    #[serde(default = "default_max_snoozes")]
    pub max_snoozes: u32,
}

fn default_max_snoozes() -> u32 {
    3
}

impl Reminder {
    /// Create a reminder with a fresh id and zeroed runtime state.
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        category: ReminderCategory,
        scheduled_time: DateTime<Utc>,
        priority: Priority,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            category,
            scheduled_time,
            is_recurring: false,
            recurrence: None,
            priority,
            is_active: true,
            last_triggered: None,
            snooze_count: 0,
            max_snoozes: default_max_snoozes(),
        }
    }

    /// Whether further snoozing is still allowed.
    pub fn can_snooze(&self) -> bool {
        self.snooze_count < self.max_snoozes
    }

    /// Whether the reminder already fired on the given calendar day.
    pub fn fired_on(&self, day: chrono::NaiveDate) -> bool {
        self.last_triggered
            .map(|t| t.date_naive() == day)
            .unwrap_or(false)
    }

    /// Whether the reminder is scheduled to occur on the given weekday
    /// (0 = Sunday) / date at all.
    pub fn occurs_on(&self, day: chrono::NaiveDate, weekday: u8) -> bool {
        if self.is_recurring {
            match &self.recurrence {
                Some(rule) => rule.matches(weekday),
                None => true, // recurring without a rule repeats daily
            }
        } else {
            self.scheduled_time.date_naive() == day
        }
    }
}

/// Category of caregiver alert, mirroring the triggering reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    MissedMedication,
    MissedMeal,
    Emergency,
    UnusualActivity,
    LocationAlert,
    TaskOverdue,
}

/// Caregiver-facing alert record.
///
/// Created only by the escalation path, never directly by users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverAlert {
    pub id: String,
    pub patient_id: String,
    /// Filled in by the caregiver system once routed; empty at creation.
    #[serde(default)]
    pub caregiver_id: String,
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub priority: Priority,
    pub is_read: bool,
    pub is_resolved: bool,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    pub action_required: bool,
}

impl CaregiverAlert {
    pub fn new(
        patient_id: impl Into<String>,
        alert_type: AlertType,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: patient_id.into(),
            caregiver_id: String::new(),
            alert_type,
            title: title.into(),
            message: message.into(),
            timestamp,
            priority,
            is_read: false,
            is_resolved: false,
            resolved_at: None,
            resolved_by: None,
            action_required: true,
        }
    }

    /// Mark resolved by the named caregiver.
    pub fn resolve(&mut self, by: impl Into<String>, at: DateTime<Utc>) {
        self.is_resolved = true;
        self.resolved_by = Some(by.into());
        self.resolved_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert!(Priority::Low.escalates() == false);
        assert!(Priority::High.escalates());
        assert!(Priority::Critical.escalates());
    }

    #[test]
    fn occurs_on_weekday_rule() {
        let t = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(); // a Monday
        let mut r = Reminder::new("Meds", "Take morning pills", ReminderCategory::Medication, t, Priority::High);
        r.is_recurring = true;
        r.recurrence = Some(RecurrenceRule::weekdays());

        // Tuesday 2024-03-05 -> weekday 2
        assert!(r.occurs_on(chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 2));
        // Saturday 2024-03-09 -> weekday 6
        assert!(!r.occurs_on(chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), 6));
    }

    #[test]
    fn one_shot_occurs_only_on_its_date() {
        let t = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        let r = Reminder::new("Doctor", "Appointment", ReminderCategory::Appointment, t, Priority::Medium);
        assert!(r.occurs_on(t.date_naive(), 1));
        assert!(!r.occurs_on(chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 2));
    }

    #[test]
    fn reminder_serde_roundtrip() {
        let t = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        let r = Reminder::new("Lunch", "Time to eat", ReminderCategory::Meal, t, Priority::Low);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"scheduledTime\""));
        let back: Reminder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}

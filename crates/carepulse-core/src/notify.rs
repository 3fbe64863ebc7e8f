//! Notification boundary.
//!
//! The engine itself never talks to the OS; the daemon loop maps engine
//! events to [`NotificationRequest`]s and hands them to whatever
//! [`Notifier`] is plugged in. A missing or disabled notifier degrades to
//! silence -- scheduling state is unaffected.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::reminder::{Priority, Reminder};

/// How a notification should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    /// Suppressed entirely (notifications disabled).
    Silent,
    /// Subtle, no sound (quiet hours).
    Badge,
    /// Full notification with sound.
    Toast,
}

/// Quiet hours policy. Overnight windows (start > end) are supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuietHoursPolicy {
    pub enabled: bool,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl Default for QuietHoursPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            start_hour: 22,
            end_hour: 7,
        }
    }
}

impl QuietHoursPolicy {
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        let hour = time.hour();
        if self.start_hour > self.end_hour {
            return hour >= self.start_hour as u32 || hour < self.end_hour as u32;
        }
        hour >= self.start_hour as u32 && hour < self.end_hour as u32
    }
}

/// A single notification to present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    /// Repeated notifications with the same tag replace each other rather
    /// than stacking. Set to the reminder id.
    pub tag: String,
    /// Critical reminders stay on screen until acted on.
    pub require_interaction: bool,
    pub channel: DeliveryChannel,
}

impl NotificationRequest {
    /// Build the notification for a fired (or re-armed) reminder.
    pub fn for_reminder(
        reminder: &Reminder,
        quiet_hours: &QuietHoursPolicy,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let channel = if !enabled {
            DeliveryChannel::Silent
        } else if quiet_hours.contains(now) {
            DeliveryChannel::Badge
        } else {
            DeliveryChannel::Toast
        };
        Self {
            title: format!("{:?} Reminder", reminder.category),
            body: reminder.message.clone(),
            tag: reminder.id.clone(),
            require_interaction: reminder.priority == Priority::Critical,
            channel,
        }
    }
}

/// Sink for notifications. Implementations must not fail scheduling:
/// delivery errors are theirs to swallow or log.
pub trait Notifier {
    fn notify(&self, request: &NotificationRequest);
}

/// Notifier that drops everything. Used when permission is denied or
/// notifications are turned off.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _request: &NotificationRequest) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::ReminderCategory;
    use chrono::TimeZone;

    fn reminder(priority: Priority) -> Reminder {
        Reminder::new(
            "Meds",
            "Take morning pills",
            ReminderCategory::Medication,
            Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(),
            priority,
        )
    }

    #[test]
    fn critical_requires_interaction_and_tags_by_id() {
        let r = reminder(Priority::Critical);
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();
        let n = NotificationRequest::for_reminder(&r, &QuietHoursPolicy::default(), true, now);
        assert!(n.require_interaction);
        assert_eq!(n.tag, r.id);
        assert_eq!(n.channel, DeliveryChannel::Toast);
    }

    #[test]
    fn quiet_hours_downgrade_to_badge() {
        let r = reminder(Priority::High);
        let night = Utc.with_ymd_and_hms(2024, 3, 4, 23, 0, 0).unwrap();
        let n = NotificationRequest::for_reminder(&r, &QuietHoursPolicy::default(), true, night);
        assert_eq!(n.channel, DeliveryChannel::Badge);
        assert!(!n.require_interaction);
    }

    #[test]
    fn disabled_notifications_are_silent() {
        let r = reminder(Priority::High);
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap();
        let n = NotificationRequest::for_reminder(&r, &QuietHoursPolicy::default(), false, now);
        assert_eq!(n.channel, DeliveryChannel::Silent);
    }

    #[test]
    fn overnight_quiet_window_wraps_midnight() {
        let policy = QuietHoursPolicy {
            enabled: true,
            start_hour: 22,
            end_hour: 7,
        };
        assert!(policy.contains(Utc.with_ymd_and_hms(2024, 3, 4, 23, 0, 0).unwrap()));
        assert!(policy.contains(Utc.with_ymd_and_hms(2024, 3, 4, 3, 0, 0).unwrap()));
        assert!(!policy.contains(Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()));
    }
}

//! Reminder store.
//!
//! Single source of truth for the reminder collection and its runtime
//! sub-state: the one currently presented reminder, the snoozed id set,
//! the missed log, and the caregiver alert feed. All mutations go through
//! named operations; the whole store serializes as one JSON document.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::{CaregiverAlert, Reminder};

/// Most recent missed reminders kept.
pub const MISSED_LOG_CAP: usize = 50;
/// Most recent caregiver alerts kept.
pub const ALERT_CAP: usize = 100;

/// A reminder snapshot taken when the sweeper classified it as missed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedEntry {
    pub reminder: Reminder,
    /// When the sweeper recorded the miss. One entry per reminder per
    /// calendar day -- repeated sweeps do not re-append.
    pub missed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReminderStore {
    reminders: Vec<Reminder>,
    /// The single currently presented reminder. Setting a new one while
    /// another is presented overwrites the slot; there is no queue.
    active: Option<Reminder>,
    snoozed: HashSet<String>,
    /// Newest first, capped at [`MISSED_LOG_CAP`].
    missed: Vec<MissedEntry>,
    /// Newest first, capped at [`ALERT_CAP`].
    alerts: Vec<CaregiverAlert>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn active(&self) -> Option<&Reminder> {
        self.active.as_ref()
    }

    pub fn is_snoozed(&self, id: &str) -> bool {
        self.snoozed.contains(id)
    }

    pub fn missed(&self) -> &[MissedEntry] {
        &self.missed
    }

    pub fn alerts(&self) -> &[CaregiverAlert] {
        &self.alerts
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace the full collection. Load path only; runtime sub-state is
    /// left untouched.
    pub fn set_all(&mut self, reminders: Vec<Reminder>) {
        self.reminders = reminders;
    }

    /// Append a reminder. Ids are enforced unique at this boundary.
    pub fn add(&mut self, reminder: Reminder) -> Result<(), ValidationError> {
        if self.get(&reminder.id).is_some() {
            return Err(ValidationError::DuplicateId {
                id: reminder.id.clone(),
            });
        }
        self.reminders.push(reminder);
        Ok(())
    }

    /// Replace the entry with a matching id. Silent no-op when absent.
    pub fn update(&mut self, reminder: Reminder) {
        if let Some(slot) = self.reminders.iter_mut().find(|r| r.id == reminder.id) {
            *slot = reminder;
        }
    }

    /// Remove by id. Idempotent; absent ids are a no-op.
    pub fn remove(&mut self, id: &str) {
        self.reminders.retain(|r| r.id != id);
        self.snoozed.remove(id);
        if self.active.as_ref().map(|a| a.id == id).unwrap_or(false) {
            self.active = None;
        }
    }

    /// Set or clear the single active slot.
    pub fn set_active(&mut self, reminder: Option<Reminder>) {
        self.active = reminder;
    }

    /// Snooze by id: join the snoozed set, bump the snooze count, and clear
    /// the active slot if it holds this reminder.
    ///
    /// Returns `false` without mutating when the reminder is unknown or has
    /// exhausted its snooze allowance.
    pub fn snooze(&mut self, id: &str) -> bool {
        let Some(reminder) = self.reminders.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        if !reminder.can_snooze() {
            return false;
        }
        reminder.snooze_count += 1;
        self.snoozed.insert(id.to_string());
        if self.active.as_ref().map(|a| a.id == id).unwrap_or(false) {
            self.active = None;
        }
        true
    }

    /// Clear the active slot if it holds this reminder. Idempotent; does
    /// not touch the snoozed set or snooze counts.
    pub fn dismiss(&mut self, id: &str) {
        if self.active.as_ref().map(|a| a.id == id).unwrap_or(false) {
            self.active = None;
        }
    }

    /// Remove an id from the snoozed set once its re-arm has been handled.
    pub fn clear_snoozed(&mut self, id: &str) {
        self.snoozed.remove(id);
    }

    /// Record a missed reminder, newest first, deduplicated per reminder
    /// per calendar day, truncated to the most recent [`MISSED_LOG_CAP`].
    ///
    /// Returns `false` when the miss was already recorded for that day.
    pub fn mark_missed(&mut self, reminder: Reminder, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        let already = self
            .missed
            .iter()
            .any(|e| e.reminder.id == reminder.id && e.missed_at.date_naive() == today);
        if already {
            return false;
        }
        self.missed.insert(
            0,
            MissedEntry {
                reminder,
                missed_at: now,
            },
        );
        self.missed.truncate(MISSED_LOG_CAP);
        true
    }

    /// Prepend a caregiver alert, truncated to the most recent [`ALERT_CAP`].
    pub fn push_alert(&mut self, alert: CaregiverAlert) {
        self.alerts.insert(0, alert);
        self.alerts.truncate(ALERT_CAP);
    }

    /// Replace the alert with a matching id (read/resolve path). Silent
    /// no-op when absent.
    pub fn update_alert(&mut self, alert: CaregiverAlert) {
        if let Some(slot) = self.alerts.iter_mut().find(|a| a.id == alert.id) {
            *slot = alert;
        }
    }
}

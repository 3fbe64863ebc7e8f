//! Reminder engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads or timers -- the caller is responsible for calling `tick()` on a
//! fixed cadence (60s) and `sweep()` on a longer one (300s). The daemon loop
//! in the CLI does exactly that.
//!
//! ## Firing
//!
//! A reminder fires when all of these hold at tick time:
//! - it is enabled (`is_active`)
//! - it occurs today (one-shot date match, or recurring weekday rule)
//! - it has not already fired today
//! - it has snoozes left
//! - the current minute is inside the firing window
//!   `[scheduled minute, scheduled minute + grace)`
//!
//! Matching is window-based rather than exact-minute equality, so a tick
//! that lands late (host asleep, slow callback) still fires the reminder;
//! the fired-today guard keeps it to once per day. Past the grace window
//! the sweeper takes over and classifies the occurrence as missed.
//!
//! When several reminders fire in one tick they all get stamped and
//! escalated, and the highest-priority one takes the single active slot.

mod escalation;

pub use escalation::{escalate, TriggerReason};

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::reminder::{Reminder, ReminderStore};

/// Scheduler cadence the daemon loop uses, in seconds.
pub const TICK_INTERVAL_SECS: u64 = 60;
/// Sweeper cadence the daemon loop uses, in seconds.
pub const SWEEP_INTERVAL_SECS: u64 = 300;

/// Engine tuning. Loaded from the application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Patient this engine schedules for; stamped onto caregiver alerts.
    pub patient_id: String,
    /// Snooze cool-down before a reminder is re-presented.
    pub snooze_minutes: i64,
    /// How far past the scheduled minute a reminder may still fire before
    /// the sweeper classifies it as missed.
    pub missed_grace_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            patient_id: "local-patient".to_string(),
            snooze_minutes: 10,
            missed_grace_minutes: 30,
        }
    }
}

/// Core reminder engine.
///
/// Owns the store and the pending snooze re-arm deadlines. Serializes as
/// one JSON document for kv persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReminderEngine {
    store: ReminderStore,
    #[serde(default)]
    config: EngineConfig,
    /// Reminder id -> instant it should be re-presented after a snooze.
    #[serde(default)]
    rearm: HashMap<String, DateTime<Utc>>,
}

/// Minute-of-day for window comparisons. Seconds are truncated.
fn minute_of_day(t: DateTime<Utc>) -> i64 {
    (t.time().hour() * 60 + t.time().minute()) as i64
}

/// Weekday as 0 = Sunday .. 6 = Saturday.
fn weekday(day: NaiveDate) -> u8 {
    day.weekday().num_days_from_sunday() as u8
}

impl ReminderEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: ReminderStore::new(),
            config,
            rearm: HashMap::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn store(&self) -> &ReminderStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ReminderStore {
        &mut self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Pending re-arm deadline for a snoozed reminder, if any.
    pub fn rearm_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.rearm.get(id).copied()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        let active = self.store.active();
        Event::StateSnapshot {
            reminder_count: self.store.reminders().len(),
            active_id: active.map(|r| r.id.clone()),
            active_title: active.map(|r| r.title.clone()),
            active_category: active.map(|r| r.category),
            active_priority: active.map(|r| r.priority),
            snoozed_count: self.rearm.len(),
            missed_count: self.store.missed().len(),
            unread_alerts: self.store.alerts().iter().filter(|a| !a.is_read).count(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Evaluate every reminder against `now`. Call once per minute.
    ///
    /// Handles due snooze re-arms first, then schedule matches. Returns
    /// the events produced this tick, in the order they happened.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        let mut candidates: Vec<Reminder> = Vec::new();

        // Snooze cool-downs that have elapsed re-present their reminder
        // without touching the snooze count.
        let due_rearms: Vec<String> = self
            .rearm
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in due_rearms {
            self.rearm.remove(&id);
            self.store.clear_snoozed(&id);
            if let Some(reminder) = self.store.get(&id).filter(|r| r.is_active).cloned() {
                events.push(Event::ReminderRearmed {
                    reminder: reminder.clone(),
                    at: now,
                });
                candidates.push(reminder);
            }
        }

        let today = now.date_naive();
        let dow = weekday(today);
        let now_min = minute_of_day(now);

        let due: Vec<Reminder> = self
            .store
            .reminders()
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| !self.store.is_snoozed(&r.id))
            .filter(|r| r.can_snooze())
            .filter(|r| r.occurs_on(today, dow))
            .filter(|r| !r.fired_on(today))
            .filter(|r| {
                let sched_min = minute_of_day(r.scheduled_time);
                sched_min <= now_min && now_min < sched_min + self.config.missed_grace_minutes
            })
            .cloned()
            .collect();

        for mut reminder in due {
            reminder.last_triggered = Some(now);
            self.store.update(reminder.clone());
            events.push(Event::ReminderFired {
                reminder: reminder.clone(),
                at: now,
            });
            if let Some(alert) =
                escalate(&reminder, TriggerReason::Fired, &self.config.patient_id, now)
            {
                self.store.push_alert(alert.clone());
                events.push(Event::AlertRaised { alert, at: now });
            }
            candidates.push(reminder);
        }

        // The single active slot goes to the highest-priority candidate;
        // ties keep the first one evaluated.
        if let Some(winner) = candidates
            .iter()
            .max_by(|a, b| a.priority.cmp(&b.priority).then(std::cmp::Ordering::Greater))
        {
            self.store.set_active(Some(winner.clone()));
        }

        events
    }

    /// Scan for reminders whose occurrence slipped past the grace window
    /// without firing. Call every few minutes.
    ///
    /// Each miss is recorded once per reminder per day and escalates to a
    /// forced-high caregiver alert.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        let today = now.date_naive();
        let dow = weekday(today);
        let now_min = minute_of_day(now);

        let overdue: Vec<Reminder> = self
            .store
            .reminders()
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| r.occurs_on(today, dow))
            .filter(|r| !r.fired_on(today))
            .filter(|r| now_min >= minute_of_day(r.scheduled_time) + self.config.missed_grace_minutes)
            .cloned()
            .collect();

        for reminder in overdue {
            if !self.store.mark_missed(reminder.clone(), now) {
                continue; // already recorded for today
            }
            events.push(Event::ReminderMissed {
                reminder: reminder.clone(),
                at: now,
            });
            if let Some(alert) =
                escalate(&reminder, TriggerReason::Missed, &self.config.patient_id, now)
            {
                self.store.push_alert(alert.clone());
                events.push(Event::AlertRaised { alert, at: now });
            }
        }

        events
    }

    /// Snooze the given reminder and arm its re-presentation deadline.
    ///
    /// Returns `None` when the reminder is unknown or out of snoozes.
    pub fn snooze(&mut self, id: &str, now: DateTime<Utc>) -> Option<Event> {
        if !self.store.snooze(id) {
            return None;
        }
        let rearm_at = now + chrono::Duration::minutes(self.config.snooze_minutes);
        self.rearm.insert(id.to_string(), rearm_at);
        let snooze_count = self.store.get(id).map(|r| r.snooze_count).unwrap_or(0);
        Some(Event::ReminderSnoozed {
            id: id.to_string(),
            snooze_count,
            rearm_at,
            at: now,
        })
    }

    /// Dismiss the given reminder: clear the active slot if it holds it
    /// and cancel any pending snooze re-arm. Idempotent.
    pub fn dismiss(&mut self, id: &str, now: DateTime<Utc>) -> Event {
        self.store.dismiss(id);
        self.rearm.remove(id);
        self.store.clear_snoozed(id);
        Event::ReminderDismissed {
            id: id.to_string(),
            at: now,
        }
    }

    /// Drop a reminder entirely, including any pending re-arm.
    pub fn remove(&mut self, id: &str) {
        self.store.remove(id);
        self.rearm.remove(id);
    }
}

//! # CarePulse Core Library
//!
//! This library provides the core business logic for CarePulse, the
//! reminder engine of a dementia-care companion. It implements a CLI-first
//! philosophy where all operations are available via a standalone CLI
//! binary, with any GUI being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Reminder Engine**: A wall-clock-based state machine that requires
//!   the caller to periodically invoke `tick()` (scheduling) and `sweep()`
//!   (missed detection)
//! - **Store**: Single source of truth for reminders, the one active
//!   prompt, the snoozed set, the missed log, and caregiver alerts
//! - **Escalation**: Pure mapping from fired/missed reminders to
//!   caregiver alerts
//! - **Storage**: SQLite-based state persistence and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`ReminderEngine`]: Core scheduling state machine
//! - [`ReminderStore`]: Reminder collection and runtime sub-state
//! - [`Database`]: State and event-history persistence
//! - [`Config`]: Application configuration management

pub mod engine;
pub mod error;
pub mod events;
pub mod notify;
pub mod reminder;
pub mod storage;

pub use engine::{escalate, EngineConfig, ReminderEngine, TriggerReason};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use notify::{DeliveryChannel, NotificationRequest, Notifier, NullNotifier, QuietHoursPolicy};
pub use reminder::{
    AlertType, CaregiverAlert, MissedEntry, Priority, RecurrenceRule, Reminder, ReminderCategory,
    ReminderStore,
};
pub use storage::{Config, Database};

//! # nudge
//!
//! Deferred reminder core for chat bots. Users schedule a text notification
//! with a relative duration (`in 2h30m take a break`) or an absolute
//! date/time (`at 2023-06-27 10:00 release day`); the core parses the time
//! expression into an exact UTC instant, persists pending reminders across
//! restarts, and delivers each exactly once as soon as its destination is
//! reachable.
//!
//! The host messaging runtime stays outside: it implements
//! [`Messenger`](host::Messenger), hands the command argument text to
//! [`RemindPlugin`](commands::RemindPlugin), and spawns the
//! [`DeliveryScheduler`](scheduler::DeliveryScheduler) loop.

// Core domain types
pub mod error;
pub mod reminder;

// Time expression grammars
pub mod parser;

// Persistence layer
pub mod migrate;
pub mod registry;
pub mod store;

// Host integration
pub mod commands;
pub mod config;
pub mod host;
pub mod scheduler;

pub use commands::{RemindPlugin, APOLOGY_REPLY, PROMPT_REPLY};
pub use config::RemindConfig;
pub use error::{ParseError, StorageError};
pub use host::{Destination, Messenger};
pub use parser::DurationSpec;
pub use registry::ReminderRegistry;
pub use reminder::Reminder;
pub use scheduler::{DeliveryScheduler, SweepOutcome, SWEEP_INTERVAL_SECS};

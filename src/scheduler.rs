//! # Delivery Scheduler
//!
//! Periodic sweep over the registry: every due reminder is classified
//! against live destination state and either delivered now or retained for
//! a later sweep. Retention is first-class, not a failure: an absent
//! occupant or an unknown destination just means "not reachable yet".
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Sweeps report a SweepOutcome instead of logging only
//! - 1.0.0: Initial sweep loop
//!
//! Delivery is fire-and-forget: once a reminder is classified deliverable it
//! is dropped from the registry whether or not the host send succeeds.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::host::{Destination, Messenger};
use crate::registry::ReminderRegistry;

/// Default seconds between sweeps. A tunable, not a correctness constant.
pub const SWEEP_INTERVAL_SECS: u64 = 2;

/// What one sweep did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepOutcome {
    /// Reminders handed to the messenger and dropped from the registry.
    pub delivered: usize,
    /// Reminders kept for a later sweep (not yet due, occupant absent, or
    /// destination unknown).
    pub retained: usize,
    /// Whether the retained subset was written back to the store.
    pub persisted: bool,
}

/// Periodic due-reminder evaluator sharing the plugin's registry.
#[derive(Clone)]
pub struct DeliveryScheduler {
    registry: Arc<Mutex<ReminderRegistry>>,
    messenger: Arc<dyn Messenger>,
}

impl DeliveryScheduler {
    pub fn new(registry: Arc<Mutex<ReminderRegistry>>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            registry,
            messenger,
        }
    }

    /// Sweep forever at a fixed period. The host spawns this once.
    pub async fn run(self, interval_secs: u64) {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        info!("Reminder sweep task started (interval: {interval_secs}s)");

        loop {
            interval.tick().await;

            match self.tick().await {
                Ok(Some(outcome)) if outcome.delivered > 0 => {
                    debug!(
                        "Sweep delivered {} reminder(s), retained {}",
                        outcome.delivered, outcome.retained
                    );
                }
                Ok(_) => {}
                Err(e) => warn!("Reminder sweep failed: {e}"),
            }
        }
    }

    /// Run one sweep at the current time.
    ///
    /// Returns `None` without touching any state when the host connection is
    /// not established and registered.
    pub async fn tick(&self) -> Result<Option<SweepOutcome>, StorageError> {
        if !self.messenger.is_connected() {
            debug!("No reminders to send while the bot is not connected");
            return Ok(None);
        }
        let now = Utc::now().timestamp();
        Ok(Some(self.sweep_at(now).await?))
    }

    /// Classify and deliver against a fixed `now` (UTC epoch seconds).
    ///
    /// Holds the registry lock for the whole classify-then-replace sequence
    /// and classifies a snapshot, so command handlers never observe a
    /// half-swept registry.
    pub async fn sweep_at(&self, now: i64) -> Result<SweepOutcome, StorageError> {
        let mut registry = self.registry.lock().await;

        let reminders = registry.snapshot();
        let mut kept = Vec::with_capacity(reminders.len());
        let mut delivered = 0usize;

        for reminder in reminders {
            if !reminder.is_due(now) {
                kept.push(reminder);
                continue;
            }

            match self.messenger.resolve_destination(&reminder.destination) {
                Destination::Channel { occupants } => {
                    if occupants.contains(&reminder.originator) {
                        if let Err(e) = self
                            .messenger
                            .reply_in_channel(
                                &reminder.destination,
                                &reminder.originator,
                                &reminder.message,
                            )
                            .await
                        {
                            warn!("Failed to deliver reminder to {}: {e}", reminder.destination);
                        }
                        delivered += 1;
                    } else {
                        // the originator is not here yet, keep for later
                        kept.push(reminder);
                    }
                }
                Destination::Direct => {
                    if let Err(e) = self
                        .messenger
                        .send_direct(&reminder.destination, &reminder.message)
                        .await
                    {
                        warn!("Failed to deliver reminder to {}: {e}", reminder.destination);
                    }
                    delivered += 1;
                }
                Destination::Unknown => kept.push(reminder),
            }
        }

        let retained = kept.len();
        let persisted = registry.replace(kept)?;

        Ok(SweepOutcome {
            delivered,
            retained,
            persisted,
        })
    }
}

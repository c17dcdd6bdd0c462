//! # Remind Commands
//!
//! Host-facing surface of the plugin: lifecycle hooks plus the `in` and `at`
//! command handlers. Every handler returns the reply string the host should
//! send back to the requester; parse failures never propagate past here.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Confirmation times rendered in the reminder's timezone
//! - 1.0.0: Initial in/at handlers and lifecycle hooks

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::config::RemindConfig;
use crate::host::Messenger;
use crate::parser;
use crate::registry::ReminderRegistry;
use crate::reminder::Reminder;
use crate::scheduler::DeliveryScheduler;

/// Reply when a command is invoked with no argument text.
pub const PROMPT_REPLY: &str = "When and what would you like me to remind?";

/// Reply when the argument text could not be parsed.
pub const APOLOGY_REPLY: &str = "Sorry, I didn't understand that.";

/// The reminder plugin: owns the registry and wires commands, lifecycle, and
/// the sweep scheduler to one shared lock.
pub struct RemindPlugin {
    config: RemindConfig,
    registry: Arc<Mutex<ReminderRegistry>>,
    messenger: Arc<dyn Messenger>,
}

impl RemindPlugin {
    /// Create the plugin with an empty registry. [`on_start`](Self::on_start)
    /// loads the store.
    pub fn new(config: RemindConfig, messenger: Arc<dyn Messenger>) -> Self {
        let registry = ReminderRegistry::new(config.reminder_filename());
        Self {
            config,
            registry: Arc::new(Mutex::new(registry)),
            messenger,
        }
    }

    pub fn config(&self) -> &RemindConfig {
        &self.config
    }

    /// A scheduler sharing this plugin's registry, for the host to spawn:
    ///
    /// ```ignore
    /// tokio::spawn(plugin.scheduler().run(plugin.config().sweep_interval_secs));
    /// ```
    pub fn scheduler(&self) -> DeliveryScheduler {
        DeliveryScheduler::new(Arc::clone(&self.registry), Arc::clone(&self.messenger))
    }

    /// Load the registry from the store. A malformed store is fatal here:
    /// silently dropping reminders is worse than refusing to start.
    pub async fn on_start(&self) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.reload()?;
        info!(
            "Loaded {} pending reminder(s) from {}",
            registry.len(),
            registry.path().display()
        );
        Ok(())
    }

    /// Flush the registry to the store once, then discard in-memory state.
    pub async fn on_stop(&self) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.flush()?;
        info!(
            "Flushed {} reminder(s) to {}",
            registry.len(),
            registry.path().display()
        );
        registry.clear();
        Ok(())
    }

    /// Snapshot of the pending reminders, in creation order.
    pub async fn pending(&self) -> Vec<Reminder> {
        self.registry.lock().await.snapshot()
    }

    /// `in` command: a relative duration, then the message.
    pub async fn remind_in(
        &self,
        requester: &str,
        destination: &str,
        args: Option<&str>,
    ) -> String {
        let Some(args) = args else {
            return PROMPT_REPLY.to_string();
        };

        let (duration, message) = match parser::parse_in(args) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Rejected in arguments from {requester}: {e}");
                return APOLOGY_REPLY.to_string();
            }
        };

        let when = Utc::now() + Duration::seconds(duration.total_seconds());
        let reminder = Reminder::new(when.timestamp(), destination, requester, message);
        self.register(reminder, when).await
    }

    /// `at` command: an exact (date) time in the requester's timezone, then
    /// the message.
    pub async fn remind_at(
        &self,
        requester: &str,
        destination: &str,
        args: Option<&str>,
    ) -> String {
        let Some(args) = args else {
            return PROMPT_REPLY.to_string();
        };

        let tz = self
            .messenger
            .timezone_for(Some(requester), Some(destination));
        let now = Utc::now().with_timezone(&tz);

        let (when, message) = match parser::parse_at(args, now) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Rejected at arguments from {requester}: {e}");
                return APOLOGY_REPLY.to_string();
            }
        };

        let reminder = Reminder::new(when.timestamp(), destination, requester, message);
        self.register(reminder, when.with_timezone(&Utc)).await
    }

    /// Append + persist under the registry lock, then confirm with the
    /// delivery time rendered in the reminder's timezone.
    async fn register(&self, reminder: Reminder, when: DateTime<Utc>) -> String {
        let tz = self
            .messenger
            .timezone_for(Some(&reminder.originator), Some(&reminder.destination));

        {
            let mut registry = self.registry.lock().await;
            if let Err(e) = registry.add(reminder) {
                warn!("Failed to persist new reminder: {e}");
            }
        }

        format!(
            "I will remind you that at {}",
            when.with_timezone(&tz).format("%H:%M:%S")
        )
    }
}

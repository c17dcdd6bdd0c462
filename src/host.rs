//! # Host Messaging Interface
//!
//! What the reminder core needs from the host messaging runtime. The host
//! owns the connection, the live channel/user state, and the actual sends;
//! this crate only ever talks to it through [`Messenger`].
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono_tz::Tz;

/// What a destination identifier currently resolves to, as one capability
/// query instead of membership checks against two opaque host-provided sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A known channel and its current occupants.
    ///
    /// Occupant identifiers must be in the same canonical form as the
    /// requester identities the host passes to the command handlers: the
    /// sweep matches them by string equality. A host whose nicks are
    /// case-insensitive must normalize both sides (a reminder whose
    /// originator never matches any occupant is retained indefinitely).
    Channel { occupants: HashSet<String> },
    /// A known direct recipient.
    Direct,
    /// Neither, right now. It may become known later, so reminders aimed at
    /// it are retained, not dropped.
    Unknown,
}

/// Interface to the host messaging runtime.
///
/// Sends are fire-and-forget from the core's perspective: a failed send is
/// logged and the reminder is still considered delivered.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Whether the connection is established and registered. Gates every
    /// sweep; partial connection states must answer `false`.
    fn is_connected(&self) -> bool;

    /// Resolve a destination identifier against live state.
    fn resolve_destination(&self, destination: &str) -> Destination;

    /// Send to a channel, mentioning `nick`.
    async fn reply_in_channel(&self, channel: &str, nick: &str, message: &str) -> Result<()>;

    /// Send a direct message.
    async fn send_direct(&self, recipient: &str, message: &str) -> Result<()>;

    /// Timezone configured for a user and/or channel. UTC when unset.
    fn timezone_for(&self, nick: Option<&str>, channel: Option<&str>) -> Tz {
        let _ = (nick, channel);
        Tz::UTC
    }
}

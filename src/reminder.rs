//! # Reminder Value Type
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

/// A scheduled message: when to send it, where, for whom, and what.
///
/// `timestamp` is always UTC epoch seconds, whatever timezone was used to
/// compute it, so stored reminders are timezone-agnostic. Equality is
/// structural and duplicates are legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    /// Delivery instant, UTC epoch seconds.
    pub timestamp: i64,
    /// Channel name or direct recipient. The messaging layer disambiguates
    /// the two; this core never inspects the identifier's shape.
    pub destination: String,
    /// Who asked to be reminded.
    pub originator: String,
    /// What to send.
    pub message: String,
}

impl Reminder {
    pub fn new(
        timestamp: i64,
        destination: impl Into<String>,
        originator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            destination: destination.into(),
            originator: originator.into(),
            message: message.into(),
        }
    }

    /// Whether the delivery instant has been reached at `now`.
    pub fn is_due(&self, now: i64) -> bool {
        self.timestamp <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Reminder::new(523553400, "#channel", "Exirel", "yay!");
        let b = Reminder::new(523553400, "#channel", "Exirel", "yay!");
        assert_eq!(a, b);

        let c = Reminder::new(523553401, "#channel", "Exirel", "yay!");
        assert_ne!(a, c);
    }

    #[test]
    fn test_is_due() {
        let reminder = Reminder::new(1000, "#channel", "Test", "message");
        assert!(!reminder.is_due(999));
        assert!(reminder.is_due(1000));
        assert!(reminder.is_due(1001));
    }
}

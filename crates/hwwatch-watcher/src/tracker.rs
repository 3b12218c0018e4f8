//! Change tracker — de-duplicates outgoing notifications.
//!
//! A single slot holds the last message handed to the notifier, status or
//! error alike. Comparison is plain string equality.

#[derive(Debug, Default, Clone)]
pub struct ChangeTracker {
    last_notified: Option<String>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `candidate` differs from the last attempted message.
    pub fn should_notify(&self, candidate: &str) -> bool {
        self.last_notified.as_deref() != Some(candidate)
    }

    /// Record a delivery attempt, successful or not.
    pub fn commit(&mut self, candidate: impl Into<String>) {
        self.last_notified = Some(candidate.into());
    }

    pub fn last_notified(&self) -> Option<&str> {
        self.last_notified.as_deref()
    }
}

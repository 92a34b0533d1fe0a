use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Amount;

pub type ClientId = String;

/// A client is refused authentication once this many consecutive PIN
/// failures have accumulated. The counter never exceeds this value.
pub const MAX_FAILED_ATTEMPTS: u8 = 3;

/// A bank customer record: the PIN, the consecutive-failure counter, and
/// the named account balances.
///
/// Serializable so a ledger seed can be loaded from a JSON file; the
/// attempt counter and lockout timestamp default to the unlocked state
/// when absent from the seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub pin: String,
    #[serde(default)]
    pub failed_attempts: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<DateTime<Utc>>,
    pub accounts: BTreeMap<String, Amount>,
}

impl Client {
    pub fn new(pin: impl Into<String>) -> Self {
        Self {
            pin: pin.into(),
            failed_attempts: 0,
            locked_at: None,
            accounts: BTreeMap::new(),
        }
    }

    pub fn with_account(mut self, name: impl Into<String>, balance: Amount) -> Self {
        self.accounts.insert(name.into(), balance);
        self
    }

    pub fn is_locked(&self) -> bool {
        self.failed_attempts >= MAX_FAILED_ATTEMPTS
    }

    /// How many more PIN attempts are allowed before the card is retained.
    pub fn attempts_remaining(&self) -> u8 {
        MAX_FAILED_ATTEMPTS.saturating_sub(self.failed_attempts)
    }

    /// Register a wrong-PIN attempt. The counter saturates at the maximum;
    /// the lockout timestamp is set when the final attempt is burned.
    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        if self.failed_attempts < MAX_FAILED_ATTEMPTS {
            self.failed_attempts += 1;
            if self.failed_attempts == MAX_FAILED_ATTEMPTS {
                self.locked_at = Some(now);
            }
        }
    }

    /// Register a correct PIN: the failure counter resets to zero.
    pub fn record_success(&mut self) {
        self.failed_attempts = 0;
        self.locked_at = None;
    }
}

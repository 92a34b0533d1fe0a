use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{Amount, Client, ClientId};

/// Outcome of a PIN check against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// PIN matched; the failure counter has been reset.
    Granted,
    /// PIN rejected. When no attempts remain the card must be retained.
    /// Unknown client ids report zero attempts remaining so the caller
    /// cannot distinguish them from an exhausted card.
    Denied { attempts_remaining: u8 },
    /// The client was already locked out before this attempt; the PIN was
    /// not compared.
    LockedOut,
}

/// The in-memory collection of all client records.
///
/// The ledger is process-wide state: it is created once (from the built-in
/// seed or a JSON seed file) and outlives individual teller sessions, so
/// failed-attempt counters and balance changes carry across sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    clients: BTreeMap<ClientId, Client>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed demo client set the simulator starts with.
    pub fn seed() -> Self {
        let mut ledger = Self::new();
        ledger.insert(
            "12345678",
            Client::new("1234")
                .with_account("ahorros", 500_000)
                .with_account("corriente", 200_000),
        );
        ledger.insert(
            "87654321",
            Client::new("4321")
                .with_account("ahorros", 1_000_000)
                .with_account("corriente", 300_000),
        );
        ledger
    }

    pub fn insert(&mut self, id: impl Into<ClientId>, client: Client) {
        self.clients.insert(id.into(), client);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.clients.contains_key(id)
    }

    pub fn client(&self, id: &str) -> Result<&Client, LedgerError> {
        self.clients
            .get(id)
            .ok_or_else(|| LedgerError::ClientNotFound(id.to_string()))
    }

    fn client_mut(&mut self, id: &str) -> Result<&mut Client, LedgerError> {
        self.clients
            .get_mut(id)
            .ok_or_else(|| LedgerError::ClientNotFound(id.to_string()))
    }

    /// Check a PIN. A wrong PIN burns one attempt; a correct PIN resets the
    /// counter. A client already locked out is refused without the PIN
    /// being compared, and an unknown id is reported as a denial with no
    /// attempts remaining.
    pub fn authenticate(&mut self, id: &str, pin: &str) -> AuthOutcome {
        let Some(client) = self.clients.get_mut(id) else {
            return AuthOutcome::Denied {
                attempts_remaining: 0,
            };
        };

        if client.is_locked() {
            return AuthOutcome::LockedOut;
        }

        if client.pin == pin {
            client.record_success();
            AuthOutcome::Granted
        } else {
            client.record_failure(Utc::now());
            AuthOutcome::Denied {
                attempts_remaining: client.attempts_remaining(),
            }
        }
    }

    /// Administrative lockout reset. Lockouts have no expiry timer; this is
    /// the only way a retained card becomes usable again.
    pub fn unlock(&mut self, id: &str) -> Result<(), LedgerError> {
        self.client_mut(id)?.record_success();
        Ok(())
    }

    /// The named account balances for a client. Callers are expected to
    /// have authenticated first; an unknown id still fails cleanly.
    pub fn accounts(&self, id: &str) -> Result<&BTreeMap<String, Amount>, LedgerError> {
        Ok(&self.client(id)?.accounts)
    }

    pub fn balance(&self, id: &str, account: &str) -> Result<Amount, LedgerError> {
        let client = self.client(id)?;
        client
            .accounts
            .get(account)
            .copied()
            .ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))
    }

    /// Withdraw `amount` from an account. The balance check precedes the
    /// mutation, so a failed withdrawal leaves the balance untouched.
    pub fn withdraw(&mut self, id: &str, account: &str, amount: Amount) -> Result<Amount, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let client = self.client_mut(id)?;
        let balance = client
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))?;

        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: account.to_string(),
                balance: *balance,
                requested: amount,
            });
        }

        *balance -= amount;
        Ok(*balance)
    }

    /// Deposit `amount` into an account. Zero deposits are rejected; the
    /// permissive behavior of accepting any amount was a known gap. A
    /// deposit that would overflow the balance fails without mutation.
    pub fn deposit(&mut self, id: &str, account: &str, amount: Amount) -> Result<Amount, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let client = self.client_mut(id)?;
        let balance = client
            .accounts
            .get_mut(account)
            .ok_or_else(|| LedgerError::AccountNotFound(account.to_string()))?;

        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(account.to_string()))?;
        Ok(*balance)
    }

    /// Move `amount` between two accounts of the same client. All checks
    /// run before either balance changes, so the pair of mutations never
    /// partially applies and the sum of the two balances is preserved.
    pub fn transfer(
        &mut self,
        id: &str,
        from_account: &str,
        to_account: &str,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        let client = self.client_mut(id)?;

        let from_balance = *client
            .accounts
            .get(from_account)
            .ok_or_else(|| LedgerError::AccountNotFound(from_account.to_string()))?;
        let to_balance = *client
            .accounts
            .get(to_account)
            .ok_or_else(|| LedgerError::AccountNotFound(to_account.to_string()))?;

        if from_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: from_account.to_string(),
                balance: from_balance,
                requested: amount,
            });
        }

        // A same-account transfer debits before it credits, so only a
        // distinct destination can overflow.
        if from_account != to_account && to_balance.checked_add(amount).is_none() {
            return Err(LedgerError::BalanceOverflow(to_account.to_string()));
        }

        *client
            .accounts
            .get_mut(from_account)
            .expect("source account checked above") -= amount;
        *client
            .accounts
            .get_mut(to_account)
            .expect("destination account checked above") += amount;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    ClientNotFound(String),
    AccountNotFound(String),
    InsufficientFunds {
        account: String,
        balance: Amount,
        requested: Amount,
    },
    InvalidAmount(Amount),
    BalanceOverflow(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::ClientNotFound(id) => write!(f, "Unknown client: {}", id),
            LedgerError::AccountNotFound(name) => write!(f, "Unknown account: {}", name),
            LedgerError::InsufficientFunds {
                account,
                balance,
                requested,
            } => write!(
                f,
                "Insufficient funds in account {}: balance {}, requested {}",
                account, balance, requested
            ),
            LedgerError::InvalidAmount(amount) => {
                write!(f, "Invalid amount: {}", amount)
            }
            LedgerError::BalanceOverflow(account) => {
                write!(f, "Amount too large: account {} cannot hold it", account)
            }
        }
    }
}

impl std::error::Error for LedgerError {}

use std::fmt;

use crate::domain::{
    format_amount, is_denominated, parse_amount, Amount, AuthOutcome, Ledger,
    WITHDRAWAL_DENOMINATION,
};

use super::AppError;

/// One customer interaction with the teller, modeled as an explicit state
/// machine. Inputs arrive as text lines through [`SessionController::submit`]
/// and every reply carries the status messages to show plus the next prompt,
/// so any front end (interactive console, scripted replay, tests) can drive
/// a session deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Powered down; the operator has not switched the teller on.
    Off,
    AwaitingId,
    AwaitingPin { client_id: String },
    MenuActive { client_id: String },
    /// Collecting the multi-step inputs of one menu operation. Completion
    /// or rejection of the flow always returns to `MenuActive`.
    InFlow { client_id: String, flow: Flow },
    /// Three PIN failures (or an unknown card): terminal for the session.
    Locked,
    /// The customer signed out or the operator declined power-on.
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    WithdrawAccount,
    WithdrawAmount { account: String },
    DepositAccount,
    DepositAmount { account: String },
    DepositPaymentType { account: String, amount: Amount },
    TransferSource,
    TransferDestination { from: String },
    TransferAmount { from: String, to: String },
    BalanceAccount,
}

/// The question the session is currently waiting on. `Display` renders the
/// human-readable prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    PowerOn,
    Identity,
    Pin,
    Menu,
    WithdrawAccount,
    WithdrawAmount,
    DepositAccount,
    DepositAmount,
    DepositPaymentType,
    TransferSource,
    TransferDestination,
    TransferAmount,
    BalanceAccount,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::PowerOn => write!(f, "Operator panel: power on the teller? (yes/no):"),
            Prompt::Identity => write!(f, "Insert your identity document:"),
            Prompt::Pin => write!(f, "Enter your PIN:"),
            Prompt::Menu => write!(
                f,
                "Menu:\n1. Withdraw cash\n2. Deposit\n3. Transfer\n4. Check balance\n5. Exit\nSelect an option:"
            ),
            Prompt::WithdrawAccount | Prompt::DepositAccount | Prompt::BalanceAccount => {
                write!(f, "Select the account (ahorros/corriente):")
            }
            Prompt::WithdrawAmount => write!(
                f,
                "Enter the amount to withdraw (multiples of {}):",
                format_amount(WITHDRAWAL_DENOMINATION)
            ),
            Prompt::DepositAmount => write!(f, "Enter the amount to deposit:"),
            Prompt::DepositPaymentType => write!(f, "Cash or cheque? (cash/cheque):"),
            Prompt::TransferSource => {
                write!(f, "Select the source account (ahorros/corriente):")
            }
            Prompt::TransferDestination => {
                write!(f, "Select the destination account (ahorros/corriente):")
            }
            Prompt::TransferAmount => write!(f, "Enter the amount to transfer:"),
        }
    }
}

/// What the session hands back after each input: zero or more status lines
/// and, unless the session has ended, the next prompt.
#[derive(Debug, Clone)]
pub struct SessionReply {
    pub messages: Vec<String>,
    pub prompt: Option<Prompt>,
}

impl SessionReply {
    fn prompt(prompt: Prompt) -> Self {
        Self {
            messages: Vec::new(),
            prompt: Some(prompt),
        }
    }

    fn say(message: impl Into<String>, prompt: Prompt) -> Self {
        Self {
            messages: vec![message.into()],
            prompt: Some(prompt),
        }
    }

    fn end(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
            prompt: None,
        }
    }

    /// True once the session no longer accepts input.
    pub fn is_final(&self) -> bool {
        self.prompt.is_none()
    }
}

/// Drives one session against a borrowed ledger. The controller owns no
/// monetary state of its own: it remembers only which client authenticated
/// and which prompt is outstanding, while balances and attempt counters
/// live in the ledger and survive the session.
pub struct SessionController<'a> {
    ledger: &'a mut Ledger,
    state: SessionState,
}

impl<'a> SessionController<'a> {
    pub fn new(ledger: &'a mut Ledger) -> Self {
        Self {
            ledger,
            state: SessionState::Off,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Locked | SessionState::Terminated)
    }

    /// Emit the power-on question. Only meaningful while the teller is off.
    pub fn start(&mut self) -> SessionReply {
        match self.state {
            SessionState::Off => SessionReply::prompt(Prompt::PowerOn),
            _ => self.reply_for_current_state(),
        }
    }

    /// Feed one line of input to the session and advance the state machine.
    pub fn submit(&mut self, input: &str) -> SessionReply {
        let input = input.trim();
        let state = std::mem::replace(&mut self.state, SessionState::Terminated);
        let (next, reply) = match state {
            SessionState::Off => Self::handle_power_on(input),
            SessionState::AwaitingId => (
                SessionState::AwaitingPin {
                    client_id: input.to_string(),
                },
                SessionReply::prompt(Prompt::Pin),
            ),
            SessionState::AwaitingPin { client_id } => self.handle_pin(client_id, input),
            SessionState::MenuActive { client_id } => Self::handle_menu(client_id, input),
            SessionState::InFlow { client_id, flow } => self.handle_flow(client_id, flow, input),
            SessionState::Locked => (SessionState::Locked, SessionReply::end("Session has ended.")),
            SessionState::Terminated => (
                SessionState::Terminated,
                SessionReply::end("Session has ended."),
            ),
        };
        self.state = next;
        reply
    }

    fn handle_power_on(input: &str) -> (SessionState, SessionReply) {
        match input.to_lowercase().as_str() {
            "yes" | "y" | "si" | "sí" => (
                SessionState::AwaitingId,
                SessionReply::say("Automated teller powered on.", Prompt::Identity),
            ),
            _ => (
                SessionState::Terminated,
                SessionReply::end("Automated teller remains off."),
            ),
        }
    }

    fn handle_pin(&mut self, client_id: String, pin: &str) -> (SessionState, SessionReply) {
        match self.ledger.authenticate(&client_id, pin) {
            AuthOutcome::Granted => (
                SessionState::MenuActive { client_id },
                SessionReply::say("PIN accepted.", Prompt::Menu),
            ),
            AuthOutcome::Denied { attempts_remaining } if attempts_remaining > 0 => (
                SessionState::AwaitingPin { client_id },
                SessionReply::say(
                    format!(
                        "{}. {} attempt(s) remaining.",
                        AppError::AuthenticationFailed,
                        attempts_remaining
                    ),
                    Prompt::Pin,
                ),
            ),
            AuthOutcome::Denied { .. } | AuthOutcome::LockedOut => (
                SessionState::Locked,
                SessionReply::end(format!("{}. Card retained.", AppError::AccountLockedOut)),
            ),
        }
    }

    fn handle_menu(client_id: String, selection: &str) -> (SessionState, SessionReply) {
        let flow = match selection {
            "1" => Flow::WithdrawAccount,
            "2" => Flow::DepositAccount,
            "3" => Flow::TransferSource,
            "4" => Flow::BalanceAccount,
            "5" => {
                return (
                    SessionState::Terminated,
                    SessionReply::end("Thank you for using the automated teller. Goodbye."),
                );
            }
            other => {
                let err = AppError::InvalidSelection(other.to_string());
                return (
                    SessionState::MenuActive { client_id },
                    SessionReply::say(err.to_string(), Prompt::Menu),
                );
            }
        };
        let prompt = Self::flow_prompt(&flow);
        (SessionState::InFlow { client_id, flow }, SessionReply::prompt(prompt))
    }

    fn flow_prompt(flow: &Flow) -> Prompt {
        match flow {
            Flow::WithdrawAccount => Prompt::WithdrawAccount,
            Flow::WithdrawAmount { .. } => Prompt::WithdrawAmount,
            Flow::DepositAccount => Prompt::DepositAccount,
            Flow::DepositAmount { .. } => Prompt::DepositAmount,
            Flow::DepositPaymentType { .. } => Prompt::DepositPaymentType,
            Flow::TransferSource => Prompt::TransferSource,
            Flow::TransferDestination { .. } => Prompt::TransferDestination,
            Flow::TransferAmount { .. } => Prompt::TransferAmount,
            Flow::BalanceAccount => Prompt::BalanceAccount,
        }
    }

    fn handle_flow(
        &mut self,
        client_id: String,
        flow: Flow,
        input: &str,
    ) -> (SessionState, SessionReply) {
        match flow {
            Flow::WithdrawAccount => Self::next_step(
                client_id,
                Flow::WithdrawAmount {
                    account: input.to_string(),
                },
            ),
            Flow::WithdrawAmount { account } => {
                let amount = match parse_amount(input) {
                    Ok(amount) => amount,
                    Err(err) => {
                        return Self::back_to_menu(client_id, AppError::InvalidAmount(err.to_string()));
                    }
                };
                // Dispensed in fixed bills: validated before the ledger is touched.
                if !is_denominated(amount) {
                    let err = AppError::InvalidAmount(format!(
                        "withdrawals must be positive multiples of {}",
                        format_amount(WITHDRAWAL_DENOMINATION)
                    ));
                    return Self::back_to_menu(client_id, err);
                }
                let reply = match self.ledger.withdraw(&client_id, &account, amount) {
                    Ok(_) => format!(
                        "Withdrawal approved: take {} from the tray.",
                        format_amount(amount)
                    ),
                    Err(err) => AppError::from(err).to_string(),
                };
                (
                    SessionState::MenuActive { client_id },
                    SessionReply::say(reply, Prompt::Menu),
                )
            }
            Flow::DepositAccount => Self::next_step(
                client_id,
                Flow::DepositAmount {
                    account: input.to_string(),
                },
            ),
            Flow::DepositAmount { account } => match parse_amount(input) {
                Ok(amount) => Self::next_step(client_id, Flow::DepositPaymentType { account, amount }),
                Err(err) => Self::back_to_menu(client_id, AppError::InvalidAmount(err.to_string())),
            },
            Flow::DepositPaymentType { account, amount } => {
                // The payment type answer is collected but the ledger does
                // not distinguish cash from cheque.
                let reply = match self.ledger.deposit(&client_id, &account, amount) {
                    Ok(_) => format!(
                        "Deposited {} into account {}.",
                        format_amount(amount),
                        account
                    ),
                    Err(err) => AppError::from(err).to_string(),
                };
                (
                    SessionState::MenuActive { client_id },
                    SessionReply::say(reply, Prompt::Menu),
                )
            }
            Flow::TransferSource => Self::next_step(
                client_id,
                Flow::TransferDestination {
                    from: input.to_string(),
                },
            ),
            Flow::TransferDestination { from } => Self::next_step(
                client_id,
                Flow::TransferAmount {
                    from,
                    to: input.to_string(),
                },
            ),
            Flow::TransferAmount { from, to } => {
                let reply = match parse_amount(input) {
                    Ok(amount) => match self.ledger.transfer(&client_id, &from, &to, amount) {
                        Ok(()) => format!(
                            "Transferred {} from {} to {}.",
                            format_amount(amount),
                            from,
                            to
                        ),
                        Err(err) => AppError::from(err).to_string(),
                    },
                    Err(err) => AppError::InvalidAmount(err.to_string()).to_string(),
                };
                (
                    SessionState::MenuActive { client_id },
                    SessionReply::say(reply, Prompt::Menu),
                )
            }
            Flow::BalanceAccount => {
                let reply = match self.ledger.balance(&client_id, input) {
                    Ok(balance) => format!(
                        "Balance of account {}: {}.",
                        input,
                        format_amount(balance)
                    ),
                    Err(err) => AppError::from(err).to_string(),
                };
                (
                    SessionState::MenuActive { client_id },
                    SessionReply::say(reply, Prompt::Menu),
                )
            }
        }
    }

    fn next_step(client_id: String, flow: Flow) -> (SessionState, SessionReply) {
        let prompt = Self::flow_prompt(&flow);
        (SessionState::InFlow { client_id, flow }, SessionReply::prompt(prompt))
    }

    fn back_to_menu(client_id: String, err: AppError) -> (SessionState, SessionReply) {
        (
            SessionState::MenuActive { client_id },
            SessionReply::say(err.to_string(), Prompt::Menu),
        )
    }

    fn reply_for_current_state(&self) -> SessionReply {
        let prompt = match &self.state {
            SessionState::Off => Some(Prompt::PowerOn),
            SessionState::AwaitingId => Some(Prompt::Identity),
            SessionState::AwaitingPin { .. } => Some(Prompt::Pin),
            SessionState::MenuActive { .. } => Some(Prompt::Menu),
            SessionState::InFlow { flow, .. } => Some(Self::flow_prompt(flow)),
            SessionState::Locked | SessionState::Terminated => None,
        };
        SessionReply {
            messages: Vec::new(),
            prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authed(ledger: &mut Ledger) -> SessionController<'_> {
        let mut session = SessionController::new(ledger);
        session.start();
        session.submit("yes");
        session.submit("12345678");
        let reply = session.submit("1234");
        assert_eq!(reply.prompt, Some(Prompt::Menu));
        session
    }

    #[test]
    fn test_declining_power_on_terminates() {
        let mut ledger = Ledger::seed();
        let mut session = SessionController::new(&mut ledger);
        session.start();
        let reply = session.submit("no");
        assert!(reply.is_final());
        assert_eq!(*session.state(), SessionState::Terminated);
    }

    #[test]
    fn test_pin_retry_then_success() {
        let mut ledger = Ledger::seed();
        let mut session = SessionController::new(&mut ledger);
        session.start();
        session.submit("yes");
        session.submit("12345678");
        let reply = session.submit("0000");
        assert_eq!(reply.prompt, Some(Prompt::Pin));
        let reply = session.submit("1234");
        assert_eq!(reply.prompt, Some(Prompt::Menu));
    }

    #[test]
    fn test_third_failure_locks_session() {
        let mut ledger = Ledger::seed();
        let mut session = SessionController::new(&mut ledger);
        session.start();
        session.submit("yes");
        session.submit("87654321");
        session.submit("0000");
        session.submit("0001");
        let reply = session.submit("0002");
        assert!(reply.is_final());
        assert_eq!(*session.state(), SessionState::Locked);
    }

    #[test]
    fn test_unknown_card_locks_immediately() {
        let mut ledger = Ledger::seed();
        let mut session = SessionController::new(&mut ledger);
        session.start();
        session.submit("yes");
        session.submit("00000000");
        let reply = session.submit("1234");
        assert!(reply.is_final());
        assert_eq!(*session.state(), SessionState::Locked);
    }

    #[test]
    fn test_invalid_selection_redisplays_menu() {
        let mut ledger = Ledger::seed();
        let mut session = authed(&mut ledger);
        let reply = session.submit("9");
        assert_eq!(reply.prompt, Some(Prompt::Menu));
        assert!(reply.messages[0].contains("Invalid menu selection"));
    }

    #[test]
    fn test_withdraw_flow() {
        let mut ledger = Ledger::seed();
        {
            let mut session = authed(&mut ledger);
            session.submit("1");
            session.submit("ahorros");
            let reply = session.submit("100000");
            assert!(reply.messages[0].contains("Withdrawal approved"));
            assert_eq!(reply.prompt, Some(Prompt::Menu));
        }
        assert_eq!(ledger.balance("12345678", "ahorros").unwrap(), 400_000);
    }

    #[test]
    fn test_withdraw_rejects_undenominated_amount() {
        let mut ledger = Ledger::seed();
        {
            let mut session = authed(&mut ledger);
            session.submit("1");
            session.submit("ahorros");
            let reply = session.submit("70000");
            assert!(reply.messages[0].contains("Invalid amount"));
            assert_eq!(reply.prompt, Some(Prompt::Menu));
        }
        // Rejected before the ledger: balance untouched.
        assert_eq!(ledger.balance("12345678", "ahorros").unwrap(), 500_000);
    }

    #[test]
    fn test_deposit_flow_ignores_payment_type() {
        let mut ledger = Ledger::seed();
        {
            let mut session = authed(&mut ledger);
            session.submit("2");
            session.submit("corriente");
            session.submit("150000");
            let reply = session.submit("cheque");
            assert!(reply.messages[0].contains("Deposited"));
        }
        assert_eq!(ledger.balance("12345678", "corriente").unwrap(), 350_000);
    }

    #[test]
    fn test_transfer_flow_insufficient_funds() {
        let mut ledger = Ledger::seed();
        {
            let mut session = authed(&mut ledger);
            session.submit("3");
            session.submit("ahorros");
            session.submit("corriente");
            let reply = session.submit("600000");
            assert!(reply.messages[0].contains("Insufficient funds"));
            assert_eq!(reply.prompt, Some(Prompt::Menu));
        }
        assert_eq!(ledger.balance("12345678", "ahorros").unwrap(), 500_000);
        assert_eq!(ledger.balance("12345678", "corriente").unwrap(), 200_000);
    }

    #[test]
    fn test_balance_flow() {
        let mut ledger = Ledger::seed();
        let mut session = authed(&mut ledger);
        session.submit("4");
        let reply = session.submit("ahorros");
        assert!(reply.messages[0].contains("$500,000"));
    }

    #[test]
    fn test_sign_out_terminates() {
        let mut ledger = Ledger::seed();
        let mut session = authed(&mut ledger);
        let reply = session.submit("5");
        assert!(reply.is_final());
        assert!(session.is_finished());
    }

    #[test]
    fn test_input_after_end_is_refused() {
        let mut ledger = Ledger::seed();
        let mut session = SessionController::new(&mut ledger);
        session.start();
        session.submit("no");
        let reply = session.submit("anything");
        assert!(reply.is_final());
    }
}

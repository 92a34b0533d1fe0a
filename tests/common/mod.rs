// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use cajero::application::SessionController;
use cajero::domain::Ledger;

/// The built-in two-client demo ledger.
pub fn seeded_ledger() -> Ledger {
    Ledger::seed()
}

/// Drive one full session through a scripted input sequence and collect
/// every status message emitted along the way.
pub fn run_session(ledger: &mut Ledger, inputs: &[&str]) -> Vec<String> {
    let mut session = SessionController::new(ledger);
    session.start();

    let mut messages = Vec::new();
    for input in inputs {
        let reply = session.submit(input);
        messages.extend(reply.messages.iter().cloned());
        if reply.is_final() {
            break;
        }
    }
    messages
}

/// Inputs that power on and authenticate the first demo client.
pub fn login_prefix() -> Vec<&'static str> {
    vec!["yes", "12345678", "1234"]
}

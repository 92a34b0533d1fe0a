mod common;

use cajero::application::{Prompt, SessionController, SessionState};
use cajero::domain::Ledger;
use common::{login_prefix, run_session, seeded_ledger};

#[test]
fn test_withdraw_scenario() {
    // Client 12345678, ahorros starts at 500000: withdrawing 100000
    // succeeds and leaves 400000.
    let mut ledger = seeded_ledger();
    let mut inputs = login_prefix();
    inputs.extend(["1", "ahorros", "100000", "5"]);

    let messages = run_session(&mut ledger, &inputs);
    assert!(messages.iter().any(|m| m.contains("Withdrawal approved")));
    assert_eq!(ledger.balance("12345678", "ahorros").unwrap(), 400_000);
}

#[test]
fn test_withdraw_rejects_non_denominated_amount() {
    // 70000 is not a multiple of 50000: rejected before the ledger, so
    // the balance stays at 500000.
    let mut ledger = seeded_ledger();
    let mut inputs = login_prefix();
    inputs.extend(["1", "ahorros", "70000", "5"]);

    let messages = run_session(&mut ledger, &inputs);
    assert!(messages.iter().any(|m| m.contains("Invalid amount")));
    assert_eq!(ledger.balance("12345678", "ahorros").unwrap(), 500_000);
}

#[test]
fn test_transfer_insufficient_funds_changes_no_balances() {
    let mut ledger = seeded_ledger();
    let mut inputs = login_prefix();
    inputs.extend(["3", "ahorros", "corriente", "600000", "5"]);

    let messages = run_session(&mut ledger, &inputs);
    assert!(messages.iter().any(|m| m.contains("Insufficient funds")));
    assert_eq!(ledger.balance("12345678", "ahorros").unwrap(), 500_000);
    assert_eq!(ledger.balance("12345678", "corriente").unwrap(), 200_000);
}

#[test]
fn test_transfer_preserves_account_sum() {
    let mut ledger = seeded_ledger();
    let before = ledger.balance("12345678", "ahorros").unwrap()
        + ledger.balance("12345678", "corriente").unwrap();

    let mut inputs = login_prefix();
    inputs.extend(["3", "ahorros", "corriente", "200000", "5"]);
    run_session(&mut ledger, &inputs);

    let after = ledger.balance("12345678", "ahorros").unwrap()
        + ledger.balance("12345678", "corriente").unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_deposit_then_withdraw_round_trip() {
    // Depositing a denominated amount and withdrawing it again restores
    // the original balance.
    let mut ledger = seeded_ledger();
    let mut inputs = login_prefix();
    inputs.extend([
        "2", "ahorros", "100000", "cash", // deposit
        "1", "ahorros", "100000", // withdraw
        "5",
    ]);

    run_session(&mut ledger, &inputs);
    assert_eq!(ledger.balance("12345678", "ahorros").unwrap(), 500_000);
}

#[test]
fn test_huge_deposit_reported_not_fatal() {
    // The largest parseable amount overflows the balance; the ledger
    // refuses it and the session returns to the menu.
    let mut ledger = seeded_ledger();
    let mut inputs = login_prefix();
    inputs.extend(["2", "ahorros", "18446744073709551615", "cash", "5"]);

    let messages = run_session(&mut ledger, &inputs);
    assert!(messages.iter().any(|m| m.contains("Amount too large")));
    assert_eq!(ledger.balance("12345678", "ahorros").unwrap(), 500_000);
}

#[test]
fn test_three_wrong_pins_lock_even_for_correct_fourth() {
    let mut ledger = seeded_ledger();

    // Three wrong PINs end the session with the card retained.
    let messages = run_session(&mut ledger, &["yes", "87654321", "0000", "1111", "2222"]);
    assert!(messages.iter().any(|m| m.contains("Card retained")));

    // A fresh session with the correct PIN is still refused.
    let messages = run_session(&mut ledger, &["yes", "87654321", "4321"]);
    assert!(messages.iter().any(|m| m.contains("Card locked")));
    assert_eq!(ledger.balance("87654321", "ahorros").unwrap(), 1_000_000);
}

#[test]
fn test_failed_attempts_reset_on_success_across_sessions() {
    let mut ledger = seeded_ledger();

    // Two failures, then success: the counter resets to zero.
    run_session(&mut ledger, &["yes", "12345678", "0000", "1111", "1234", "5"]);
    assert_eq!(ledger.client("12345678").unwrap().failed_attempts, 0);

    // A later session gets the full three attempts again.
    let messages = run_session(&mut ledger, &["yes", "12345678", "9999", "1234", "5"]);
    assert!(messages.iter().any(|m| m.contains("PIN accepted")));
}

#[test]
fn test_ledger_state_persists_across_sessions() {
    let mut ledger = seeded_ledger();

    let mut inputs = login_prefix();
    inputs.extend(["1", "ahorros", "50000", "5"]);
    run_session(&mut ledger, &inputs);

    let mut inputs = login_prefix();
    inputs.extend(["1", "ahorros", "50000", "5"]);
    run_session(&mut ledger, &inputs);

    assert_eq!(ledger.balance("12345678", "ahorros").unwrap(), 400_000);
}

#[test]
fn test_menu_self_loop_on_invalid_selection() {
    let mut ledger = seeded_ledger();
    let mut session = SessionController::new(&mut ledger);
    session.start();
    session.submit("yes");
    session.submit("12345678");
    session.submit("1234");

    let reply = session.submit("7");
    assert!(reply.messages[0].contains("Invalid menu selection"));
    assert_eq!(reply.prompt, Some(Prompt::Menu));
    assert!(matches!(session.state(), SessionState::MenuActive { .. }));

    // The menu still works after the bad selection.
    let reply = session.submit("4");
    assert_eq!(reply.prompt, Some(Prompt::BalanceAccount));
}

#[test]
fn test_state_transitions_through_a_full_session() {
    let mut ledger = Ledger::seed();
    let mut session = SessionController::new(&mut ledger);
    assert_eq!(*session.state(), SessionState::Off);

    let reply = session.start();
    assert_eq!(reply.prompt, Some(Prompt::PowerOn));

    session.submit("yes");
    assert_eq!(*session.state(), SessionState::AwaitingId);

    session.submit("12345678");
    assert!(matches!(session.state(), SessionState::AwaitingPin { .. }));

    session.submit("1234");
    assert!(matches!(session.state(), SessionState::MenuActive { .. }));

    session.submit("5");
    assert_eq!(*session.state(), SessionState::Terminated);
    assert!(session.is_finished());
}

#[test]
fn test_unknown_account_reported_and_menu_returns() {
    let mut ledger = seeded_ledger();
    let mut inputs = login_prefix();
    inputs.extend(["4", "inversiones", "5"]);

    let messages = run_session(&mut ledger, &inputs);
    assert!(messages.iter().any(|m| m.contains("Unknown account")));
}

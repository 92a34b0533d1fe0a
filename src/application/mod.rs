// Application layer - the session state machine and the error taxonomy.
// Front ends (the CLI, a scripted replay, tests) drive a session through
// the request/response interface in `session` and never touch the ledger
// mutation paths directly.

pub mod error;
pub mod session;

pub use error::*;
pub use session::*;

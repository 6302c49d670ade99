//! Actor resolution for the interaction core.
//!
//! Session management itself lives outside this repository. The core only
//! knows this trait; the concrete implementation is injected at startup.

/// Pluggable source of the currently authenticated actor.
///
/// Every ledger operation asks the session for the actor uid first. A
/// `None` means nobody is signed in and the operation aborts without
/// touching the store.
pub trait Session: Send + Sync + 'static {
    /// The uid of the signed-in user, if any.
    fn current_uid(&self) -> Option<String>;
}

/// A session with a fixed signed-in user. Used by the CLI and tests.
#[derive(Debug, Clone)]
pub struct SignedIn(pub String);

impl Session for SignedIn {
    fn current_uid(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.clone())
    }
}

/// A session with nobody signed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedOut;

impl Session for SignedOut {
    fn current_uid(&self) -> Option<String> {
        None
    }
}

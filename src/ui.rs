//! User-interaction collaborators: the navigation callback and the
//! user-facing alert.
//!
//! The core components never touch a screen directly; they call these traits
//! so that the same state machines drive the CLI here and can be tested with
//! recording doubles.

use tracing::info;

/// The route of the bill list view.
pub const ROUTE_BILLS: &str = "#employee/bills";
/// The route of the bill creation view.
pub const ROUTE_NEW_BILL: &str = "#employee/bill/new";

/// Fire-and-forget navigation; no return value is consumed.
pub trait Navigate {
    fn navigate(&mut self, path: &str);
}

/// A blocking, user-facing notification. Raised synchronously on validation
/// failures such as an invalid receipt file extension, with a message naming
/// the rejection reason.
pub trait Alert {
    fn alert(&mut self, message: &str);
}

/// The CLI has no pages to swap; navigation is recorded in the log so the
/// workflow's "navigate away when done" contract stays observable.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogNavigate;

impl Navigate for LogNavigate {
    fn navigate(&mut self, path: &str) {
        info!("navigating to {path}");
    }
}

/// Prints the alert straight to stderr, bypassing log-level filtering: the
/// user must see it.
#[derive(Default, Debug, Clone, Copy)]
pub struct TermAlert;

impl Alert for TermAlert {
    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

//! Navigation decisions handed back to the shell.
//!
//! The core never touches the navigation stack; it pushes redirect
//! decisions onto a channel and the shell acts on them.

use tokio::sync::mpsc;

/// Where the shell should send the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// The sign-in entry point.
    SignIn,
    /// The landing page.
    Landing,
}

/// Sending half of a screen's navigation channel.
pub type Navigator = mpsc::UnboundedSender<Redirect>;

/// Build a navigation channel for one screen.
pub fn channel() -> (Navigator, mpsc::UnboundedReceiver<Redirect>) {
    mpsc::unbounded_channel()
}

//! Form controllers
//!
//! One controller per form. Each owns its raw values, per-field error
//! messages, a submitted-once flag, and the submission lifecycle:
//!
//! - field changes always update the value, but only revalidate that field
//!   after the first submit attempt;
//! - blurring a field always revalidates it;
//! - submitting sets the submitted-once flag, clears prior errors, runs
//!   the whole-form composite validator, and only reaches the remote API
//!   when validation passes.
//!
//! At most one submission per controller is in flight at a time, and a
//! completion that arrives after the controller was invalidated (the user
//! navigated away) is discarded rather than applied.

mod login;
mod observer;
mod registration;
mod response;
mod rfp;

pub use login::*;
pub use observer::*;
pub use registration::*;
pub use response::*;
pub use rfp::*;

/// Outcome of a submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// The remote call succeeded
    Success(T),
    /// Client-side validation failed; no remote call was made
    Invalid,
    /// The remote call failed; summary errors are populated
    Failed,
    /// A submission was already in flight; this attempt was ignored
    InFlight,
    /// The result arrived for a superseded controller and was discarded
    Stale,
}

impl<T> SubmitOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Success(_))
    }
}

/// A validated submission handed to the remote call, tagged with the
/// controller epoch it belongs to so stale completions can be rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmit<T> {
    pub epoch: u64,
    pub payload: T,
}

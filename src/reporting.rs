//! Failure reporting seam between the reconciliation core and whatever
//! surface wants to show failures to a user. The core only ever calls
//! `on_failure`; subscribers decide how loud to be.

use crate::gateway::FetchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-2xx HTTP status, or a network level error (status `None`).
    Transport { status: Option<u16> },
    /// 2xx response whose payload carried no usable record.
    EmptyResult,
}

impl From<&FetchError> for FailureKind {
    fn from(error: &FetchError) -> FailureKind {
        match error {
            FetchError::Transport { status } => FailureKind::Transport { status: *status },
            FetchError::Empty => FailureKind::EmptyResult,
        }
    }
}

pub trait FailureReporter {
    fn on_failure(&self, kind: FailureKind, context: &str);
}

/// Default reporter, logs through tracing.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn on_failure(&self, kind: FailureKind, context: &str) {
        match kind {
            FailureKind::Transport { status } => {
                tracing::error!(?status, context, "upstream transport failure");
            }
            FailureKind::EmptyResult => {
                tracing::warn!(context, "upstream returned no matching record");
            }
        }
    }
}

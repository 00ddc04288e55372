//! Tagged stage results
//!
//! Stages never raise past their boundary. They return an [`Outcome`] that
//! says whether the value is complete, missing, or degraded, and why.

use crate::error::Error;

/// Result of one pipeline stage
#[derive(Debug)]
pub enum Outcome<T> {
    /// The stage ran every step
    Complete(T),
    /// The stage had nothing to work with
    Empty { reason: Error },
    /// A step failed; `value` is the output as it stood before that step
    Partial { value: T, reason: Error },
}

impl<T> Outcome<T> {
    /// Borrow the value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Complete(v) | Outcome::Partial { value: v, .. } => Some(v),
            Outcome::Empty { .. } => None,
        }
    }

    /// Why the stage did not complete
    pub fn reason(&self) -> Option<&Error> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Empty { reason } | Outcome::Partial { reason, .. } => Some(reason),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Complete(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty { .. })
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Outcome::Partial { .. })
    }

    /// Short label for logs and reports
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Complete(_) => "complete",
            Outcome::Empty { .. } => "empty",
            Outcome::Partial { .. } => "partial",
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Take the value, substituting the default for an empty outcome
    pub fn into_value(self) -> T {
        match self {
            Outcome::Complete(v) | Outcome::Partial { value: v, .. } => v,
            Outcome::Empty { .. } => T::default(),
        }
    }

    /// Borrowed counterpart of [`Outcome::into_value`]
    pub fn value_or_default(&self) -> T
    where
        T: Clone,
    {
        self.value().cloned().unwrap_or_default()
    }
}

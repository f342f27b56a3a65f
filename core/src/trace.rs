//! Resolution trace types for debugging route configurations.
//!
//! [`RouteTree::resolve_with_trace`](crate::RouteTree::resolve_with_trace)
//! records every candidate the resolver looked at, in scan order, across all
//! redirect passes. The trace never changes the decision: its `result` is
//! exactly what [`RouteTree::resolve`](crate::RouteTree::resolve) returns.
//!
//! # Example
//!
//! ```
//! use routeweave::{CandidateOutcome, RouteDefinition, RouteTree};
//!
//! let tree = RouteTree::new(vec![
//!     RouteDefinition::path("a").payload("A"),
//!     RouteDefinition::path("b").payload("B"),
//! ])
//! .unwrap();
//!
//! let trace = tree.resolve_with_trace("/b");
//! assert_eq!(trace.result.unwrap().payload(), Some(&"B"));
//! assert_eq!(trace.candidates[0].outcome, CandidateOutcome::Declined);
//! assert_eq!(trace.candidates[1].outcome, CandidateOutcome::Matched { consumed: 1 });
//! ```

use std::fmt;

use crate::{ResolvedMatch, RouteError};

/// Trace of a full resolution.
///
/// # INV: `result` == `resolve()` result
pub struct ResolveTrace<'t, P> {
    /// The final result (identical to what `resolve()` returns).
    pub result: Result<ResolvedMatch<'t, P>, RouteError>,
    /// Every candidate examined, in order.
    pub candidates: Vec<CandidateTrace>,
}

impl<P: fmt::Debug> fmt::Debug for ResolveTrace<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveTrace")
            .field("result", &self.result)
            .field("candidates", &self.candidates)
            .finish()
    }
}

impl<P> ResolveTrace<'_, P> {
    /// Candidates examined during one redirect pass (`0` is the original URL).
    pub fn pass(&self, pass: usize) -> impl Iterator<Item = &CandidateTrace> {
        self.candidates.iter().filter(move |c| c.pass == pass)
    }

    /// Number of passes the resolver ran (redirects followed + 1).
    #[must_use]
    pub fn passes(&self) -> usize {
        self.candidates.last().map_or(0, |c| c.pass + 1)
    }
}

/// One route examined by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTrace {
    /// Redirect pass (`0` for the original URL).
    pub pass: usize,
    /// Nesting level (`0` for the root level).
    pub depth: usize,
    /// Index among its composed siblings.
    pub index: usize,
    /// [`Route::describe`](crate::Route::describe) of the candidate.
    pub route: String,
    /// Remaining segments offered to the candidate, as a path.
    pub remaining: String,
    /// What happened.
    pub outcome: CandidateOutcome,
}

impl fmt::Display for CandidateTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[pass {} depth {} #{}] {} on {}: {}",
            self.pass, self.depth, self.index, self.route, self.remaining, self.outcome
        )
    }
}

/// Result of offering the remaining segments to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// The pattern or matcher did not match.
    Declined,
    /// A custom matcher reported more consumed segments than were offered.
    ConsumedOutOfRange {
        /// Reported count.
        consumed: usize,
        /// Segments offered.
        available: usize,
    },
    /// `Full` strategy, but segments were left over.
    NotFull {
        /// Segments consumed.
        consumed: usize,
        /// Segments offered.
        available: usize,
    },
    /// A childless route left segments unconsumed.
    Leftover {
        /// Segments left.
        remaining: usize,
    },
    /// A childless route consumed everything. Resolution ends here.
    Matched {
        /// Segments consumed.
        consumed: usize,
    },
    /// The route matched and resolution continues in its children.
    Descended {
        /// Segments consumed.
        consumed: usize,
    },
    /// The route matched and redirected.
    Redirected {
        /// The next URL.
        to: String,
    },
}

impl CandidateOutcome {
    /// Returns `true` if this candidate was chosen.
    #[must_use]
    pub fn is_chosen(&self) -> bool {
        matches!(
            self,
            Self::Matched { .. } | Self::Descended { .. } | Self::Redirected { .. }
        )
    }
}

impl fmt::Display for CandidateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declined => f.write_str("declined"),
            Self::ConsumedOutOfRange {
                consumed,
                available,
            } => write!(f, "consumed {consumed} of {available} (out of range)"),
            Self::NotFull {
                consumed,
                available,
            } => write!(f, "full match required, consumed {consumed} of {available}"),
            Self::Leftover { remaining } => write!(f, "{remaining} segment(s) left over"),
            Self::Matched { consumed } => write!(f, "matched ({consumed})"),
            Self::Descended { consumed } => write!(f, "descended ({consumed})"),
            Self::Redirected { to } => write!(f, "redirect to {to}"),
        }
    }
}

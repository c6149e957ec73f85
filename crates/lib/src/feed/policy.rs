//! Decisions taken when the remote vault cannot be loaded.
//!
//! When the feed has no content for an identity, or the store cannot be reached,
//! the login flow can fall back to the local cache or start an empty vault. Which
//! fallback is acceptable is a caller decision, expressed as a [`DecisionPolicy`].
//! A declined offer aborts the login without exposing any vault state.

use std::{fmt, sync::Arc};

/// Why the remote copy was not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileReason {
    /// The store answered but holds nothing for this feed.
    NotFound,
    /// The store could not be reached.
    Unreachable,
}

/// An offer put to the decision policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// A cached envelope exists for this username; use it instead of the remote copy.
    UseLocalCache { reason: ReconcileReason },
    /// Nothing is cached; start a new, empty vault.
    InitializeEmpty { reason: ReconcileReason },
}

impl Prompt {
    pub fn reason(&self) -> ReconcileReason {
        match self {
            Prompt::UseLocalCache { reason } | Prompt::InitializeEmpty { reason } => *reason,
        }
    }

    /// Question suitable for showing to a user.
    pub fn message(&self) -> &'static str {
        match self {
            Prompt::UseLocalCache {
                reason: ReconcileReason::Unreachable,
            } => "Unable to read logins from the feed. Do you want to use the local cache instead?",
            Prompt::UseLocalCache {
                reason: ReconcileReason::NotFound,
            } => "No logins were found on the feed. Do you want to use the local cache instead?",
            Prompt::InitializeEmpty { .. } => {
                "No saved logins exist with that username and password. Do you want to create a new one?"
            }
        }
    }
}

/// Callback used by [`DecisionPolicy::AskCaller`].
pub type DecisionCallback = Arc<dyn Fn(&Prompt) -> bool + Send + Sync>;

/// How to answer [`Prompt`]s during login.
#[derive(Clone, Default)]
pub enum DecisionPolicy {
    /// Accept the local cache when one exists, otherwise start empty.
    PreferLocalCache,
    /// Only accept starting an empty vault; a cache offer is declined.
    InitializeEmpty,
    /// Decline every offer.
    #[default]
    Abort,
    /// Defer to the caller.
    AskCaller(DecisionCallback),
}

impl DecisionPolicy {
    /// Build an [`DecisionPolicy::AskCaller`] policy from a closure.
    pub fn ask(callback: impl Fn(&Prompt) -> bool + Send + Sync + 'static) -> Self {
        DecisionPolicy::AskCaller(Arc::new(callback))
    }

    /// Answer an offer.
    pub fn decide(&self, prompt: &Prompt) -> bool {
        match self {
            DecisionPolicy::PreferLocalCache => true,
            DecisionPolicy::InitializeEmpty => matches!(prompt, Prompt::InitializeEmpty { .. }),
            DecisionPolicy::Abort => false,
            DecisionPolicy::AskCaller(callback) => callback(prompt),
        }
    }
}

impl fmt::Debug for DecisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionPolicy::PreferLocalCache => f.write_str("PreferLocalCache"),
            DecisionPolicy::InitializeEmpty => f.write_str("InitializeEmpty"),
            DecisionPolicy::Abort => f.write_str("Abort"),
            DecisionPolicy::AskCaller(_) => f.write_str("AskCaller(..)"),
        }
    }
}

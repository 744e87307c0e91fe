//! New-file fan-out to subscribers.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use filedrop_core::types::{SubscriberId, Subscription};
use filedrop_pattern::PatternValidator;

/// What to do when a stored filter no longer compiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidPatternPolicy {
    /// Treat the subscriber as not matching and keep going
    #[default]
    Skip,
    /// Stop the broadcast; subscribers matched so far are still notified
    Abort,
}

/// Result of evaluating one new file against all subscriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastOutcome {
    /// Subscribers to notify, in subscription order
    pub targets: Vec<SubscriberId>,
    /// Subscribers whose stored filter failed to compile
    pub invalid: Vec<SubscriberId>,
    /// True if evaluation stopped at an invalid filter
    pub aborted: bool,
}

/// Matches new file names against subscriber filters.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnnounceBroadcaster {
    policy: InvalidPatternPolicy,
}

impl AnnounceBroadcaster {
    /// Creates a broadcaster with the given invalid-filter policy.
    pub fn new(policy: InvalidPatternPolicy) -> Self {
        Self { policy }
    }

    /// Returns the invalid-filter policy.
    pub fn policy(&self) -> InvalidPatternPolicy {
        self.policy
    }

    /// Subscribers whose filter matches `file_name` anywhere in the name.
    pub fn targets<'a, I>(&self, file_name: &str, subscriptions: I) -> Vec<SubscriberId>
    where
        I: IntoIterator<Item = &'a Subscription>,
    {
        self.evaluate(file_name, subscriptions).targets
    }

    /// Evaluates every filter against `file_name`.
    ///
    /// Filters are re-validated with subscription rules, so a pattern that
    /// was stored before the rules tightened, or that was corrupted on disk,
    /// is never matched.
    pub fn evaluate<'a, I>(&self, file_name: &str, subscriptions: I) -> BroadcastOutcome
    where
        I: IntoIterator<Item = &'a Subscription>,
    {
        let validator = PatternValidator::subscription();
        let mut outcome = BroadcastOutcome::default();

        for subscription in subscriptions {
            match validator.compile(&subscription.pattern) {
                Ok(matcher) => {
                    if matcher.search(file_name) {
                        outcome.targets.push(subscription.subscriber_id);
                    }
                }
                Err(e) => {
                    warn!(
                        subscriber = subscription.subscriber_id,
                        error = %e,
                        "Stored subscription pattern is invalid"
                    );
                    outcome.invalid.push(subscription.subscriber_id);
                    if self.policy == InvalidPatternPolicy::Abort {
                        outcome.aborted = true;
                        break;
                    }
                }
            }
        }

        debug!(
            file = file_name,
            targets = outcome.targets.len(),
            invalid = outcome.invalid.len(),
            aborted = outcome.aborted,
            "Broadcast evaluated"
        );
        outcome
    }
}

//! Per-user collection state machine
//!
//! Drives one user id at a time through a bounded attempt loop:
//! success, empty, and fatal outcomes are terminal on the spot; only the
//! rate-limit signal loops, by way of the coordinator's rotate-or-cooldown
//! decision. Every input id ends up in exactly one sink — the edge file on
//! success, the failure file otherwise — including the case where the
//! attempt budget runs out while rate-limited.

use rotation::{RateLimitCoordinator, RotationDecision};
use source::EdgeResult;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::sink::OutputSink;

/// Terminal state of one user task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOutcome {
    /// Edges written to the edge sink
    Succeeded { edges: usize },
    /// User follows nobody; recorded in the failure sink
    EmptyFollows,
    /// Upstream reported a non-retryable error; recorded in the failure sink
    Failed,
    /// Attempt budget consumed while rate-limited; recorded in the failure sink
    Exhausted,
}

/// Counters for one full run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub users: usize,
    pub succeeded: usize,
    pub empty: usize,
    pub failed: usize,
    pub exhausted: usize,
    pub edges: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: UserOutcome) {
        self.users += 1;
        match outcome {
            UserOutcome::Succeeded { edges } => {
                self.succeeded += 1;
                self.edges += edges;
            }
            UserOutcome::EmptyFollows => self.empty += 1,
            UserOutcome::Failed => self.failed += 1,
            UserOutcome::Exhausted => self.exhausted += 1,
        }
    }
}

/// The collection engine: one coordinator, one sink pair, one worker.
pub struct Collector<'a> {
    coordinator: &'a mut RateLimitCoordinator,
    sink: &'a mut OutputSink,
    max_attempts: u32,
}

impl<'a> Collector<'a> {
    pub fn new(
        coordinator: &'a mut RateLimitCoordinator,
        sink: &'a mut OutputSink,
        max_attempts: u32,
    ) -> Self {
        Self {
            coordinator,
            sink,
            max_attempts,
        }
    }

    /// Process every user id in order. Only session-open failures and
    /// sink I/O faults abort the run; per-user outcomes never do.
    pub async fn run(&mut self, user_ids: &[String]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for user_id in user_ids {
            info!(user_id = %user_id, "processing user");
            let outcome = self.process_user(user_id).await?;
            summary.record(outcome);
        }
        info!(
            users = summary.users,
            succeeded = summary.succeeded,
            empty = summary.empty,
            failed = summary.failed,
            exhausted = summary.exhausted,
            edges = summary.edges,
            "collection run complete"
        );
        Ok(summary)
    }

    /// Run one user task to its terminal state.
    pub async fn process_user(&mut self, user_id: &str) -> Result<UserOutcome> {
        for attempt in 1..=self.max_attempts {
            let result = {
                let session = self.coordinator.session().await?;
                session.fetch_follows(user_id).await
            };

            match result {
                EdgeResult::Follows(edges) => {
                    self.sink.write_edges(user_id, &edges)?;
                    debug!(user_id, edges = edges.len(), "completed user");
                    return Ok(UserOutcome::Succeeded { edges: edges.len() });
                }
                EdgeResult::Empty => {
                    self.sink.write_failure(user_id)?;
                    debug!(user_id, "user has no follows");
                    return Ok(UserOutcome::EmptyFollows);
                }
                EdgeResult::Fatal(reason) => {
                    self.sink.write_failure(user_id)?;
                    warn!(user_id, %reason, "user failed");
                    return Ok(UserOutcome::Failed);
                }
                EdgeResult::RateLimited => match self.coordinator.on_rate_limited() {
                    RotationDecision::Rotate(index) => {
                        info!(user_id, attempt, credential_index = index, "rate limited, rotated");
                    }
                    RotationDecision::CooldownRequired => {
                        info!(
                            user_id,
                            attempt,
                            attempts_left = self.max_attempts - attempt,
                            "rate limited on all credentials"
                        );
                        self.coordinator.cooldown().await;
                    }
                },
            }
        }

        // Rate-limited on every attempt. Record the failure explicitly so
        // the id lands in exactly one sink like every other outcome.
        self.sink.write_failure(user_id)?;
        warn!(user_id, attempts = self.max_attempts, "attempt budget exhausted");
        Ok(UserOutcome::Exhausted)
    }
}

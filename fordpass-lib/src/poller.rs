//! Command Completion Poller
//!
//! Drives a submitted command from Pending to a terminal state:
//!
//! ```text
//!            552                         200
//!   Pending ─────▶ wait interval ─▶ Pending ─────▶ Succeeded
//!      │
//!      └── other code / query error / deadline / cancel ─▶ Failed
//! ```
//!
//! The wait between queries goes through [`Deadline::sleep`], so expiry or
//! cancellation ends the loop immediately instead of after the next query.

use crate::deadline::Deadline;
use crate::error::{FordPassError, Result};
use crate::types::CommandStatus;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Source of command status for the poller
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn probe(&self, deadline: &Deadline) -> Result<CommandStatus>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Pending,
    Succeeded,
    Failed,
}

impl PollState {
    /// State entered after a status query reports `status`
    pub fn after(status: CommandStatus) -> Self {
        match status {
            CommandStatus::Pending => PollState::Pending,
            CommandStatus::Succeeded => PollState::Succeeded,
            CommandStatus::Unexpected(_) => PollState::Failed,
        }
    }
}

/// Summary of a successful poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Number of status queries issued, including the final one
    pub attempts: u32,
}

/// Repeatedly queries a submitted command until it reaches a terminal status
#[derive(Debug, Clone)]
pub struct CompletionPoller {
    interval: Duration,
}

impl CompletionPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Poll `probe` until the command succeeds, fails, or `deadline` ends the wait.
    ///
    /// Each query is preceded by one poll interval. Exactly one terminal
    /// transition happens; nothing is queried after it.
    pub async fn wait_for_completion<P>(&self, probe: &P, deadline: &Deadline) -> Result<PollReport>
    where
        P: StatusProbe + ?Sized,
    {
        let mut attempts = 0u32;

        loop {
            if let Err(err) = deadline.sleep(self.interval).await {
                warn!(attempts, error = %err, "Gave up waiting for command completion");
                return Err(err);
            }

            attempts += 1;
            let status = match probe.probe(deadline).await {
                Ok(status) => status,
                Err(err) => {
                    warn!(attempts, error = %err, "Command status query failed");
                    return Err(err);
                }
            };

            match PollState::after(status) {
                PollState::Pending => debug!(attempts, "Command still pending"),
                PollState::Succeeded => {
                    info!(attempts, "Command completed");
                    return Ok(PollReport { attempts });
                }
                PollState::Failed => {
                    warn!(attempts, status = status.code(), "Unexpected command status");
                    return Err(FordPassError::UnexpectedStatus(status.code()));
                }
            }
        }
    }
}

impl Default for CompletionPoller {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Replays a fixed script of statuses, repeating the last one forever
    struct ScriptedProbe {
        script: Mutex<VecDeque<Result<CommandStatus>>>,
        last: CommandStatus,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedProbe {
        fn new(script: Vec<Result<CommandStatus>>, last: CommandStatus) -> Self {
            Self {
                script: Mutex::new(script.into()),
                last,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn codes(codes: &[i64]) -> Self {
            let script = codes
                .iter()
                .map(|c| Ok(CommandStatus::from_code(*c)))
                .collect();
            let last = CommandStatus::from_code(*codes.last().expect("non-empty script"));
            Self::new(script, last)
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusProbe for ScriptedProbe {
        async fn probe(&self, _deadline: &Deadline) -> Result<CommandStatus> {
            self.calls.lock().unwrap().push(Instant::now());
            match self.script.lock().unwrap().pop_front() {
                Some(next) => next,
                None => Ok(self.last),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_success() {
        let probe = ScriptedProbe::codes(&[552, 552, 200]);
        let poller = CompletionPoller::default();
        let deadline = Deadline::after(Duration::from_secs(60));

        let report = poller
            .wait_for_completion(&probe, &deadline)
            .await
            .expect("command succeeds");

        assert_eq!(report.attempts, 3);
        let calls = probe.call_times();
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_query_waits_one_interval() {
        let start = Instant::now();
        let probe = ScriptedProbe::codes(&[200]);

        CompletionPoller::default()
            .wait_for_completion(&probe, &Deadline::after(Duration::from_secs(60)))
            .await
            .expect("command succeeds");

        assert!(probe.call_times()[0] - start >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_ends_endless_pending() {
        let start = Instant::now();
        let probe = ScriptedProbe::codes(&[552]);
        let deadline = Deadline::after(Duration::from_secs(6));

        let err = CompletionPoller::default()
            .wait_for_completion(&probe, &deadline)
            .await
            .unwrap_err();

        assert!(matches!(err, FordPassError::DeadlineExceeded));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(6));
        assert!(elapsed < Duration::from_secs(8));
        assert_eq!(probe.call_times().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_status_stops_after_one_query() {
        let probe = ScriptedProbe::codes(&[418, 200]);

        let err = CompletionPoller::default()
            .wait_for_completion(&probe, &Deadline::after(Duration::from_secs(60)))
            .await
            .unwrap_err();

        assert!(matches!(err, FordPassError::UnexpectedStatus(418)));
        assert_eq!(probe.call_times().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_error_is_terminal() {
        let probe = ScriptedProbe::new(
            vec![
                Ok(CommandStatus::Pending),
                Err(FordPassError::Request(RequestError::Timeout(
                    Duration::from_secs(5),
                ))),
            ],
            CommandStatus::Succeeded,
        );

        let err = CompletionPoller::default()
            .wait_for_completion(&probe, &Deadline::after(Duration::from_secs(60)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FordPassError::Request(RequestError::Timeout(_))
        ));
        assert_eq!(probe.call_times().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_waiting() {
        let start = Instant::now();
        let probe = std::sync::Arc::new(ScriptedProbe::codes(&[552]));
        let (deadline, handle) = Deadline::cancellable(Duration::from_secs(60));

        let task = tokio::spawn({
            let probe = std::sync::Arc::clone(&probe);
            async move {
                CompletionPoller::default()
                    .wait_for_completion(probe.as_ref(), &deadline)
                    .await
            }
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.cancel();

        let err = task.await.expect("join poller").unwrap_err();
        assert!(matches!(err, FordPassError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(6));
        assert_eq!(probe.call_times().len(), 2);
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(PollState::after(CommandStatus::Pending), PollState::Pending);
        assert_eq!(PollState::after(CommandStatus::Succeeded), PollState::Succeeded);
        assert_eq!(PollState::after(CommandStatus::Unexpected(500)), PollState::Failed);
    }
}

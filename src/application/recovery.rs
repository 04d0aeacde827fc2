//! Crash recovery for workers
//!
//! A monitor task per worker polls its liveness. When the worker has exited,
//! [`RecoveryTracker`] decides whether to relaunch it with the same option,
//! switch once to the alternate option, or give up.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::supervisor::{launch_worker, SupervisorContext, WorkerTable};
use crate::domain::models::RecoveryPolicy;

/// What to do about a worker that exited on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Relaunch with the current option after `delay`
    Restart { option: String, delay: Duration },
    /// Relaunch with the alternate option after `delay`
    SwitchToAlternate { option: String, delay: Duration },
    /// Stop monitoring the worker
    GiveUp,
}

/// Restart bookkeeping for one worker
#[derive(Debug, Clone)]
pub struct RecoveryTracker {
    policy: RecoveryPolicy,
    current_option: String,
    attempts: u32,
    switched: bool,
}

impl RecoveryTracker {
    pub fn new(option: impl Into<String>, policy: RecoveryPolicy) -> Self {
        Self {
            policy,
            current_option: option.into(),
            attempts: 0,
            switched: false,
        }
    }

    /// Decide how to react to an exit and record the decision
    pub fn next_action(&mut self) -> RecoveryAction {
        let delay = Duration::from_secs(self.policy.interval_seconds);

        if self.attempts < self.policy.retries {
            self.attempts += 1;
            return RecoveryAction::Restart {
                option: self.current_option.clone(),
                delay,
            };
        }

        if !self.switched {
            if let Some(alternate) = self.policy.alternate_option.clone() {
                self.switched = true;
                self.attempts = 0;
                self.current_option.clone_from(&alternate);
                return RecoveryAction::SwitchToAlternate {
                    option: alternate,
                    delay,
                };
            }
        }

        RecoveryAction::GiveUp
    }

    pub fn current_option(&self) -> &str {
        &self.current_option
    }

    /// Restarts made with the current option
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Watch one worker until it is given up on or the supervisor stops
pub(crate) async fn monitor_worker(
    ctx: Arc<SupervisorContext>,
    workers: WorkerTable,
    name: String,
    mut tracker: RecoveryTracker,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(poll_interval) => {}
        }

        let exit_status = {
            let mut table = workers.lock().await;
            let Some(worker) = table.get_mut(&name) else {
                return;
            };
            match worker.child.try_wait() {
                Ok(status) => status,
                Err(e) => {
                    warn!(worker = %name, error = %e, "failed to query worker status");
                    None
                }
            }
        };

        let Some(status) = exit_status else {
            continue;
        };
        warn!(worker = %name, %status, "worker exited unexpectedly");

        let (option, delay) = match tracker.next_action() {
            RecoveryAction::Restart { option, delay } => {
                info!(
                    worker = %name,
                    option = %option,
                    attempt = tracker.attempts(),
                    delay_secs = delay.as_secs(),
                    "scheduling worker restart"
                );
                (option, delay)
            }
            RecoveryAction::SwitchToAlternate { option, delay } => {
                warn!(
                    worker = %name,
                    option = %option,
                    delay_secs = delay.as_secs(),
                    "retries exhausted, switching to alternate option"
                );
                (option, delay)
            }
            RecoveryAction::GiveUp => {
                error!(worker = %name, "retries exhausted, giving up on worker");
                workers.lock().await.remove(&name);
                return;
            }
        };

        tokio::select! {
            () = cancel.cancelled() => return,
            () = tokio::time::sleep(delay) => {}
        }

        let Some(spec) = ctx.config.worker(&name) else {
            return;
        };
        match launch_worker(&ctx, spec, &option) {
            Ok(relaunched) => {
                info!(worker = %name, pid = ?relaunched.pid, "worker relaunched");
                workers.lock().await.insert(name.clone(), relaunched);
            }
            // The exited child stays in the table, so the next poll moves on
            // to the following recovery step.
            Err(e) => error!(worker = %name, error = %e, "failed to relaunch worker"),
        }
    }
}

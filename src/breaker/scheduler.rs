//! Recovery scheduler.
//!
//! One task per breaker. Waits for the breaker to open, sleeps out the open
//! interval measured from the moment it opened, then lets a trial call
//! through by moving the breaker to half-open.

use std::sync::Arc;
use tokio::time;

use crate::breaker::controller::StateController;
use crate::lifecycle::ShutdownListener;

pub struct RecoveryScheduler {
    controller: Arc<StateController>,
    stop: ShutdownListener,
    shutdown: ShutdownListener,
}

impl RecoveryScheduler {
    /// `stop` ends this breaker's task; `shutdown` is an optional
    /// process-wide signal shared by many breakers.
    pub fn new(
        controller: Arc<StateController>,
        stop: ShutdownListener,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            controller,
            stop,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::debug!(
            breaker = %self.controller.name(),
            open_interval_ms = self.controller.config().open_interval_ms,
            "Recovery scheduler starting"
        );

        loop {
            tokio::select! {
                _ = self.controller.opened() => {}
                _ = self.stop.wait() => break,
                _ = self.shutdown.wait() => break,
            }

            // The signal may be stale: the episode it announced could have
            // ended already.
            let Some(episode) = self.controller.open_episode() else {
                continue;
            };

            tokio::select! {
                _ = time::sleep_until(episode.deadline.into()) => {
                    if !self.controller.try_half_open(episode.id) {
                        tracing::debug!(
                            breaker = %self.controller.name(),
                            episode = episode.id,
                            "Open episode ended before cooldown elapsed"
                        );
                    }
                }
                _ = self.stop.wait() => break,
                _ = self.shutdown.wait() => break,
            }
        }

        tracing::debug!(breaker = %self.controller.name(), "Recovery scheduler stopped");
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::pipeline::ReplyHandle;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Keeps the "working" indicator alive until dropped.
///
/// The indicator is pulsed immediately and then every `every`.  Failures
/// are logged and ignored; the indicator is cosmetic.
pub struct WorkingIndicator {
    handle: JoinHandle<()>,
}

impl WorkingIndicator {
    pub fn start(reply: Arc<dyn ReplyHandle>, every: Duration) -> Self {
        let every = every.max(MIN_INTERVAL);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = reply.show_working().await {
                    tracing::debug!(error = %e, "working indicator pulse failed");
                }
            }
        });
        Self { handle }
    }
}

impl Drop for WorkingIndicator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

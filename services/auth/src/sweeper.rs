//! Periodic eviction of expired sessions

use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};

use crate::session::SessionStore;

/// Handle on the background sweep; call [`SessionSweeper::shutdown`] to stop it
pub struct SessionSweeper {
    scheduler: JobScheduler,
}

impl SessionSweeper {
    /// Start sweeping `store` every `interval`.
    ///
    /// A run that is still in progress when the next one is due causes that
    /// next run to be skipped.
    pub async fn start(store: Arc<SessionStore>, interval: Duration) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;
        let running = Arc::new(Mutex::new(()));

        let job = Job::new_repeated_async(interval, move |_, _| {
            let store = store.clone();
            let running = running.clone();
            Box::pin(async move {
                let Ok(_guard) = running.try_lock() else {
                    debug!("Previous session sweep still running, skipping");
                    return;
                };

                let evicted = store.sweep_expired().await;
                debug!("Session sweep finished, {} evicted", evicted);
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Started session sweeper every {:?}", interval);
        Ok(Self { scheduler })
    }

    /// Stop the sweep; no further runs start after this returns
    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        info!("Session sweeper stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, models::Identity, token::OsRngTokenGenerator};
    use chrono::Duration as ChronoDuration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sweeper_evicts_in_background_until_shutdown() {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(SessionStore::with_parts(
            ChronoDuration::hours(3),
            clock.clone(),
            Arc::new(OsRngTokenGenerator),
        ));

        store
            .register_session(Identity::default(), ChronoDuration::minutes(15))
            .await
            .unwrap();
        clock.advance(ChronoDuration::minutes(16));

        let sweeper = SessionSweeper::start(store.clone(), Duration::from_secs(1))
            .await
            .unwrap();

        let mut swept = false;
        for _ in 0..50 {
            if store.stats().await.sessions == 0 {
                swept = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(swept, "sweeper never evicted the expired session");

        sweeper.shutdown().await.unwrap();
    }
}

//! Periodic background reload of the tenant list

use log::{debug, trace};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::api::{AdminApi, TenantRecord};

pub type TenantSnapshot = Arc<Vec<TenantRecord>>;

/// Reloads the tenant list on a fixed interval and on demand
///
/// The first load starts right away. Each result replaces the previous
/// snapshot wholesale. Dropping the revalidator stops the task.
pub struct Revalidator {
    receiver: watch::Receiver<TenantSnapshot>,
    refresh: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl Revalidator {
    pub fn spawn(api: Arc<AdminApi>, every: Duration) -> Self {
        let every = every.max(Duration::from_secs(1));
        let (sender, receiver) = watch::channel(Arc::new(Vec::new()));
        let refresh = Arc::new(Notify::new());
        let wake = refresh.clone();

        let handle = tokio::spawn(async move {
            debug!("Revalidation task started, every {:?}", every);
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => trace!("Revalidation tick"),
                    _ = wake.notified() => {
                        trace!("Revalidation requested");
                        ticker.reset();
                    }
                }

                let tenants = api.list_tenant_stats().await;
                if sender.send(Arc::new(tenants)).is_err() {
                    break;
                }
            }
            debug!("Revalidation task stopped");
        });

        Self {
            receiver,
            refresh,
            handle,
        }
    }

    /// Reload now instead of waiting for the next tick
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn subscribe(&self) -> watch::Receiver<TenantSnapshot> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> TenantSnapshot {
        self.receiver.borrow().clone()
    }
}

impl Drop for Revalidator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

//! Periodic sync task.
//!
//! Runs on the current thread inside a [`tokio::task::LocalSet`], sharing
//! the store with the UI through `Rc<RefCell<_>>`.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use manuscript_common::{Clock, SyncConfig};
use manuscript_core::ManuscriptStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::coordinator::{SyncCoordinator, SyncStatus, Tick};
use crate::transport::ChangeTransport;

/// Handle to a running sync task. Dropping it stops the timer.
#[derive(Debug)]
pub struct SyncHandle {
    timer: JoinHandle<()>,
    coordinator: Rc<RefCell<SyncCoordinator>>,
}

impl SyncHandle {
    pub fn status(&self) -> SyncStatus {
        self.coordinator.borrow().status().clone()
    }

    pub fn coordinator(&self) -> Ref<'_, SyncCoordinator> {
        self.coordinator.borrow()
    }

    /// Stop ticking. A request already in flight finishes but its result is dropped.
    pub fn cancel(&self) {
        self.timer.abort();
        self.coordinator.borrow_mut().cancel();
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start syncing `store` every `config.interval_ms`.
///
/// Must be called from within a `LocalSet`.
pub fn spawn_sync_task<T>(
    config: &SyncConfig,
    store: Rc<RefCell<ManuscriptStore>>,
    transport: Rc<T>,
    clock: Rc<dyn Clock>,
) -> SyncHandle
where
    T: ChangeTransport + 'static,
{
    let coordinator = Rc::new(RefCell::new(SyncCoordinator::new()));
    let period = Duration::from_millis(config.interval_ms.max(1));
    let timer = tokio::task::spawn_local(run(
        period,
        store,
        transport,
        clock,
        coordinator.clone(),
    ));
    SyncHandle { timer, coordinator }
}

async fn run<T>(
    period: Duration,
    store: Rc<RefCell<ManuscriptStore>>,
    transport: Rc<T>,
    clock: Rc<dyn Clock>,
    coordinator: Rc<RefCell<SyncCoordinator>>,
) where
    T: ChangeTransport + 'static,
{
    let start = tokio::time::Instant::now() + period;
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let tick = {
            let store = store.borrow();
            coordinator.borrow_mut().begin_tick(&store, clock.now_ms())
        };
        let Tick::Send { ticket, body } = tick else {
            continue;
        };

        // Sent separately so a slow request never delays the timer.
        let transport = transport.clone();
        let coordinator = coordinator.clone();
        tokio::task::spawn_local(async move {
            let result = transport.send(body).await;
            coordinator.borrow_mut().complete(ticket, result);
        });
    }
}

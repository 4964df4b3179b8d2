//! Fire-and-forget execution of background scans with a cap on how many run at once.

use std::{
	future::Future,
	pin::pin,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use tokio::sync::{Notify, Semaphore};

#[derive(Clone)]
pub struct ScanPool {
	inner: Arc<PoolInner>,
}
impl ScanPool {
	pub fn new(max_concurrent: usize) -> Self {
		Self {
			inner: Arc::new(PoolInner {
				permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
				in_flight: AtomicUsize::new(0),
				idle: Notify::new(),
			}),
		}
	}

	/// Spawns `task` without handing back a join handle. The task waits for a permit before it
	/// starts, so submitting never blocks the caller.
	pub fn submit<F>(&self, task: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		self.inner.in_flight.fetch_add(1, Ordering::SeqCst);

		let guard = InFlight { inner: self.inner.clone() };
		let permits = self.inner.permits.clone();

		tokio::spawn(async move {
			let _guard = guard;
			let Ok(_permit) = permits.acquire_owned().await else {
				return;
			};

			task.await;
		});
	}

	/// Submitted tasks that have not finished yet, queued ones included.
	pub fn in_flight(&self) -> usize {
		self.inner.in_flight.load(Ordering::SeqCst)
	}

	/// Resolves once every submitted task has finished.
	pub async fn wait_idle(&self) {
		loop {
			let mut notified = pin!(self.inner.idle.notified());

			notified.as_mut().enable();

			if self.in_flight() == 0 {
				return;
			}

			notified.await;
		}
	}
}

struct PoolInner {
	permits: Arc<Semaphore>,
	in_flight: AtomicUsize,
	idle: Notify,
}

struct InFlight {
	inner: Arc<PoolInner>,
}
impl Drop for InFlight {
	fn drop(&mut self) {
		if self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
			self.inner.idle.notify_waiters();
		}
	}
}

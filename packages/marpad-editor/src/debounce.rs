use std::{future::Future, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle, time};

/// Runs an action once a quiet period has passed since the last scheduled value.
///
/// Every [`Debouncer::schedule`] call replaces the pending value and restarts the quiet period.
/// Dropping the debouncer cancels whatever is pending.
pub struct Debouncer<T> {
	tx: mpsc::UnboundedSender<T>,
	task: JoinHandle<()>,
}
impl<T> Debouncer<T>
where
	T: Send + 'static,
{
	pub fn spawn<F, Fut>(quiet: Duration, mut action: F) -> Self
	where
		F: FnMut(T) -> Fut + Send + 'static,
		Fut: Future<Output = ()> + Send + 'static,
	{
		let (tx, mut rx) = mpsc::unbounded_channel::<T>();
		let task = tokio::spawn(async move {
			while let Some(mut pending) = rx.recv().await {
				loop {
					tokio::select! {
						next = rx.recv() => match next {
							Some(value) => pending = value,
							None => return,
						},
						_ = time::sleep(quiet) => {
							action(pending).await;

							break;
						},
					}
				}
			}
		});

		Self { tx, task }
	}

	pub fn schedule(&self, value: T) {
		// The receiver only goes away with the task, which lives as long as `self`.
		let _ = self.tx.send(value);
	}
}
impl<T> Drop for Debouncer<T> {
	fn drop(&mut self) {
		self.task.abort();
	}
}

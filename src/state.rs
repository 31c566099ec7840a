//! Observable state and task scopes for the view-state holders

use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

/// Latest-value cell that screens subscribe to
///
/// Writes replace the value and wake every subscriber; a subscriber that lags
/// only sees the latest value.
#[derive(Debug)]
pub struct Observable<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { tx: Arc::clone(&self.tx) }
    }
}

impl<T: Clone> Observable<T> {
    /// Observable holding `initial`
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replace the value and notify subscribers
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Receiver that starts at the current value
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Owns the tasks a view-state holder launches
///
/// Dropping the scope aborts every task still running.
#[derive(Debug, Default)]
pub struct ViewModelScope {
    tasks: Mutex<Vec<AbortHandle>>,
}

impl ViewModelScope {
    /// Scope with no tasks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `future` on the runtime, tied to this scope
    pub fn launch<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handle = tokio::spawn(future);
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.retain(|task| !task.is_finished());
            tasks.push(handle.abort_handle());
        }
        handle
    }

    /// Number of launched tasks that have not finished
    pub fn active_tasks(&self) -> usize {
        self.tasks
            .lock()
            .map(|tasks| tasks.iter().filter(|task| !task.is_finished()).count())
            .unwrap_or(0)
    }

    /// Abort every outstanding task
    pub fn cancel_all(&self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            let outstanding = tasks.len();
            for task in tasks.drain(..) {
                task.abort();
            }
            if outstanding > 0 {
                debug!(outstanding, "Cancelled view-model tasks");
            }
        }
    }
}

impl Drop for ViewModelScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn subscribers_see_the_latest_value() {
        let observable = Observable::new(0_u32);
        let mut rx = observable.subscribe();
        observable.set(1);
        observable.set(2);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);
        assert_eq!(observable.get(), 2);
    }

    #[tokio::test]
    async fn dropping_the_scope_aborts_tasks() {
        let scope = ViewModelScope::new();
        let handle = scope.launch(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        assert_eq!(scope.active_tasks(), 1);
        drop(scope);
        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled());
    }
}

//! Quiet-window debouncing for bursts of work items.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Collects items until `window` passes without a new one, then hands the
/// whole burst (in arrival order) to the flush callback.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the debounce task. It stops when `cancel` fires (dropping any
    /// pending burst) or when every handle is dropped (flushing first).
    pub fn spawn<F, Fut>(
        window: Duration,
        cancel: CancellationToken,
        mut flush: F,
    ) -> (Self, JoinHandle<()>)
    where
        F: FnMut(Vec<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            loop {
                let first = tokio::select! {
                    _ = cancel.cancelled() => return,
                    item = rx.recv() => match item {
                        Some(item) => item,
                        None => return,
                    },
                };

                let mut burst = vec![first];
                let closed = loop {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        next = timeout(window, rx.recv()) => match next {
                            Ok(Some(item)) => burst.push(item),
                            Ok(None) => break true,
                            Err(_) => break false,
                        },
                    }
                };

                flush(burst).await;
                if closed {
                    return;
                }
            }
        });

        (Self { tx }, handle)
    }

    /// Queues an item; false once the task has stopped.
    pub fn push(&self, item: T) -> bool {
        self.tx.send(item).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (
        Arc<Mutex<Vec<Vec<u32>>>>,
        impl FnMut(Vec<u32>) -> std::future::Ready<()> + Send + 'static,
    ) {
        let flushed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&flushed);
        (flushed, move |burst| {
            sink.lock().unwrap().push(burst);
            std::future::ready(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_within_window_flushes_once() {
        let (flushed, flush) = recorder();
        let (debouncer, _task) =
            Debouncer::spawn(Duration::from_millis(100), CancellationToken::new(), flush);

        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.push(2);
        tokio::time::sleep(Duration::from_millis(50)).await;
        debouncer.push(3);
        assert!(flushed.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*flushed.lock().unwrap(), vec![vec![1, 2, 3]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_flush_separately() {
        let (flushed, flush) = recorder();
        let (debouncer, _task) =
            Debouncer::spawn(Duration::from_millis(100), CancellationToken::new(), flush);

        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.push(2);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*flushed.lock().unwrap(), vec![vec![1], vec![2]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_burst() {
        let (flushed, flush) = recorder();
        let cancel = CancellationToken::new();
        let (debouncer, task) = Debouncer::spawn(Duration::from_millis(100), cancel.clone(), flush);

        debouncer.push(1);
        cancel.cancel();
        task.await.unwrap();
        assert!(flushed.lock().unwrap().is_empty());
        assert!(!debouncer.push(2));
    }
}

//! Asynchronous point store contract and a blocking-store adapter.
//!
//! Writes complete through a single [`BoxFuture`]; a write is visible to every
//! read issued after its future resolves. Reads produce a [`BoxStream`] that
//! yields zero or more `Ok` items and ends, or ends after one `Err` item.
//! Failures are only delivered when the future or stream is polled, never
//! from the call that creates it.

use super::PointStore;
use crate::config::Config;
use crate::error::{PointStoreError, Result};
use crate::point::Point;
use crate::region::Region;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Non-blocking counterpart of [`PointStore`].
///
/// Futures and streams own everything they need, so they can be moved to
/// other tasks. Dropping a stream cancels the scan behind it.
pub trait AsyncPointStore<P, V>: Send + Sync
where
    P: Point + Send + 'static,
    V: Send + 'static,
{
    fn insert(&self, point: P, value: V) -> BoxFuture<'static, Result<()>>;

    fn insert_all(&self, point: P, values: Vec<V>) -> BoxFuture<'static, Result<()>>;

    fn at(&self, point: P) -> BoxStream<'static, Result<V>>;

    fn within(&self, region: Region<P>) -> BoxStream<'static, Result<(P, V)>>;

    /// Removes every value at `point`. The removed values are not returned.
    fn remove_at(&self, point: P) -> BoxFuture<'static, Result<()>>;

    fn remove_in(&self, region: Region<P>) -> BoxFuture<'static, Result<()>>;
}

/// Exposes a blocking [`PointStore`] as an [`AsyncPointStore`].
///
/// Each operation runs on tokio's blocking pool and holds the store lock only
/// while touching the store. Region streams capture the matching points
/// first, then fetch and send each point's values through a bounded channel,
/// so a slow consumer never holds the lock. Capturing the points is one pass
/// under the lock, so writers wait for it on very large regions.
///
/// # Examples
///
/// ```
/// use futures::StreamExt;
/// use pointstore::{AsyncPointStore, BlockingStoreAdapter, GridPoint, MemoryPointStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> pointstore::Result<()> {
/// let store = BlockingStoreAdapter::new(MemoryPointStore::new());
/// store.insert(GridPoint::new([1, 2]), "cafe").await?;
///
/// let values: Vec<_> = store.at(GridPoint::new([1, 2])).collect().await;
/// assert_eq!(values.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct BlockingStoreAdapter<S> {
    store: Arc<Mutex<S>>,
    stream_buffer: usize,
    closed: Arc<AtomicBool>,
}

impl<S: Send + 'static> BlockingStoreAdapter<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, &Config::default())
    }

    pub fn with_config(store: S, config: &Config) -> Self {
        if config.stream_buffer == 0 {
            log::warn!("stream_buffer of 0 is not usable, falling back to 1");
        }
        Self {
            store: Arc::new(Mutex::new(store)),
            stream_buffer: config.stream_buffer.max(1),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared handle to the wrapped store for direct blocking access.
    pub fn store(&self) -> &Arc<Mutex<S>> {
        &self.store
    }

    pub fn stream_buffer(&self) -> usize {
        self.stream_buffer
    }

    /// Rejects every operation first polled after this call with
    /// [`PointStoreError::StoreClosed`]. Scans already running finish.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            log::debug!("Closing point store adapter");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn write<F>(&self, op: F) -> BoxFuture<'static, Result<()>>
    where
        F: FnOnce(&mut S) -> Result<()> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let closed = Arc::clone(&self.closed);
        async move {
            if closed.load(Ordering::Acquire) {
                return Err(PointStoreError::StoreClosed);
            }
            tokio::task::spawn_blocking(move || op(&mut *store.lock()))
                .await
                .map_err(|e| PointStoreError::Task(e.to_string()))?
        }
        .boxed()
    }
}

impl<S, P, V> AsyncPointStore<P, V> for BlockingStoreAdapter<S>
where
    S: PointStore<P, V> + Send + 'static,
    P: Point + Send + 'static,
    V: Clone + Send + 'static,
{
    fn insert(&self, point: P, value: V) -> BoxFuture<'static, Result<()>> {
        self.write(move |store| PointStore::<P, V>::insert(store, point, value))
    }

    fn insert_all(&self, point: P, values: Vec<V>) -> BoxFuture<'static, Result<()>> {
        self.write(move |store| PointStore::<P, V>::insert_all(store, point, values))
    }

    fn at(&self, point: P) -> BoxStream<'static, Result<V>> {
        let store = Arc::clone(&self.store);
        let closed = Arc::clone(&self.closed);
        stream::once(async move {
            if closed.load(Ordering::Acquire) {
                return stream::iter(vec![Err(PointStoreError::StoreClosed)]);
            }
            let fetched = tokio::task::spawn_blocking(move || -> Result<Vec<V>> {
                let guard = store.lock();
                let values = PointStore::<P, V>::at(&*guard, &point)?.collect();
                Ok(values)
            })
            .await;
            let items: Vec<Result<V>> = match fetched {
                Ok(Ok(values)) => values.into_iter().map(Ok).collect(),
                Ok(Err(e)) => vec![Err(e)],
                Err(e) => vec![Err(PointStoreError::Task(e.to_string()))],
            };
            stream::iter(items)
        })
        .flatten()
        .boxed()
    }

    fn within(&self, region: Region<P>) -> BoxStream<'static, Result<(P, V)>> {
        let store = Arc::clone(&self.store);
        let closed = Arc::clone(&self.closed);
        let buffer = self.stream_buffer;
        stream::once(async move {
            let (tx, rx) = mpsc::channel(buffer);
            if closed.load(Ordering::Acquire) {
                // Fresh channel with capacity >= 1, so this cannot fail.
                let _ = tx.try_send(Err(PointStoreError::StoreClosed));
            } else {
                tokio::task::spawn_blocking(move || stream_region(&store, &region, &tx));
            }
            ReceiverStream::new(rx)
        })
        .flatten()
        .boxed()
    }

    fn remove_at(&self, point: P) -> BoxFuture<'static, Result<()>> {
        self.write(move |store| PointStore::<P, V>::remove_at(store, &point).map(|_| ()))
    }

    fn remove_in(&self, region: Region<P>) -> BoxFuture<'static, Result<()>> {
        self.write(move |store| PointStore::<P, V>::remove_in(store, &region))
    }
}

/// Feeds every `(point, value)` pair in `region` into `tx`.
///
/// Stops as soon as the receiving stream is dropped, including while the
/// matching points are still being captured.
fn stream_region<S, P, V>(store: &Mutex<S>, region: &Region<P>, tx: &mpsc::Sender<Result<(P, V)>>)
where
    S: PointStore<P, V>,
    P: Point,
    V: Clone,
{
    let keys = {
        let mut guard = store.lock();
        let mut cursor = match PointStore::<P, V>::within(&mut *guard, region) {
            Ok(cursor) => cursor,
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                return;
            }
        };
        let mut keys = Vec::new();
        while let Some(key) = cursor.next_key() {
            if tx.is_closed() {
                log::debug!("Region stream dropped while capturing points");
                return;
            }
            keys.push(key);
        }
        keys
    };

    for key in keys {
        if tx.is_closed() {
            log::debug!("Region stream dropped, stopping scan");
            return;
        }

        let guard = store.lock();
        let fetched: Result<Vec<V>> = PointStore::<P, V>::at(&*guard, &key).map(Iterator::collect);
        drop(guard);

        let values = match fetched {
            Ok(values) => values,
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                return;
            }
        };
        for value in values {
            if tx.blocking_send(Ok((key.clone(), value))).is_err() {
                log::debug!("Region stream dropped, stopping scan");
                return;
            }
        }
    }
}

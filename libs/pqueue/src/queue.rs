use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use heap::PairHeap;
use tokio::sync::Mutex;

use crate::QueueError;

type Evaluator<E, P> = Arc<dyn Fn(&E) -> P + Send + Sync>;

/// Priority queue that is safe to share between threads and tasks without
/// any external synchronization.
///
/// A single `tokio` mutex guards every operation. The mutex is fair, so lock
/// grants follow arrival order regardless of whether the waiter is a
/// suspended async caller or a thread blocked inside one of the `try_`
/// variants. Under the default comparator the smallest priority value
/// dequeues first; a custom comparator can redefine that order.
///
/// Cloning the queue yields another handle onto the same storage.
pub struct ConcurrentPriorityQueue<E, P> {
    storage: Arc<Mutex<PairHeap<E, P>>>,
    /// Derives a priority from an element for the entry points that take no
    /// explicit priority. Fixed at construction.
    evaluator: Option<Evaluator<E, P>>,
}

impl<E, P: Ord + 'static> ConcurrentPriorityQueue<E, P> {
    /// Creates an empty queue ordered by the natural order of `P`.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Mutex::new(PairHeap::new())),
            evaluator: None,
        }
    }

    /// Creates an empty queue whose [`enqueue`](Self::enqueue) and
    /// [`enqueue_range`](Self::enqueue_range) derive priorities via
    /// `evaluator`.
    pub fn with_evaluator(evaluator: impl Fn(&E) -> P + Send + Sync + 'static) -> Self {
        let mut queue = Self::new();
        queue.evaluator = Some(Arc::new(evaluator));
        queue
    }

    /// Creates a queue pre-loaded from `elements`, with each priority derived
    /// by `evaluator`. The load completes before the queue can be shared, so
    /// no other caller ever observes a partially loaded queue.
    pub fn from_elements(
        evaluator: impl Fn(&E) -> P + Send + Sync + 'static,
        elements: impl IntoIterator<Item = E>,
    ) -> Self {
        let mut heap = PairHeap::new();
        for element in elements {
            let priority = evaluator(&element);
            heap.push(element, priority);
        }

        Self {
            storage: Arc::new(Mutex::new(heap)),
            evaluator: Some(Arc::new(evaluator)),
        }
    }

    /// Creates a queue pre-loaded from explicit `(element, priority)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (E, P)>) -> Self {
        let mut heap = PairHeap::new();
        for (element, priority) in pairs {
            heap.push(element, priority);
        }

        Self {
            storage: Arc::new(Mutex::new(heap)),
            evaluator: None,
        }
    }
}

impl<E, P> ConcurrentPriorityQueue<E, P> {
    /// Creates an empty queue ordered by `compare`.
    /// [`Ordering::Less`] means "dequeued earlier".
    pub fn with_comparator(compare: impl Fn(&P, &P) -> Ordering + Send + Sync + 'static) -> Self {
        Self {
            storage: Arc::new(Mutex::new(PairHeap::with_comparator(Box::new(compare)))),
            evaluator: None,
        }
    }

    /// Creates an empty queue with both a priority evaluator and a custom
    /// comparator.
    pub fn with_evaluator_and_comparator(
        evaluator: impl Fn(&E) -> P + Send + Sync + 'static,
        compare: impl Fn(&P, &P) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        let mut queue = Self::with_comparator(compare);
        queue.evaluator = Some(Arc::new(evaluator));
        queue
    }

    /// Enqueues `element` with a priority derived by the configured
    /// evaluator.
    ///
    /// # Error
    /// Fails with [`QueueError::EvaluatorMissing`] if the queue was built
    /// without an evaluator. The queue is left untouched in that case.
    pub async fn enqueue(&self, element: E) -> Result<(), QueueError> {
        let evaluator = self.evaluator.as_ref().ok_or(QueueError::EvaluatorMissing)?;
        let priority = evaluator(&element);

        let mut storage = self.storage.lock().await;
        storage.push(element, priority);
        Ok(())
    }

    /// Enqueues `element` with an explicit `priority`.
    pub async fn enqueue_with_priority(&self, element: E, priority: P) {
        let mut storage = self.storage.lock().await;
        storage.push(element, priority);
    }

    /// Enqueues every element of `elements` with evaluator-derived
    /// priorities. The whole batch is inserted under one lock acquisition,
    /// so no other caller observes a partially inserted batch.
    ///
    /// # Error
    /// Fails with [`QueueError::EvaluatorMissing`] if the queue was built
    /// without an evaluator; no element is inserted in that case.
    pub async fn enqueue_range(
        &self,
        elements: impl IntoIterator<Item = E>,
    ) -> Result<(), QueueError> {
        let evaluator = self.evaluator.as_ref().ok_or(QueueError::EvaluatorMissing)?;

        let mut storage = self.storage.lock().await;
        for element in elements {
            let priority = evaluator(&element);
            storage.push(element, priority);
        }
        Ok(())
    }

    /// Enqueues explicit `(element, priority)` pairs under one lock
    /// acquisition.
    pub async fn enqueue_pairs(&self, pairs: impl IntoIterator<Item = (E, P)>) {
        let mut storage = self.storage.lock().await;
        for (element, priority) in pairs {
            storage.push(element, priority);
        }
    }

    /// Removes and returns the highest-priority element. Elements of equal
    /// priority come out in the order they were enqueued.
    ///
    /// # Error
    /// Fails with [`QueueError::Empty`] if the queue holds no elements.
    pub async fn dequeue(&self) -> Result<E, QueueError> {
        let mut storage = self.storage.lock().await;
        let (element, _priority) = storage.pop().ok_or(QueueError::Empty)?;
        Ok(element)
    }

    /// Non-failing, synchronous variant of [`dequeue`](Self::dequeue):
    /// returns the removed element together with its priority, or [`None`]
    /// on an empty queue.
    ///
    /// Blocks the calling thread while waiting for the lock. Must not be
    /// called from within an async runtime context; async callers use
    /// [`dequeue`](Self::dequeue) instead.
    pub fn try_dequeue(&self) -> Option<(E, P)> {
        let mut storage = self.storage.blocking_lock();
        storage.pop()
    }

    /// Returns a copy of the highest-priority element without removing it.
    ///
    /// # Error
    /// Fails with [`QueueError::Empty`] if the queue holds no elements.
    pub async fn peek(&self) -> Result<E, QueueError>
    where
        E: Clone,
    {
        let storage = self.storage.lock().await;
        let (element, _priority) = storage.peek().ok_or(QueueError::Empty)?;
        Ok(element.clone())
    }

    /// Non-failing, synchronous variant of [`peek`](Self::peek). Blocks the
    /// calling thread while waiting for the lock; must not be called from
    /// within an async runtime context.
    pub fn try_peek(&self) -> Option<(E, P)>
    where
        E: Clone,
        P: Clone,
    {
        let storage = self.storage.blocking_lock();
        storage
            .peek()
            .map(|(element, priority)| (element.clone(), priority.clone()))
    }

    /// Removes all elements. Evaluator and comparator stay in place, and the
    /// FIFO tie-break keeps working across the clear.
    pub async fn clear(&self) {
        let mut storage = self.storage.lock().await;
        storage.clear();
    }

    /// Number of elements currently in the queue.
    pub async fn len(&self) -> usize {
        let storage = self.storage.lock().await;
        storage.len()
    }

    pub async fn is_empty(&self) -> bool {
        let storage = self.storage.lock().await;
        storage.is_empty()
    }

    /// Atomic snapshot of all `(element, priority)` pairs in unspecified
    /// order. The returned vector is a copy and stays valid and consistent
    /// however the queue is mutated afterwards.
    pub async fn unordered_items(&self) -> Vec<(E, P)>
    where
        E: Clone,
        P: Clone,
    {
        let storage = self.storage.lock().await;
        storage
            .iter()
            .map(|(element, priority)| (element.clone(), priority.clone()))
            .collect()
    }
}

impl<E, P: Ord + 'static> Default for ConcurrentPriorityQueue<E, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P> Clone for ConcurrentPriorityQueue<E, P> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            evaluator: self.evaluator.clone(),
        }
    }
}

impl<E, P> fmt::Debug for ConcurrentPriorityQueue<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentPriorityQueue")
            .field("has_evaluator", &self.evaluator.is_some())
            .finish_non_exhaustive()
    }
}

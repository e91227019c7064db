use std::collections::HashSet;
use std::sync::mpsc;
use std::thread;

use rand::Rng;
use uuid::Uuid;

use crate::{ConcurrentPriorityQueue, QueueError};

/// With the default ascending order, the element whose evaluated priority is
/// smallest comes out first.
#[tokio::test]
async fn dequeue_order_follows_evaluator() {
    let queue = ConcurrentPriorityQueue::with_evaluator(|element: &&str| element.len());
    queue.enqueue("three").await.unwrap();
    queue.enqueue("four").await.unwrap();

    let next = queue.dequeue().await.unwrap();
    assert_eq!(next, "four");
}

/// A descending comparator reverses what "highest priority" means.
#[tokio::test]
async fn dequeue_order_follows_custom_comparator() {
    let queue = ConcurrentPriorityQueue::with_evaluator_and_comparator(
        |element: &&str| element.len(),
        |a: &usize, b: &usize| b.cmp(a),
    );
    queue.enqueue("three").await.unwrap();
    queue.enqueue("four").await.unwrap();

    let next = queue.dequeue().await.unwrap();
    assert_eq!(next, "three");
}

/// Elements of equal priority are dequeued first-in-first-out.
#[tokio::test]
async fn equal_priorities_dequeue_fifo() {
    let queue = ConcurrentPriorityQueue::new();
    queue.enqueue_with_priority("less important string", 2).await;
    queue.enqueue_with_priority("first important string", 1).await;
    queue.enqueue_with_priority("second important string", 1).await;

    assert_eq!(queue.dequeue().await.unwrap(), "first important string");
    assert_eq!(queue.dequeue().await.unwrap(), "second important string");
    assert_eq!(queue.dequeue().await.unwrap(), "less important string");
}

/// Shuffled explicit priorities come back out in strictly ascending order.
#[tokio::test]
async fn dequeues_are_strictly_ordered() {
    let queue = ConcurrentPriorityQueue::new();
    queue
        .enqueue_pairs([("p5", 5u64), ("p1", 1), ("p4", 4), ("p2", 2), ("p3", 3)])
        .await;

    let mut drained = Vec::new();
    loop {
        match queue.dequeue().await {
            Ok(element) => drained.push(element),
            Err(QueueError::Empty) => break,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(drained, vec!["p1", "p2", "p3", "p4", "p5"]);
}

/// 100 concurrent enqueues from independent tasks are all captured, with no
/// loss and no duplication.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_enqueues_are_captured() {
    let queue: ConcurrentPriorityQueue<String, u64> = ConcurrentPriorityQueue::new();
    let num_tasks = 100;

    let mut handles = Vec::with_capacity(num_tasks);
    for _ in 0..num_tasks {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            let priority = rand::rng().random_range(0..100);
            queue
                .enqueue_with_priority(Uuid::new_v4().to_string(), priority)
                .await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(queue.len().await, num_tasks);

    let items = queue.unordered_items().await;
    let distinct: HashSet<String> = items.into_iter().map(|(element, _)| element).collect();
    assert_eq!(distinct.len(), num_tasks);
}

/// The blocking surface drains a shared queue from plain threads without
/// losing or duplicating elements.
#[test]
fn blocking_drain_from_threads() {
    let queue = ConcurrentPriorityQueue::from_pairs((0..100u64).map(|i| (format!("e{i}"), i)));

    let (tx, rx) = mpsc::channel();
    let mut handles = Vec::new();
    for _ in 0..4 {
        let queue = queue.clone();
        let tx = tx.clone();
        handles.push(thread::spawn(move || {
            while let Some((element, _priority)) = queue.try_dequeue() {
                tx.send(element).unwrap();
            }
        }));
    }
    drop(tx);

    for handle in handles {
        handle.join().unwrap();
    }

    let drained: HashSet<String> = rx.iter().collect();
    assert_eq!(drained.len(), 100);
    assert!(queue.try_peek().is_none());
}

#[tokio::test]
async fn dequeue_and_peek_fail_on_empty_queue() {
    let queue: ConcurrentPriorityQueue<String, u64> = ConcurrentPriorityQueue::new();

    assert_eq!(queue.dequeue().await, Err(QueueError::Empty));
    assert_eq!(queue.peek().await, Err(QueueError::Empty));
}

#[test]
fn try_variants_return_none_on_empty_queue() {
    let queue: ConcurrentPriorityQueue<String, u64> = ConcurrentPriorityQueue::new();

    assert!(queue.try_dequeue().is_none());
    assert!(queue.try_peek().is_none());
}

/// The queue stays usable after `clear`, and the FIFO tie-break still holds.
#[tokio::test]
async fn clear_empties_and_queue_stays_usable() {
    let queue = ConcurrentPriorityQueue::new();
    queue.enqueue_pairs([("stale1", 1u64), ("stale2", 2)]).await;

    queue.clear().await;
    assert_eq!(queue.len().await, 0);
    assert!(queue.is_empty().await);

    queue.enqueue_with_priority("a", 1).await;
    queue.enqueue_with_priority("b", 1).await;
    assert_eq!(queue.dequeue().await.unwrap(), "a");
    assert_eq!(queue.dequeue().await.unwrap(), "b");
}

/// Evaluator-based entry points fail fast on a queue built without an
/// evaluator and leave it untouched.
#[tokio::test]
async fn missing_evaluator_fails_fast() {
    let queue: ConcurrentPriorityQueue<&str, usize> = ConcurrentPriorityQueue::new();

    assert_eq!(queue.enqueue("x").await, Err(QueueError::EvaluatorMissing));
    assert_eq!(
        queue.enqueue_range(["x", "y"]).await,
        Err(QueueError::EvaluatorMissing)
    );
    assert_eq!(queue.len().await, 0);
}

#[tokio::test]
async fn enqueue_range_uses_evaluator_for_each_element() {
    let queue = ConcurrentPriorityQueue::with_evaluator(|element: &&str| element.len());
    queue.enqueue_range(["seven!!", "a", "four"]).await.unwrap();

    assert_eq!(queue.dequeue().await.unwrap(), "a");
    assert_eq!(queue.dequeue().await.unwrap(), "four");
    assert_eq!(queue.dequeue().await.unwrap(), "seven!!");
}

#[tokio::test]
async fn preloaded_queues_are_fully_ordered() {
    let queue = ConcurrentPriorityQueue::from_elements(
        |element: &String| element.len(),
        ["three", "four", "a"].map(String::from),
    );

    assert_eq!(queue.dequeue().await.unwrap(), "a");
    assert_eq!(queue.dequeue().await.unwrap(), "four");
    assert_eq!(queue.dequeue().await.unwrap(), "three");
    assert_eq!(queue.dequeue().await, Err(QueueError::Empty));
}

/// `unordered_items` is a snapshot, not a live view.
#[tokio::test]
async fn unordered_items_returns_a_snapshot() {
    let queue = ConcurrentPriorityQueue::new();
    queue.enqueue_pairs([("a", 1u64), ("b", 2)]).await;

    let snapshot = queue.unordered_items().await;
    assert_eq!(snapshot.len(), 2);

    queue.dequeue().await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(queue.len().await, 1);

    let elements: HashSet<&str> = snapshot.iter().map(|(element, _)| *element).collect();
    assert_eq!(elements, HashSet::from(["a", "b"]));
}

/// `peek` reports the same element that `dequeue` removes next.
#[tokio::test]
async fn peek_matches_next_dequeue() {
    let queue = ConcurrentPriorityQueue::new();
    queue.enqueue_pairs([("late", 9u64), ("next", 1)]).await;

    assert_eq!(queue.peek().await.unwrap(), "next");
    assert_eq!(queue.len().await, 2);
    assert_eq!(queue.dequeue().await.unwrap(), "next");
}

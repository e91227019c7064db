/// Recoverable errors of the queue surface.
///
/// Both variants are precondition violations on the caller's side. They are
/// raised before the underlying container is touched, so a failed call never
/// disturbs the queue's contents. The `try_` variants report absence through
/// [`Option`] instead and never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// An evaluator-based entry point was called on a queue that was built
    /// without a priority evaluator.
    #[error("no priority evaluator configured for this queue")]
    EvaluatorMissing,
    /// `dequeue` or `peek` was called on an empty queue.
    #[error("the queue is empty")]
    Empty,
}

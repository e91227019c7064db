mod error;
mod queue;
pub mod stress;
#[cfg(test)]
mod test;

// region:    --- Exports
pub use error::QueueError;
pub use queue::ConcurrentPriorityQueue;
// endregion: --- Exports

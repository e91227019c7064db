mod pair_heap;

// region:    --- Exports
pub use pair_heap::{Comparator, PairHeap};
// endregion: --- Exports

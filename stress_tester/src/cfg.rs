#[derive(Debug, Clone, clap::Parser)]
pub struct Cfg {
    /// Number of producers that will enqueue items into the queue.
    #[arg(short, long, default_value_t = 4)]
    pub producer_num: usize,
    /// Number of items each producer will enqueue during the test.
    #[arg(short, long, default_value_t = 100_000)]
    pub item_num: usize,
    /// Number of consumers that will dequeue items from the queue.
    #[arg(short, long, default_value_t = 2)]
    pub consumer_num: usize,
    /// Delay between the start of each drain batch.
    #[arg(long, default_value_t = 100)]
    pub drain_interval_us: u64,
    /// Number of items that will be drained per batch.
    #[arg(short = 'b', long, default_value_t = 500)]
    pub drain_batch_size: usize,
    // Hard cap on the test's execution time
    #[arg(long, default_value_t = 10)]
    pub run_duration_seconds: u64,
    /// How often intermediate statistics are printed.
    #[arg(long, default_value_t = 1000)]
    pub print_stats_interval_ms: u64,
}

//! Producer/consumer stress harness for the queue, used by the
//! `stress_tester` binary and usable from integration experiments.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use rand::Rng;
use tokio::{sync::Barrier, time};
use uuid::Uuid;

use crate::ConcurrentPriorityQueue;

#[derive(Debug, Clone)]
pub struct StressTestCfg {
    pub num_producers: usize,
    /// Number of items each producer enqueues before stopping.
    pub num_items: usize,
    pub num_consumers: usize,
    pub payload_size_range: (usize, usize),
    pub priority_range: (u64, u64),
    /// Pause between consumer drain batches.
    pub drain_interval_us: u64,
    pub drain_batch_size: usize,
    /// Hard cap on the test's execution time.
    pub run_duration_seconds: u64,
    /// How often to print intermediate stats.
    pub print_stats_interval_ms: u64,
    /// Percentiles to report (e.g. [50.0, 90.0, 99.0, 99.9]).
    pub latency_percentiles: Vec<f64>,
}

/// Payload pushed through the queue during a stress run. Carries its
/// submission time so consumers can compute enqueue-to-dequeue latency.
#[derive(Debug, Clone)]
pub struct StressItem {
    pub id: String,
    pub submitted_at_us: u64,
    pub payload: Vec<u8>,
}

impl StressTestCfg {
    /// Creates a randomized [`StressItem`] within the pre-configured ranges.
    fn randomized_item(&self, started: Instant, rng: &mut impl Rng) -> (StressItem, u64) {
        let payload_size = rng.random_range(self.payload_size_range.0..self.payload_size_range.1);
        let priority = rng.random_range(self.priority_range.0..self.priority_range.1);

        let item = StressItem {
            id: Uuid::new_v4().to_string(),
            submitted_at_us: started.elapsed().as_micros() as u64,
            payload: (0..payload_size).map(|_| rng.random::<u8>()).collect(),
        };
        (item, priority)
    }
}

struct TestStats {
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    latency_hist: Mutex<Histogram<u64>>,
}

impl TestStats {
    fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            dequeued: AtomicU64::new(0),
            latency_hist: Mutex::new(
                Histogram::new_with_max(60_000_000, 3)
                    .expect("Initializing the histogram should work"),
            ),
        }
    }

    fn record_enqueue(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    fn record_dequeue(&self, latency_us: u64) {
        self.dequeued.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut hist) = self.latency_hist.lock() {
            let lat = latency_us.min(hist.high());
            hist.record(lat).expect("cannot exceed max");
        }
    }

    fn percentile(&self, percentile: f64) -> Option<u64> {
        let hist = self.latency_hist.lock().ok()?;
        if hist.is_empty() {
            return None;
        }
        Some(hist.value_at_quantile(percentile / 100.0))
    }

    fn print_stats(&self, elapsed_seconds: f64, percentiles: &[f64]) {
        use num_format::{SystemLocale, ToFormattedString};
        let locale = SystemLocale::default().unwrap();

        let enqueued = self.enqueued.load(Ordering::Relaxed);
        let dequeued = self.dequeued.load(Ordering::Relaxed);

        let enqueue_rate = enqueued as f64 / elapsed_seconds;
        let dequeue_rate = dequeued as f64 / elapsed_seconds;

        let avg_latency = { self.latency_hist.lock().map(|h| h.mean()) }.unwrap_or_default();
        let max_latency = { self.latency_hist.lock().map(|h| h.max()) }.unwrap_or_default();

        println!("--- QUEUE STATS [{:.2}s] ---", elapsed_seconds);
        println!("Enqueued: {} items ({:.2} items/sec)", enqueued, enqueue_rate);
        println!("Dequeued: {} items ({:.2} items/sec)", dequeued, dequeue_rate);
        println!("Queue size: ~{} items", enqueued.saturating_sub(dequeued));

        println!(
            "Latency: avg {} μs, max {} μs.",
            ((avg_latency * 10.0) as u64 / 10).to_formatted_string(&locale),
            max_latency.to_formatted_string(&locale)
        );

        print!("Percentiles: ");
        for &p in percentiles {
            if let Some(latency) = self.percentile(p) {
                print!("P{:.1}: {} μs, ", p, latency.to_formatted_string(&locale));
            }
        }
        println!();
        println!("---------------------------");
    }
}

async fn run_producer(
    queue: ConcurrentPriorityQueue<StressItem, u64>,
    cfg: StressTestCfg,
    started: Instant,
    end_time: Instant,
    stats: Arc<TestStats>,
    start_barrier: Arc<Barrier>,
    producers_done: Arc<AtomicUsize>,
) {
    // Wait for all producers and consumers to be ready
    start_barrier.wait().await;

    let mut submitted = 0;
    while Instant::now() < end_time && submitted < cfg.num_items {
        let (item, priority) = {
            let mut rng = rand::rng();
            cfg.randomized_item(started, &mut rng)
        };

        queue.enqueue_with_priority(item, priority).await;
        stats.record_enqueue();
        submitted += 1;
    }

    producers_done.fetch_add(1, Ordering::SeqCst);
}

async fn run_consumer(
    queue: ConcurrentPriorityQueue<StressItem, u64>,
    cfg: StressTestCfg,
    started: Instant,
    end_time: Instant,
    stats: Arc<TestStats>,
    start_barrier: Arc<Barrier>,
    producers_done: Arc<AtomicUsize>,
) {
    start_barrier.wait().await;

    loop {
        let mut drained_in_batch = 0;
        for _ in 0..cfg.drain_batch_size {
            let Ok(item) = queue.dequeue().await else {
                break;
            };
            let latency_us = (started.elapsed().as_micros() as u64)
                .saturating_sub(item.submitted_at_us);
            stats.record_dequeue(latency_us);
            drained_in_batch += 1;
        }

        let all_produced = producers_done.load(Ordering::Relaxed) >= cfg.num_producers;
        if Instant::now() >= end_time || (all_produced && drained_in_batch == 0) {
            break;
        }

        time::sleep(Duration::from_micros(cfg.drain_interval_us)).await;
    }
}

/// Runs the configured workload against `queue` and prints throughput and
/// latency statistics while it goes.
pub async fn run_stress_test(queue: ConcurrentPriorityQueue<StressItem, u64>, cfg: StressTestCfg) {
    println!(
        "Starting stress test with {} producers and {} consumers",
        cfg.num_producers, cfg.num_consumers
    );
    println!("Each producer will enqueue {} items", cfg.num_items);
    println!(
        "Drain interval: {}μs, batch size: {}",
        cfg.drain_interval_us, cfg.drain_batch_size
    );
    println!("\n{:-<75}\n", "");

    let started = Instant::now();
    let end_time = started + Duration::from_secs(cfg.run_duration_seconds);

    let stats = Arc::new(TestStats::new());
    let producers_done = Arc::new(AtomicUsize::new(0));
    let start_barrier = Arc::new(Barrier::new(cfg.num_producers + cfg.num_consumers));

    let mut handles = Vec::with_capacity(cfg.num_producers + cfg.num_consumers);

    for _ in 0..cfg.num_producers {
        handles.push(tokio::spawn(run_producer(
            queue.clone(),
            cfg.clone(),
            started,
            end_time,
            Arc::clone(&stats),
            Arc::clone(&start_barrier),
            Arc::clone(&producers_done),
        )));
    }

    for _ in 0..cfg.num_consumers {
        handles.push(tokio::spawn(run_consumer(
            queue.clone(),
            cfg.clone(),
            started,
            end_time,
            Arc::clone(&stats),
            Arc::clone(&start_barrier),
            Arc::clone(&producers_done),
        )));
    }

    // -- Periodic reporting while the workload runs
    let reporter_stats = Arc::clone(&stats);
    let reporter_cfg = cfg.clone();
    let reporter = tokio::spawn(async move {
        let mut interval =
            time::interval(Duration::from_millis(reporter_cfg.print_stats_interval_ms));
        interval.tick().await; // throw away first immediate tick
        while Instant::now() < end_time {
            interval.tick().await;
            reporter_stats.print_stats(
                started.elapsed().as_secs_f64(),
                &reporter_cfg.latency_percentiles,
            );
        }
    });

    for handle in handles {
        if let Err(e) = handle.await {
            eprintln!("Error! Stress worker panicked: {e}");
        }
    }
    reporter.abort();

    println!("\n{:=^75}", " Stress Test Results ");
    stats.print_stats(started.elapsed().as_secs_f64(), &cfg.latency_percentiles);
}

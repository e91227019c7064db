use clap::Parser;
use pqueue::ConcurrentPriorityQueue;
use pqueue::stress::{StressItem, StressTestCfg, run_stress_test};

pub mod cfg;

fn main() {
    let cfg = cfg::Cfg::parse();
    println!("Running configuration:\n{cfg:#?}");

    if let Err(e) = run(cfg) {
        eprintln!("Error: {e:?}");
    }
}

fn run(cfg: cfg::Cfg) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let stress_cfg = StressTestCfg {
            num_producers: cfg.producer_num,
            num_items: cfg.item_num,
            num_consumers: cfg.consumer_num,
            payload_size_range: (256, 1_024),
            priority_range: (1, 1_000),
            drain_interval_us: cfg.drain_interval_us,
            drain_batch_size: cfg.drain_batch_size,
            run_duration_seconds: cfg.run_duration_seconds,
            print_stats_interval_ms: cfg.print_stats_interval_ms,
            latency_percentiles: vec![50.0, 90.0, 99.0, 99.9],
        };

        let queue: ConcurrentPriorityQueue<StressItem, u64> = ConcurrentPriorityQueue::new();
        run_stress_test(queue, stress_cfg).await;
    });

    Ok(())
}

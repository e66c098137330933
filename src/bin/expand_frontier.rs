use chrono::Utc;
use frontier_chess::board::board_codec::encode;
use frontier_chess::board::board_state::Board;
use frontier_chess::frontier::memory_frontier::MemoryFrontier;
use frontier_chess::pipeline::expansion_run::run_expansion;
use frontier_chess::pipeline::pipeline_config::PipelineConfig;
use frontier_chess::pipeline::shared_run_state::SharedRunState;
use frontier_chess::utils::random_walk::random_walk;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

fn parse_arg<T: std::str::FromStr>(args: &[String], idx: usize, default: T) -> T {
    args.get(idx)
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let max_move_count: u32 = parse_arg(&args, 1, 2u32);
    let workers: usize = parse_arg(&args, 2, 5usize);
    let batch_size: usize = parse_arg(&args, 3, 1000usize);
    let dequeue_timeout_ms: u64 = parse_arg(&args, 4, 60_000u64);
    let random_seeds: usize = parse_arg(&args, 5, 0usize);
    let rng_seed: u64 = parse_arg(&args, 6, 0x5eed_u64);

    let config = PipelineConfig {
        max_move_count,
        workers,
        batch_size,
        dequeue_timeout: Duration::from_millis(dequeue_timeout_ms),
        ..PipelineConfig::default()
    };

    let store = Arc::new(MemoryFrontier::new());
    store.seed(Board::initial(), 0);

    let mut rng = StdRng::seed_from_u64(rng_seed);
    for _ in 0..random_seeds {
        let plies = rng.random_range(1..=4usize);
        let line = random_walk(Board::initial(), 0, plies, &mut rng);
        if let Some(last) = line.last() {
            store.seed(last.board, last.move_count);
            println!(
                "seeded move_count={} rows={}",
                last.move_count,
                encode(&last.board).join(",")
            );
        }
    }

    println!(
        "Frontier expansion: max_move_count={} workers={} batch_size={} dequeue_timeout_ms={} seeds={}",
        max_move_count,
        config.normalized_workers(),
        config.normalized_batch_size(),
        dequeue_timeout_ms,
        store.node_count()
    );

    let (event_tx, event_rx) = mpsc::channel();
    let printer = thread::spawn(move || {
        for event in event_rx {
            println!("{} {}", Utc::now().format("%H:%M:%S%.3f"), event);
        }
    });

    let result = run_expansion(store.clone(), config, SharedRunState::new(), Some(event_tx));
    let _ = printer.join();

    match result {
        Ok(report) => {
            println!(
                "outcome={:?} expanded={} children={} edges={} batches={} forwarded={} elapsed_ms={}",
                report.outcome,
                report.counters.nodes_expanded,
                report.counters.children_written,
                report.counters.edges_written,
                report.counters.batches_flushed,
                report.forwarded,
                report.elapsed().num_milliseconds()
            );
            println!(
                "store nodes={} edges={} unexplored_under_ceiling={}",
                store.node_count(),
                store.edge_count(),
                store.unexplored_count(max_move_count)
            );
        }
        Err(error) => {
            eprintln!("expansion failed: {error}");
            std::process::exit(1);
        }
    }
}

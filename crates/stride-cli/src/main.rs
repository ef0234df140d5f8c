//! Demo binary for the stride work loop.
//!
//! Two scenarios, picked by the first argument:
//! - `walk` (default): 2-D random walkers stepping until they leave a radius.
//! - `pi`: chained Monte Carlo batches until each task has enough samples.

use std::env;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use stride_core::{SpawnPool, StepFailure, Verdict, WorkItem, WorkLoop};

const WORKERS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Position {
    x: f64,
    y: f64,
}

impl Position {
    fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    fn distance(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// One random-walk step: displace by a uniform delta in each axis.
async fn walk_step(item: WorkItem<Position>) -> Result<Position, StepFailure> {
    let mut pos = item.into_payload();
    let (dx, dy) = {
        let mut rng = rand::thread_rng();
        (rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    };
    pos.x += dx;
    pos.y += dy;
    Ok(pos)
}

async fn run_walk() {
    // (A) プールとループを用意（ワーカー4本、歩行者8人）
    let pool = Arc::new(SpawnPool::new(WORKERS, walk_step));
    let work_loop = WorkLoop::builder(pool).max_steps_per_task(10_000).build();

    let seeds = vec![Position::origin(); 8];

    // (B) 原点から半径 10 を出るまで歩かせる
    let decider = |pos: &Position| {
        if pos.distance() < 10.0 {
            Verdict::Continue
        } else {
            Verdict::Finish
        }
    };
    let mut handle = work_loop.run(seeds, decider).expect("seed batch is non-empty");
    println!("run started: {}", handle.run_id());

    // (C) 終わった歩行者から順に出力（投入順とは限らない）
    while let Some(item) = handle.next().await {
        match item {
            Ok(outcome) => {
                let line = serde_json::to_string(&outcome).expect("outcome serializes");
                println!("{line}");
            }
            Err(e) => {
                eprintln!("run failed: {e}");
                return;
            }
        }
    }
    println!("counts: {:?}", handle.counts());
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PiBatch {
    inside: u64,
    total: u64,
}

const PI_BATCH: u64 = 10_000;
const PI_TARGET: u64 = 1_000_000;

/// One Monte Carlo batch: sample points in the unit square, count hits
/// inside the quarter circle, accumulate into the task's own payload.
async fn pi_step(item: WorkItem<PiBatch>) -> Result<PiBatch, StepFailure> {
    let mut acc = item.into_payload();
    let mut rng = rand::thread_rng();
    for _ in 0..PI_BATCH {
        let x: f64 = rng.gen_range(0.0..1.0);
        let y: f64 = rng.gen_range(0.0..1.0);
        if x * x + y * y <= 1.0 {
            acc.inside += 1;
        }
    }
    acc.total += PI_BATCH;
    Ok(acc)
}

async fn run_pi() {
    let pool = Arc::new(SpawnPool::new(WORKERS, pi_step));
    let work_loop = WorkLoop::new(pool);

    let seeds = vec![PiBatch { inside: 0, total: 0 }; WORKERS];
    let decider = |acc: &PiBatch| {
        if acc.total < PI_TARGET {
            Verdict::Continue
        } else {
            Verdict::Finish
        }
    };
    let handle = work_loop.run(seeds, decider).expect("seed batch is non-empty");

    match handle.collect().await {
        Ok(outcomes) => {
            let (inside, total) = outcomes
                .iter()
                .filter_map(|o| o.payload())
                .fold((0u64, 0u64), |(i, t), batch| {
                    (i + batch.inside, t + batch.total)
                });
            println!("samples: {total}");
            println!("estimate: {}", 4.0 * inside as f64 / total as f64);
        }
        Err(e) => eprintln!("run failed: {e}"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let scenario = env::args().nth(1).unwrap_or_else(|| "walk".to_string());
    match scenario.as_str() {
        "walk" => run_walk().await,
        "pi" => run_pi().await,
        other => eprintln!("unknown scenario: {other} (expected \"walk\" or \"pi\")"),
    }
}

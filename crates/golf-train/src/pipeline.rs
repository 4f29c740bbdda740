//! Fan-out training: workers play a batch of episodes against one read-only
//! snapshot, and the aggregator applies their trajectories in episode order.

use crate::trainer::{
    Aggregator, EpisodePlan, EpisodeResult, Trainer, TrainerError, TrainingOutcome, play_episode,
};
use rayon::prelude::*;
use std::sync::atomic::AtomicBool;
use tracing::debug;

pub(crate) fn run(
    trainer: &Trainer,
    episodes: usize,
    cancel: &AtomicBool,
) -> Result<TrainingOutcome, TrainerError> {
    let settings = trainer.settings();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.workers.max(1))
        .build()?;
    let batch_size = settings.batch_size.max(1);
    let setup = trainer.episode_setup();
    let mut aggregator = Aggregator::new(trainer);

    let mut start = 0;
    'batches: while start < episodes {
        let end = (start + batch_size).min(episodes);
        let plans: Vec<EpisodePlan> = (start..end).map(|index| aggregator.plan(index)).collect();
        let snapshot = aggregator.snapshot();
        debug!(target: "golf_train::pipeline", start, end, "dispatching batch");

        let results: Vec<Result<Option<EpisodeResult>, TrainerError>> = pool.install(|| {
            plans
                .par_iter()
                .map(|&plan| play_episode(&setup, snapshot.clone(), plan, cancel))
                .collect()
        });
        drop(snapshot);

        for result in results {
            match result? {
                Some(result) => aggregator.absorb(result),
                None => {
                    // Later episodes of the batch are dropped with it.
                    aggregator.mark_cancelled();
                    break 'batches;
                }
            }
        }
        start = end;
    }
    Ok(aggregator.finish())
}

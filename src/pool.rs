use std::sync::atomic::{AtomicUsize, Ordering};

use crate::candidate::Candidate;
use crate::error::Error;
use crate::extractor::{Extractor, ExtractorConfig};
use crate::frame::Frame;

/// One core per worker by default.
pub fn default_workers() -> usize {
    num_cpus::get()
}

/// Runs the pipeline over a batch of independent sequences on a fixed-size
/// worker pool.
///
/// The task queue is an atomic cursor over the sequence slice; each worker
/// pulls the next unprocessed index until the queue drains. A failing
/// sequence is logged and reported in its own result slot without affecting
/// siblings, and results come back in input order.
pub fn process_batch(
    sequences: &[Vec<Frame>],
    config: &ExtractorConfig,
    workers: usize,
) -> Vec<Result<Vec<Candidate>, Error>> {
    if sequences.is_empty() {
        return Vec::new();
    }

    let workers = workers.max(1).min(sequences.len());
    let extractor = Extractor::new(config.clone());
    let cursor = AtomicUsize::new(0);

    let mut results: Vec<Option<Result<Vec<Candidate>, Error>>> =
        (0..sequences.len()).map(|_| None).collect();

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);

        for _ in 0..workers {
            let extractor = &extractor;
            let cursor = &cursor;

            handles.push(scope.spawn(move || {
                let mut done = Vec::new();

                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    if index >= sequences.len() {
                        break;
                    }

                    let result = extractor.extract(&sequences[index]);
                    if let Err(err) = &result {
                        log::error!("sequence {} rejected: {}", index, err);
                    }

                    done.push((index, result));
                }

                done
            }));
        }

        for handle in handles {
            if let Ok(done) = handle.join() {
                for (index, result) in done {
                    results[index] = Some(result);
                }
            }
        }
    });

    results
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Ok(Vec::new())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::detection::Detection;

    fn sequence(conf: f32) -> Vec<Frame> {
        vec![Frame::new(vec![Detection::new(
            0,
            BBox::ltrb(0.1, 0.1, 0.3, 0.3),
            conf,
            "smoke",
        )])]
    }

    #[test]
    fn batch_results_are_in_input_order() {
        let sequences = vec![sequence(0.9), sequence(0.6), sequence(0.7)];
        let results = process_batch(&sequences, &ExtractorConfig::default(), 2);

        assert_eq!(results.len(), 3);
        let scores: Vec<f32> = results
            .iter()
            .map(|r| r.as_ref().unwrap()[0].score)
            .collect();
        assert_eq!(scores, vec![0.9, 0.6, 0.7]);
    }

    #[test]
    fn failing_sequence_does_not_abort_siblings() {
        let sequences = vec![sequence(0.9), sequence(1.5), sequence(0.8)];
        let results = process_batch(&sequences, &ExtractorConfig::default(), 2);

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn more_workers_than_sequences_is_fine() {
        let sequences = vec![sequence(0.9)];
        let results = process_batch(&sequences, &ExtractorConfig::default(), 64);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }

    #[test]
    fn empty_batch_yields_empty_results() {
        assert!(process_batch(&[], &ExtractorConfig::default(), 4).is_empty());
    }
}

//! Fire-and-forget snapshot saving on a worker thread.
//!
//! # Responsibility
//! - Accept snapshots without blocking the caller.
//! - Save them in submission order on one worker that owns the port.
//! - Report outcomes back through a channel drained by the caller.
//!
//! # Invariants
//! - Exactly one outcome is produced per accepted submission.
//! - Dropping the saver closes the queue and joins the worker after the
//!   queued saves finish.

use crate::persistence::{
    EventPersistence, PersistError, PersistResult, SaveOutcome, SnapshotSink,
};
use crate::store::event_store::EventSnapshot;
use crossbeam_channel as chan;
use log::{error, info, warn};
use std::thread::{self, JoinHandle};
use std::time::Instant;

const WORKER_NAME: &str = "lazycal-saver";

struct SaveJob {
    sequence: u64,
    snapshot: EventSnapshot,
}

/// Background writer for event snapshots.
pub struct BackgroundSaver {
    job_tx: Option<chan::Sender<SaveJob>>,
    outcome_rx: chan::Receiver<SaveOutcome>,
    worker: Option<JoinHandle<()>>,
    next_sequence: u64,
    in_flight: u64,
    // Outcomes synthesized locally when the worker could not take a job.
    rejected: Vec<SaveOutcome>,
}

impl BackgroundSaver {
    /// Moves `port` onto a new worker thread.
    ///
    /// # Errors
    /// - `Unavailable` when the worker thread cannot be spawned.
    pub fn spawn<P>(port: P) -> PersistResult<Self>
    where
        P: EventPersistence + Send + 'static,
    {
        let (job_tx, job_rx) = chan::unbounded::<SaveJob>();
        let (outcome_tx, outcome_rx) = chan::unbounded::<SaveOutcome>();

        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || run_worker(port, job_rx, outcome_tx))
            .map_err(|err| PersistError::Unavailable(format!("failed to spawn saver: {err}")))?;

        info!("event=saver_start module=persistence status=ok");
        Ok(Self {
            job_tx: Some(job_tx),
            outcome_rx,
            worker: Some(worker),
            next_sequence: 0,
            in_flight: 0,
            rejected: Vec::new(),
        })
    }

    /// Number of submitted saves without a received outcome.
    pub fn in_flight(&self) -> u64 {
        self.in_flight
    }

    /// Blocks until every submitted snapshot has an outcome, then drains them.
    pub fn flush(&mut self) -> Vec<SaveOutcome> {
        let mut outcomes = std::mem::take(&mut self.rejected);
        while self.in_flight > 0 {
            match self.outcome_rx.recv() {
                Ok(outcome) => {
                    self.in_flight -= 1;
                    outcomes.push(outcome);
                }
                Err(_) => {
                    error!(
                        "event=saver_flush module=persistence status=error in_flight={} error=worker_gone",
                        self.in_flight
                    );
                    self.in_flight = 0;
                }
            }
        }
        outcomes
    }
}

impl SnapshotSink for BackgroundSaver {
    fn submit(&mut self, snapshot: EventSnapshot) -> u64 {
        self.next_sequence += 1;
        let sequence = self.next_sequence;

        let sent = match &self.job_tx {
            Some(tx) => tx.send(SaveJob { sequence, snapshot }).is_ok(),
            None => false,
        };

        if sent {
            self.in_flight += 1;
        } else {
            warn!(
                "event=snapshot_submit module=persistence status=error sequence={sequence} error=queue_closed"
            );
            self.rejected.push(SaveOutcome {
                sequence,
                result: Err(PersistError::Unavailable("save queue closed".to_string())),
            });
        }
        sequence
    }

    fn poll_outcomes(&mut self) -> Vec<SaveOutcome> {
        let mut outcomes = std::mem::take(&mut self.rejected);
        for outcome in self.outcome_rx.try_iter() {
            self.in_flight = self.in_flight.saturating_sub(1);
            outcomes.push(outcome);
        }
        outcomes
    }
}

impl Drop for BackgroundSaver {
    fn drop(&mut self) {
        // Closing the sender ends the worker loop once the queue is drained.
        self.job_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=saver_stop module=persistence status=error error=worker_panicked");
            }
        }
    }
}

fn run_worker<P: EventPersistence>(
    port: P,
    job_rx: chan::Receiver<SaveJob>,
    outcome_tx: chan::Sender<SaveOutcome>,
) {
    while let Ok(job) = job_rx.recv() {
        let started_at = Instant::now();
        let result = port.save(&job.snapshot);
        match &result {
            Ok(()) => info!(
                "event=snapshot_save module=persistence status=ok sequence={} dates={} events={} duration_ms={}",
                job.sequence,
                job.snapshot.date_count(),
                job.snapshot.event_count(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=snapshot_save module=persistence status=error sequence={} duration_ms={} error={}",
                job.sequence,
                started_at.elapsed().as_millis(),
                err
            ),
        }

        // Saving continues even when nobody is listening for outcomes.
        let _ = outcome_tx.send(SaveOutcome {
            sequence: job.sequence,
            result,
        });
    }
    info!("event=saver_stop module=persistence status=ok");
}

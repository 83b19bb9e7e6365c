use std::future::Future;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tokio::spawn;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::actors::LedgerHandle;

/// Drift is drawn uniformly from this many cents either side of zero.
const DRIFT_SPREAD_CENTS: i64 = 5_000;
/// Only drifts larger than this (in cents, either sign) become ledger records.
const DRIFT_RECORD_THRESHOLD_CENTS: i64 = 2_000;

/// Cancels a single scheduled task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    name: String,
    abort: AbortHandle
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cancel(&self) {
        debug!("Cancelling scheduled task [{}]", self.name);
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// The periodic side effects of a session, as an explicit list of tasks.
///
/// Every task runs on a fixed period, first firing one period after it is scheduled. A task
/// stops when it returns an error, when its tick limit is reached, when its handle is
/// cancelled, or when the schedule is shut down or dropped.
#[derive(Default)]
pub struct LiveSchedule {
    tasks: Vec<(TaskHandle, JoinHandle<()>)>
}

impl LiveSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` every `period` until cancelled.
    pub fn every<F, Fut>(&mut self, name: &str, period: Duration, task: F) -> TaskHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.schedule(name, period, None, task)
    }

    /// Runs `task` every `period`, at most `ticks` times.
    pub fn every_limited<F, Fut>(&mut self, name: &str, period: Duration, ticks: usize, task: F) -> TaskHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.schedule(name, period, Some(ticks), task)
    }

    /// Schedules the simulated balance drift of a session.
    ///
    /// Each tick draws a fluctuation in [-50.00, 50.00); those beyond +/-20.00 are appended to
    /// the ledger as live records. With a seed the sequence of fluctuations is reproducible.
    pub fn start_balance_drift(&mut self, ledger: LedgerHandle, period: Duration, ticks: Option<usize>, seed: Option<u64>) -> TaskHandle {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng()
        };
        let name = format!("balance-drift-{}", ledger.session_id());

        let task = move || {
            let cents = rng.random_range(-DRIFT_SPREAD_CENTS..DRIFT_SPREAD_CENTS);
            let ledger = ledger.clone();

            async move {
                if cents.abs() > DRIFT_RECORD_THRESHOLD_CENTS {
                    let record = ledger.append_live(Decimal::new(cents, 2)).await?;
                    debug!("Balance drift recorded as [{}], balance {}", record.id, record.running_balance);
                }

                Ok(())
            }
        };

        match ticks {
            Some(ticks) => self.every_limited(&name, period, ticks, task),
            None => self.every(&name, period, task)
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every task to stop on its own, so cancel unbounded ones first.
    ///
    /// Dropping the returned future part way keeps the unfinished tasks in the schedule, where
    /// [`LiveSchedule::shutdown`] can still stop them.
    pub async fn join(&mut self) {
        while let Some((handle, task)) = self.tasks.last_mut() {
            if let Err(error) = task.await {
                if !error.is_cancelled() {
                    error!("Scheduled task [{}] panicked: {error}", handle.name);
                }
            }

            self.tasks.pop();
        }
    }

    /// Cancels every task and waits until none of them can run again.
    pub async fn shutdown(mut self) {
        let count = self.len();

        for (handle, _) in &self.tasks {
            if !handle.is_finished() {
                handle.cancel();
            }
        }

        self.join().await;

        info!("Live schedule shut down, {count} tasks stopped");
    }

    fn schedule<F, Fut>(&mut self, name: &str, period: Duration, ticks: Option<usize>, mut task: F) -> TaskHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let task_name = name.to_string();

        let join = spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut count = 0;

            while ticks.is_none_or(|limit| count < limit) {
                interval.tick().await;
                count += 1;

                if let Err(error) = task().await {
                    error!("Scheduled task [{task_name}] stopped after {count} ticks: {error}");
                    return;
                }
            }

            debug!("Scheduled task [{task_name}] finished after {count} ticks");
        });

        let handle = TaskHandle {
            name: name.to_string(),
            abort: join.abort_handle()
        };

        self.tasks.push((handle.clone(), join));
        debug!("Scheduled task [{name}] every {period:?}");

        handle
    }
}

impl Drop for LiveSchedule {
    fn drop(&mut self) {
        for (handle, _) in &self.tasks {
            handle.abort.abort();
        }
    }
}

//! Background scheduler driving the four periodic jobs.
//!
//! Each job runs in its own Tokio task with its own store handle, sleeping
//! until its next UTC firing time. Every firing is spawned as a separate
//! task so that an error or a panic is caught, logged with the job name,
//! and the loop simply waits for the next firing.
//!
//! ```text
//! lifecycle      00:00 06:00 12:00 18:00
//! deterioration  00:00
//! climate              06:00       18:00
//! season check   00:00
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use eko_db::SimulationStore;
use eko_world::climate::ClimateRoller;

use crate::cadence::Cadence;
use crate::config::SimulationConfig;
use crate::error::ServiceError;
use crate::species::SpeciesSource;
use crate::tick;

/// The scheduled jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    /// Daily plant lifecycle step.
    Lifecycle,
    /// Daily soil decay.
    Deterioration,
    /// Climate event roll.
    Climate,
    /// Season rollover check.
    SeasonCheck,
}

impl Job {
    /// Every job, in start order.
    pub const ALL: [Self; 4] = [
        Self::SeasonCheck,
        Self::Lifecycle,
        Self::Deterioration,
        Self::Climate,
    ];

    /// Name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lifecycle => "lifecycle",
            Self::Deterioration => "deterioration",
            Self::Climate => "climate",
            Self::SeasonCheck => "season_check",
        }
    }

    /// When the job fires.
    pub fn cadence(self) -> Cadence {
        match self {
            Self::Lifecycle => Cadence::every_hours(6),
            Self::Deterioration | Self::SeasonCheck => Cadence::daily_at(0),
            Self::Climate => Cadence::at_hours([6, 18]),
        }
    }
}

/// Tunables the jobs read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerSettings {
    /// Fraction of quadrant decay spread to neighbours.
    pub propagation_factor: f64,
    /// Season length.
    pub season_duration: Duration,
    /// Chance of a quiet climate roll.
    pub no_event_probability: f64,
    /// Climate RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl SchedulerSettings {
    /// Take the job tunables from a loaded configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            propagation_factor: config.world.propagation_factor,
            season_duration: Duration::days(config.world.season_duration_days),
            no_event_probability: config.world.no_event_probability,
            seed: config.world.seed,
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

/// What one job needs to run. Cloned per job, so each job owns a store
/// handle.
struct JobContext<S> {
    store: S,
    species: Arc<dyn SpeciesSource>,
    settings: SchedulerSettings,
    roller: ClimateRoller,
    rng: Arc<Mutex<StdRng>>,
}

impl<S: Clone> Clone for JobContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            species: Arc::clone(&self.species),
            settings: self.settings,
            roller: self.roller,
            rng: Arc::clone(&self.rng),
        }
    }
}

impl<S: SimulationStore> JobContext<S> {
    async fn run(&self, job: Job, now: DateTime<Utc>) -> Result<(), ServiceError> {
        match job {
            Job::Lifecycle => {
                tick::run_daily_tick(&self.store, self.species.as_ref(), now).await?;
            }
            Job::Deterioration => {
                tick::run_deterioration_tick(&self.store, self.settings.propagation_factor, now)
                    .await?;
            }
            Job::Climate => {
                let event = {
                    let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                    self.roller.roll(&mut *rng)
                };
                match event {
                    Some(event) => {
                        tick::apply_climate_event(&self.store, event, now).await?;
                    }
                    None => tracing::info!("Climate roll: no event"),
                }
            }
            Job::SeasonCheck => {
                tick::run_season_check(&self.store, self.settings.season_duration, now).await?;
            }
        }
        Ok(())
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    handles: Vec<(Job, JoinHandle<()>)>,
}

/// Owns the job loops. `start` and `shutdown` may be called any number of
/// times.
pub struct Scheduler<S> {
    context: JobContext<S>,
    running: Mutex<Option<Running>>,
}

impl<S> std::fmt::Debug for Scheduler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("settings", &self.context.settings)
            .finish_non_exhaustive()
    }
}

impl<S: SimulationStore> Scheduler<S> {
    /// Build a scheduler over `store` and `species`. Nothing runs until
    /// [`start`](Self::start).
    pub fn new(store: S, species: Arc<dyn SpeciesSource>, settings: SchedulerSettings) -> Self {
        let rng = settings
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            context: JobContext {
                store,
                species,
                settings,
                roller: ClimateRoller::new(settings.no_event_probability),
                rng: Arc::new(Mutex::new(rng)),
            },
            running: Mutex::new(None),
        }
    }

    /// Spawn the job loops. Returns `false` if they are already running.
    pub fn start(&self) -> bool {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            tracing::debug!("Scheduler already running");
            return false;
        }

        let (shutdown, _) = watch::channel(false);
        let handles = Job::ALL
            .into_iter()
            .map(|job| {
                let context = self.context.clone();
                let rx = shutdown.subscribe();
                (job, tokio::spawn(job_loop(job, context, rx)))
            })
            .collect();
        *running = Some(Running { shutdown, handles });

        tracing::info!(jobs = Job::ALL.len(), "Scheduler started");
        true
    }

    /// Whether the job loops are running.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Signal every loop to stop, let in-flight jobs finish, and join.
    /// Does nothing if not running.
    pub async fn shutdown(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(running) = running else {
            return;
        };

        // Receivers are held by the loops; a send error means they are gone.
        let _ = running.shutdown.send(true);
        for (job, handle) in running.handles {
            if let Err(err) = handle.await {
                tracing::error!(job = job.name(), error = %err, "Job loop ended abnormally");
            }
        }
        tracing::info!("Scheduler stopped");
    }

    /// Run one job immediately on the caller's task.
    pub async fn run_now(&self, job: Job) -> Result<(), ServiceError> {
        self.context.run(job, Utc::now()).await
    }
}

async fn job_loop<S: SimulationStore>(
    job: Job,
    context: JobContext<S>,
    mut shutdown: watch::Receiver<bool>,
) {
    let cadence = job.cadence();
    let context = Arc::new(context);
    loop {
        if *shutdown.borrow() {
            break;
        }
        let now = Utc::now();
        let Some(next) = cadence.next_after(now) else {
            tracing::warn!(job = job.name(), "Job has no firing times, loop stopped");
            break;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::debug!(job = job.name(), next = %next, "Waiting for next firing");

        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        fire(job, &context).await;
    }
    tracing::debug!(job = job.name(), "Job loop exited");
}

/// How one firing ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FiringOutcome {
    Finished,
    Failed,
    Panicked,
}

/// Run one firing on its own task so an error or a panic stays inside it.
async fn fire<S: SimulationStore>(job: Job, context: &Arc<JobContext<S>>) -> FiringOutcome {
    let firing = Arc::clone(context);
    let task = tokio::spawn(async move { firing.run(job, Utc::now()).await });
    match task.await {
        Ok(Ok(())) => {
            tracing::debug!(job = job.name(), "Job finished");
            FiringOutcome::Finished
        }
        Ok(Err(err)) => {
            tracing::warn!(job = job.name(), error = %err, "Job failed");
            FiringOutcome::Failed
        }
        Err(err) => {
            tracing::error!(job = job.name(), error = %err, "Job panicked");
            FiringOutcome::Panicked
        }
    }
}

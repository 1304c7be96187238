//! Tokio drivers for the per-subject and monitoring-side clocks

use crate::hub::MonitorHub;
use crate::pipeline::SubjectPipeline;
use crate::settings::Settings;
use crate::now_ms;
use alerting::Alert;
use pose_frame::LandmarkFrame;
use roster::StatusUpdate;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Drives one monitored subject: a frame-ingestion task at capture rate,
/// the 1 Hz compute clock, and the periodic status push.
///
/// The tasks share only the pipeline state; frame ingestion never waits
/// on a clock tick. `stop` ends all three synchronously; no updates are
/// emitted afterwards.
pub struct PipelineDriver {
    pipeline: Arc<Mutex<SubjectPipeline>>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl PipelineDriver {
    pub fn spawn(
        name: String,
        grade: String,
        settings: &Settings,
        mut frames: mpsc::Receiver<LandmarkFrame>,
        updates: mpsc::Sender<StatusUpdate>,
    ) -> Self {
        let pipeline = Arc::new(Mutex::new(SubjectPipeline::new(
            settings.posture.clone(),
            settings.presence.clone(),
            settings.focus.clone(),
        )));
        if let Ok(mut guard) = pipeline.lock() {
            guard.start(now_ms());
        }
        let (shutdown, _) = watch::channel(false);
        info!(name = %name, "starting subject pipeline");

        let mut tasks = Vec::new();

        // Frame ingestion, at whatever rate the vision collaborator runs.
        {
            let pipeline = pipeline.clone();
            let mut shutdown_rx = shutdown.subscribe();
            tasks.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown_rx.changed() => break,
                        maybe_frame = frames.recv() => {
                            let Some(frame) = maybe_frame else { break };
                            let Ok(mut guard) = pipeline.lock() else { break };
                            guard.ingest_frame(&frame, now_ms());
                        }
                    }
                }
            }));
        }

        // Compute clock: score the window once per second. A status flip
        // from the wall-clock presence path is pushed out immediately.
        {
            let pipeline = pipeline.clone();
            let updates = updates.clone();
            let (name, grade) = (name.clone(), grade.clone());
            let mut shutdown_rx = shutdown.subscribe();
            let period = Duration::from_millis(settings.compute_tick_ms);
            tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = shutdown_rx.changed() => break,
                        _ = interval.tick() => {
                            let outcome = {
                                let Ok(mut guard) = pipeline.lock() else { break };
                                guard.compute_tick(now_ms())
                            };
                            if outcome.status_change.is_some() {
                                let update = StatusUpdate {
                                    name: name.clone(),
                                    grade: grade.clone(),
                                    status: outcome.status,
                                    timestamp: now_ms(),
                                    focus: Some(outcome.snapshot),
                                };
                                if updates.send(update).await.is_err() {
                                    warn!("status channel closed, stopping compute clock");
                                    break;
                                }
                            }
                        }
                    }
                }
            }));
        }

        // Status push at its own cadence.
        {
            let pipeline = pipeline.clone();
            let mut shutdown_rx = shutdown.subscribe();
            let period = Duration::from_millis(settings.status_interval_ms);
            tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = shutdown_rx.changed() => break,
                        _ = interval.tick() => {
                            let update = {
                                let Ok(guard) = pipeline.lock() else { break };
                                StatusUpdate {
                                    name: name.clone(),
                                    grade: grade.clone(),
                                    status: guard.status(),
                                    timestamp: now_ms(),
                                    focus: Some(guard.snapshot()),
                                }
                            };
                            if updates.send(update).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }));
        }

        Self {
            pipeline,
            shutdown,
            tasks,
        }
    }

    /// End all three tasks now and discard accumulated analysis state.
    pub fn stop(&self) {
        info!("stopping subject pipeline");
        let _ = self.shutdown.send(true);
        for task in &self.tasks {
            task.abort();
        }
        if let Ok(mut guard) = self.pipeline.lock() {
            guard.reset();
        }
    }

    /// Shared pipeline state (inspection and tests).
    pub fn pipeline(&self) -> Arc<Mutex<SubjectPipeline>> {
        self.pipeline.clone()
    }
}

/// Drives the monitoring side's 1 Hz report clock: watchdog checks plus
/// per-subject aggregation, with raised alerts forwarded to a channel.
pub struct HubDriver {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl HubDriver {
    pub fn spawn(
        hub: Arc<Mutex<MonitorHub>>,
        tick_ms: u64,
        alerts: mpsc::Sender<Alert>,
    ) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        info!("starting monitoring report clock");

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            'outer: loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {
                        let raised = {
                            let Ok(mut guard) = hub.lock() else { break };
                            guard.report_tick(now_ms())
                        };
                        for alert in raised {
                            if alerts.send(alert).await.is_err() {
                                warn!("alert channel closed, stopping report clock");
                                break 'outer;
                            }
                        }
                    }
                }
            }
        });

        Self { shutdown, task }
    }

    /// End the report clock now; no further alerts or persistence.
    pub fn stop(&self) {
        info!("stopping monitoring report clock");
        let _ = self.shutdown.send(true);
        self.task.abort();
    }
}

//! Operator control state for runtime simulation management.
//!
//! The operator can stop and start the tick loop, change tick speed, queue
//! world commands, and request a clean shutdown, all without dropping the
//! world. Stopping is lossless: the loop parks before its next tick and
//! picks up exactly where it left off.
//!
//! # Architecture
//!
//! Control flags use [`std::sync::atomic`] types so the state can sit in
//! an [`Arc`](std::sync::Arc) shared between the tick loop and whatever
//! drives it, without locks on the hot path. Queued commands are applied
//! by the runner between ticks, so the world is never touched concurrently.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};
use vivarium_organisms::{EngineConfig, GrowthPlan};

use crate::config::SimulationBoundsConfig;
use crate::tick::WorldStatus;

/// Largest accepted tick interval in milliseconds.
pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;

/// Reason why the simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// An operator requested shutdown.
    OperatorShutdown,
    /// Every organism died and the extinction policy is to pause.
    Extinction,
}

/// A world command queued by the operator, applied before the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum OperatorCommand {
    /// Reseed and restart the world.
    Reset {
        /// New seed.
        seed: u64,
    },
    /// Swap in a new engine snapshot.
    ApplyConfig {
        /// The snapshot to apply.
        engine: EngineConfig,
    },
    /// Grow and place an organism.
    Inject {
        /// Growth plan for the new body.
        plan: GrowthPlan,
        /// Anchor column.
        col: i32,
        /// Anchor row.
        row: i32,
    },
    /// Place a wall.
    PlaceWall {
        /// Column.
        col: i32,
        /// Row.
        row: i32,
    },
    /// Remove every wall.
    ClearWalls,
    /// Remove every food cell.
    ClearFood,
    /// Kill every organism.
    KillAll,
}

/// Shared operator control state.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the tick loop may run.
    running: AtomicBool,

    /// Notification used to wake the tick loop when started.
    start_notify: Notify,

    /// Whether a shutdown has been requested.
    shutdown_requested: AtomicBool,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Wall-clock time when the operator state was created.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Commands awaiting the next tick boundary.
    commands: Mutex<Vec<OperatorCommand>>,

    /// Reason the run ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create a running operator state from configuration.
    pub fn new(tick_interval_ms: u64, bounds: &SimulationBoundsConfig) -> Self {
        Self {
            running: AtomicBool::new(true),
            start_notify: Notify::new(),
            shutdown_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms.min(MAX_TICK_INTERVAL_MS)),
            started_at: Utc::now(),
            max_ticks: bounds.max_ticks,
            max_real_time_seconds: bounds.max_real_time_seconds,
            commands: Mutex::new(Vec::new()),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Start / Stop
    // -----------------------------------------------------------------------

    /// Whether the tick loop may run.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Park the tick loop before its next tick. Idempotent.
    ///
    /// Returns whether the state changed.
    pub fn stop(&self) -> bool {
        self.running.swap(false, Ordering::AcqRel)
    }

    /// Let the tick loop run again. Idempotent.
    ///
    /// Returns whether the state changed.
    pub fn start(&self) -> bool {
        let was_running = self.running.swap(true, Ordering::AcqRel);
        if !was_running {
            self.start_notify.notify_one();
        }
        !was_running
    }

    /// Wait until the loop may run or a shutdown is requested.
    pub async fn wait_until_running(&self) {
        while !self.is_running() && !self.is_shutdown_requested() {
            self.start_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Request a clean end of the run. Wakes a parked loop.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::Release);
        self.start_notify.notify_one();
    }

    /// Check whether a shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Record the reason the run ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the run ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds. 0 runs ticks back to back.
    ///
    /// Returns the previous interval, or `None` if the value was rejected
    /// (above [`MAX_TICK_INTERVAL_MS`]).
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms > MAX_TICK_INTERVAL_MS {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Returns `true` if `max_ticks > 0` and `ticks_run >= max_ticks`.
    pub const fn tick_limit_reached(&self, ticks_run: u64) -> bool {
        self.max_ticks > 0 && ticks_run >= self.max_ticks
    }

    /// Returns `true` if `max_real_time_seconds > 0` and the elapsed
    /// seconds since start reach the limit.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed wall-clock seconds since start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // Negative when the wall clock steps backwards; treat as 0.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queue a command for the next tick boundary.
    pub async fn queue_command(&self, command: OperatorCommand) {
        self.commands.lock().await.push(command);
    }

    /// Drain every queued command in arrival order.
    pub async fn drain_commands(&self) -> Vec<OperatorCommand> {
        std::mem::take(&mut *self.commands.lock().await)
    }

    /// Combine the world counters with the control state.
    pub async fn status(&self, world: WorldStatus) -> SimulationStatus {
        SimulationStatus {
            world,
            running: self.is_running(),
            shutdown_requested: self.is_shutdown_requested(),
            tick_interval_ms: self.tick_interval_ms(),
            elapsed_seconds: self.elapsed_seconds(),
            max_ticks: self.max_ticks,
            max_real_time_seconds: self.max_real_time_seconds,
            end_reason: self.end_reason().await,
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

/// JSON-serializable status of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// World counters.
    pub world: WorldStatus,
    /// Whether the tick loop may run.
    pub running: bool,
    /// Whether a shutdown has been requested.
    pub shutdown_requested: bool,
    /// Current tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Elapsed wall-clock seconds since start.
    pub elapsed_seconds: u64,
    /// Configured maximum ticks (0 = unlimited).
    pub max_ticks: u64,
    /// Configured maximum real-time seconds (0 = unlimited).
    pub max_real_time_seconds: u64,
    /// The reason the run ended, if applicable.
    pub end_reason: Option<SimulationEndReason>,
    /// RFC 3339 timestamp of when the run started.
    pub started_at: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vivarium_types::CellKind;

    use super::*;

    fn unbounded() -> SimulationBoundsConfig {
        SimulationBoundsConfig::default()
    }

    #[test]
    fn initial_state_is_running() {
        let state = OperatorState::new(16, &unbounded());
        assert!(state.is_running());
        assert!(!state.is_shutdown_requested());
    }

    #[test]
    fn stop_and_start_are_idempotent() {
        let state = OperatorState::new(16, &unbounded());
        assert!(state.stop());
        assert!(!state.stop());
        assert!(!state.is_running());
        assert!(state.start());
        assert!(!state.start());
        assert!(state.is_running());
    }

    #[test]
    fn set_tick_interval() {
        let state = OperatorState::new(16, &unbounded());
        assert_eq!(state.set_tick_interval_ms(0), Some(16));
        assert_eq!(state.tick_interval_ms(), 0);
        assert_eq!(state.set_tick_interval_ms(MAX_TICK_INTERVAL_MS + 1), None);
        assert_eq!(state.tick_interval_ms(), 0);
    }

    #[test]
    fn tick_limit_zero_means_unlimited() {
        let state = OperatorState::new(16, &unbounded());
        assert!(!state.tick_limit_reached(999_999));
        assert!(!state.time_limit_reached());
    }

    #[test]
    fn tick_limit_reached() {
        let bounds = SimulationBoundsConfig {
            max_ticks: 100,
            max_real_time_seconds: 0,
        };
        let state = OperatorState::new(16, &bounds);
        assert!(!state.tick_limit_reached(99));
        assert!(state.tick_limit_reached(100));
    }

    #[tokio::test]
    async fn shutdown_wakes_a_stopped_loop() {
        let state = OperatorState::new(16, &unbounded());
        state.stop();
        state.request_shutdown();
        state.wait_until_running().await;
        assert!(state.is_shutdown_requested());
    }

    #[tokio::test]
    async fn queue_and_drain_commands() {
        let state = OperatorState::new(16, &unbounded());
        state.queue_command(OperatorCommand::ClearFood).await;
        state
            .queue_command(OperatorCommand::Inject {
                plan: GrowthPlan::single(CellKind::Producer),
                col: 2,
                row: 3,
            })
            .await;
        let commands = state.drain_commands().await;
        assert_eq!(commands.len(), 2);
        assert_eq!(commands.first(), Some(&OperatorCommand::ClearFood));
        assert!(state.drain_commands().await.is_empty());
    }

    #[tokio::test]
    async fn status_reports_control_state() {
        let state = OperatorState::new(16, &unbounded());
        state.stop();
        state.set_end_reason(SimulationEndReason::Extinction).await;
        let world = WorldStatus {
            tick: 4,
            elapsed_ms: 64,
            population: 0,
            species_count: 0,
            reset_count: 1,
        };
        let status = state.status(world.clone()).await;
        assert_eq!(status.world, world);
        assert!(!status.running);
        assert_eq!(status.end_reason, Some(SimulationEndReason::Extinction));
    }
}

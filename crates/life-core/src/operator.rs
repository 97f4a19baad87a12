//! Operator control state shared between the controller and the runner.
//!
//! The controller (the driver's command handler) never touches the engine.
//! It flips flags and queues [`Command`]s on an [`OperatorState`], and the
//! runner task, the engine's only owner, picks them up.
//!
//! # Architecture
//!
//! Control flags use [`std::sync::atomic`] types so the runner can read them
//! without locking. Queued commands sit behind a [`tokio::sync::Mutex`].
//! A single [`Notify`] wakes the runner whenever anything changes; because
//! `Notify` stores a permit when nobody is waiting, no wake-up is lost.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify};

use crate::grid::Grid;

/// Reason the runner returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The operator asked the runner to stop.
    OperatorStop,
    /// The configured `max_generations` was reached.
    MaxGenerationsReached,
}

/// An engine operation queued for the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Advance exactly one generation.
    Step,
    /// Flip one cell.
    ToggleCell {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
    },
    /// Rebuild the grid with its current dimensions.
    Clear,
    /// Create a new grid with the given dimensions.
    Resize {
        /// New number of columns.
        cells_x: usize,
        /// New number of rows.
        cells_y: usize,
    },
    /// Install a prepared grid.
    Load(Grid),
}

/// Shared control block.
///
/// Wrapped in [`Arc`](std::sync::Arc) and shared between the runner and
/// whatever drives it.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether auto-advance is stopped.
    paused: AtomicBool,

    /// Wakes the runner when a flag changes or a command is queued.
    signal: Notify,

    /// Whether the runner should return.
    stop_requested: AtomicBool,

    /// Milliseconds between generations while playing.
    delay_ms: AtomicU64,

    /// Wall-clock time the operator state was created.
    started_at: DateTime<Utc>,

    /// Stop after this many generations (0 = unlimited).
    max_generations: u64,

    /// Commands waiting for the runner.
    commands: Mutex<Vec<Command>>,

    /// Why the runner returned, once it has.
    end_reason: Mutex<Option<EndReason>>,
}

impl OperatorState {
    /// Create operator state. The game starts paused.
    ///
    /// A zero `delay_ms` is raised to 1.
    pub fn new(delay_ms: u64, max_generations: u64) -> Self {
        Self {
            paused: AtomicBool::new(true),
            signal: Notify::new(),
            stop_requested: AtomicBool::new(false),
            delay_ms: AtomicU64::new(delay_ms.max(1)),
            started_at: Utc::now(),
            max_generations,
            commands: Mutex::new(Vec::new()),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Play / Pause
    // -----------------------------------------------------------------------

    /// Whether auto-advance is stopped.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Whether auto-advance is running.
    pub fn is_running(&self) -> bool {
        !self.is_paused()
    }

    /// Stop auto-advance.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        self.signal.notify_one();
    }

    /// Start auto-advance.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.signal.notify_one();
    }

    /// Flip between playing and paused. Returns `true` if now running.
    pub fn toggle(&self) -> bool {
        let was_paused = self.paused.fetch_xor(true, Ordering::AcqRel);
        self.signal.notify_one();
        was_paused
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Ask the runner to return.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.signal.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record why the runner returned.
    pub async fn set_end_reason(&self, reason: EndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Why the runner returned, if it has.
    pub async fn end_reason(&self) -> Option<EndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Delay
    // -----------------------------------------------------------------------

    /// Current delay between generations in milliseconds.
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms.load(Ordering::Acquire)
    }

    /// Change the delay between generations.
    ///
    /// Returns the previous delay, or `None` if `ms` is zero. A running
    /// timer is restarted with the new delay.
    pub fn set_delay_ms(&self, ms: u64) -> Option<u64> {
        if ms == 0 {
            return None;
        }
        let prev = self.delay_ms.swap(ms, Ordering::AcqRel);
        if prev != ms {
            self.signal.notify_one();
        }
        Some(prev)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Whether `generation` has reached the configured limit.
    ///
    /// Always `false` when `max_generations` is 0.
    pub const fn generation_limit_reached(&self, generation: u64) -> bool {
        self.max_generations > 0 && generation >= self.max_generations
    }

    /// Configured generation limit (0 = unlimited).
    pub const fn max_generations(&self) -> u64 {
        self.max_generations
    }

    /// Wall-clock creation time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds elapsed since creation.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queue a command and wake the runner.
    pub async fn enqueue(&self, command: Command) {
        self.commands.lock().await.push(command);
        self.signal.notify_one();
    }

    /// Take every queued command, oldest first.
    pub async fn drain_commands(&self) -> Vec<Command> {
        let mut queue = self.commands.lock().await;
        std::mem::take(&mut *queue)
    }

    // -----------------------------------------------------------------------
    // Waiting
    // -----------------------------------------------------------------------

    /// Wait until anything changes.
    pub async fn wait_for_signal(&self) {
        self.signal.notified().await;
    }

    /// Sleep for `delay_ms`, waking early on any signal.
    ///
    /// Returns `true` if the full delay elapsed.
    pub async fn sleep_or_signal(&self, delay_ms: u64) -> bool {
        tokio::select! {
            () = tokio::time::sleep(Duration::from_millis(delay_ms)) => true,
            () = self.signal.notified() => false,
        }
    }
}

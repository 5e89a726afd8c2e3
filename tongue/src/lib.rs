#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tongue state for the Anteater engine.
//!
//! The [`Tongue`] owns the occupied [`GridPath`] and drives it through the
//! extend, loop, capture and retract lifecycle one tick at a time. Entity
//! positions are never stored: the game loop passes an [`EntityView`] into
//! every tick so captures are evaluated against the caller's own snapshot.

mod config;

use anteater_core::{
    CaptureEvent, Command, Direction, EntityId, EntityView, Event, ExtendOutcome, GridCoord,
    GridPath, HaltReason, LoopResult, Point, TongueState,
};
use anteater_system_boundary_tracing::{self as boundary_tracing, BoundaryTracer};
use anteater_system_capture::{touching_tongue, CaptureRegion};
use anteater_system_loop_detection::LoopDetector;

pub use config::{Config, ConfigError};

/// What a single tick did, beyond the resulting state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickStep {
    /// Nothing to do while idle.
    Idle,
    /// The move timer has not elapsed yet.
    Cooldown,
    /// The head moved into a new cell.
    Advanced {
        /// Previous head cell.
        from: GridCoord,
        /// New head cell.
        to: GridCoord,
    },
    /// Extension stopped and retraction began.
    Halted {
        /// Why the extension stopped.
        reason: HaltReason,
    },
    /// A loop closed and its capture countdown started.
    LoopFormed {
        /// Distance from the head to the revisited cell.
        at_index: usize,
        /// Number of distinct cells in the loop.
        cell_count: usize,
        /// Entities inside the capture region on this tick.
        trapped: Vec<EntityId>,
    },
    /// A loop closed around nothing and was dropped; the tongue retracts.
    LoopReleased {
        /// Distance from the head to the revisited cell.
        at_index: usize,
        /// Number of distinct cells in the loop.
        cell_count: usize,
    },
    /// The capture countdown is still running.
    Countdown {
        /// Ticks left before the capture fires.
        remaining: u32,
    },
    /// The capture fired; see [`TickOutcome::capture`].
    Captured,
    /// The head cell was removed.
    Retracted {
        /// Cell that was removed.
        removed: GridCoord,
    },
    /// Only the anchor remains and the tongue is idle again.
    FullyRetracted,
}

/// Result of [`Tongue::advance_tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    /// State after the tick.
    pub state: TongueState,
    /// What happened during the tick.
    pub step: TickStep,
    /// Present only on the tick that leaves the loop-active state.
    pub capture: Option<CaptureEvent>,
}

#[derive(Clone, Debug)]
struct ActiveLoop {
    result: LoopResult,
    region: CaptureRegion,
    trapped: Vec<EntityId>,
    countdown: u32,
}

#[derive(Clone, Debug)]
enum Phase {
    Idle,
    Extending,
    LoopActive(ActiveLoop),
    Retracting,
}

/// Grid-based tongue that loops around and captures entities.
#[derive(Clone, Debug)]
pub struct Tongue {
    config: Config,
    path: GridPath,
    phase: Phase,
    direction: Direction,
    next_direction: Direction,
    move_timer: u32,
    detector: LoopDetector,
    tracer: BoundaryTracer,
}

impl Default for Tongue {
    fn default() -> Self {
        Self::from_validated(Config::default())
    }
}

impl Tongue {
    /// Creates an idle tongue at the configured anchor.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: Config) -> Self {
        let path = GridPath::new(config.anchor, config.bounds(), config.max_segments);
        let tracer = BoundaryTracer::new(boundary_tracing::Config::new(
            config.cell_size,
            config.min_loop_area,
        ));
        Self {
            path,
            phase: Phase::Idle,
            direction: config.default_direction,
            next_direction: config.default_direction,
            move_timer: 0,
            detector: LoopDetector::new(),
            tracer,
            config,
        }
    }

    /// Configuration the tongue was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TongueState {
        match self.phase {
            Phase::Idle => TongueState::Idle,
            Phase::Extending => TongueState::Extending,
            Phase::LoopActive(_) => TongueState::LoopActive,
            Phase::Retracting => TongueState::Retracting,
        }
    }

    /// Heading applied on the most recent head move.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Heading that will be applied on the next head move.
    #[must_use]
    pub const fn next_direction(&self) -> Direction {
        self.next_direction
    }

    /// Read-only view of the occupied path.
    #[must_use]
    pub const fn path(&self) -> &GridPath {
        &self.path
    }

    /// Occupied cells in head-first order.
    #[must_use]
    pub fn occupied_cells(&self) -> Vec<GridCoord> {
        self.path.cells()
    }

    /// Loop isolated by the most recent self-intersection, while it is active.
    #[must_use]
    pub fn loop_result(&self) -> Option<&LoopResult> {
        self.active_loop().map(|active| &active.result)
    }

    /// Region used for captures, while a loop is active.
    #[must_use]
    pub fn capture_region(&self) -> Option<&CaptureRegion> {
        self.active_loop().map(|active| &active.region)
    }

    /// Ticks left before the active loop captures.
    #[must_use]
    pub fn capture_countdown(&self) -> Option<u32> {
        self.active_loop().map(|active| active.countdown)
    }

    /// Entities that were inside the region when the active loop closed.
    #[must_use]
    pub fn trapped(&self) -> &[EntityId] {
        self.active_loop()
            .map(|active| active.trapped.as_slice())
            .unwrap_or_default()
    }

    /// Starts extending from idle, or resumes extending while retracting.
    ///
    /// Returns `false` when the request was ignored.
    pub fn begin_extend(&mut self) -> bool {
        match self.phase {
            Phase::Idle => {
                self.move_timer = 0;
                self.phase = Phase::Extending;
                true
            }
            Phase::Retracting => {
                self.phase = Phase::Extending;
                true
            }
            Phase::Extending | Phase::LoopActive(_) => false,
        }
    }

    /// Stops extending and starts retracting.
    ///
    /// Returns `false` when the tongue was not extending.
    pub fn end_extend(&mut self) -> bool {
        if matches!(self.phase, Phase::Extending) {
            self.phase = Phase::Retracting;
            true
        } else {
            false
        }
    }

    /// Buffers a turn for the next head move.
    ///
    /// A reversal of the current heading is ignored and `false` is returned.
    pub fn set_next_direction(&mut self, direction: Direction) -> bool {
        if self.direction.reverses(direction) {
            return false;
        }
        self.next_direction = direction;
        true
    }

    /// Returns to an idle tongue at the anchor, discarding any loop.
    pub fn reset(&mut self) {
        self.return_to_anchor();
        tracing::info!("tongue reset");
    }

    fn return_to_anchor(&mut self) {
        self.path.reset();
        self.phase = Phase::Idle;
        self.direction = self.config.default_direction;
        self.next_direction = self.config.default_direction;
        self.move_timer = 0;
    }

    /// Batched membership test against the active capture region.
    ///
    /// Every answer is `false` when no loop is active.
    #[must_use]
    pub fn test_capture(&self, points: &[Point]) -> Vec<bool> {
        match self.capture_region() {
            Some(region) => region.contains_all(points),
            None => vec![false; points.len()],
        }
    }

    /// Entities whose bounding box overlaps an occupied tongue cell.
    #[must_use]
    pub fn touching(&self, entities: &EntityView) -> Vec<EntityId> {
        touching_tongue(&self.path.cells(), self.config.cell_size, entities)
    }

    /// Drives the mechanic forward by one logical tick.
    pub fn advance_tick(&mut self, entities: &EntityView) -> TickOutcome {
        let (step, capture) = match self.phase {
            Phase::Idle => (TickStep::Idle, None),
            Phase::Extending => (self.tick_extending(entities), None),
            Phase::LoopActive(_) => self.tick_loop_active(entities),
            Phase::Retracting => (self.tick_retracting(), None),
        };
        TickOutcome {
            state: self.state(),
            step,
            capture,
        }
    }

    fn active_loop(&self) -> Option<&ActiveLoop> {
        match &self.phase {
            Phase::LoopActive(active) => Some(active),
            Phase::Idle | Phase::Extending | Phase::Retracting => None,
        }
    }

    fn move_timer_elapsed(&mut self) -> bool {
        self.move_timer = self.move_timer.saturating_add(1);
        if self.move_timer < self.config.move_cooldown {
            return false;
        }
        self.move_timer = 0;
        true
    }

    fn tick_extending(&mut self, entities: &EntityView) -> TickStep {
        if !self.move_timer_elapsed() {
            return TickStep::Cooldown;
        }

        self.direction = self.next_direction;
        let from = self.path.head();
        let to = from.step(self.direction);
        match self.path.extend_head(to) {
            ExtendOutcome::Extended => {
                tracing::debug!(?from, ?to, length = self.path.len(), "tongue advanced");
                TickStep::Advanced { from, to }
            }
            ExtendOutcome::OutOfBounds => self.halt(HaltReason::OutOfBounds),
            ExtendOutcome::MaxLengthReached => self.halt(HaltReason::MaxLengthReached),
            ExtendOutcome::SelfIntersected { at_index } => self.close_loop(at_index, entities),
        }
    }

    fn halt(&mut self, reason: HaltReason) -> TickStep {
        tracing::debug!(?reason, length = self.path.len(), "tongue extension halted");
        self.phase = Phase::Retracting;
        TickStep::Halted { reason }
    }

    fn close_loop(&mut self, at_index: usize, entities: &EntityView) -> TickStep {
        let result = self.detector.detect(&self.path, at_index);
        let cell_count = result.loop_cells().len();
        let region = CaptureRegion::new(self.tracer.trace(result.loop_cells()));
        let trapped = region.entities_inside(entities);
        tracing::info!(
            at_index,
            cell_count,
            polygon = ?region.polygon().kind(),
            trapped = trapped.len(),
            "tongue closed a loop"
        );

        if trapped.is_empty() && self.config.release_empty_loops {
            self.phase = Phase::Retracting;
            return TickStep::LoopReleased {
                at_index,
                cell_count,
            };
        }

        self.phase = Phase::LoopActive(ActiveLoop {
            result,
            region,
            trapped: trapped.clone(),
            countdown: self.config.capture_delay,
        });
        TickStep::LoopFormed {
            at_index,
            cell_count,
            trapped,
        }
    }

    fn tick_loop_active(&mut self, entities: &EntityView) -> (TickStep, Option<CaptureEvent>) {
        let remaining = match &mut self.phase {
            Phase::LoopActive(active) => {
                active.countdown = active.countdown.saturating_sub(1);
                active.countdown
            }
            Phase::Idle | Phase::Extending | Phase::Retracting => return (TickStep::Idle, None),
        };
        if remaining > 0 {
            return (TickStep::Countdown { remaining }, None);
        }

        let Phase::LoopActive(active) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return (TickStep::Idle, None);
        };
        let captured = active.region.entities_inside(entities);
        let capture = CaptureEvent {
            polygon: active.region.into_polygon(),
            captured,
        };
        tracing::info!(captured = capture.captured.len(), "capture countdown elapsed");
        self.return_to_anchor();
        (TickStep::Captured, Some(capture))
    }

    fn tick_retracting(&mut self) -> TickStep {
        if !self.move_timer_elapsed() {
            return TickStep::Cooldown;
        }

        let removed = self.path.head();
        if self.path.retract_head() {
            tracing::debug!(?removed, length = self.path.len(), "tongue retracted");
            return TickStep::Retracted { removed };
        }

        self.phase = Phase::Idle;
        self.direction = self.config.default_direction;
        self.next_direction = self.config.default_direction;
        self.move_timer = 0;
        tracing::debug!("tongue fully retracted");
        TickStep::FullyRetracted
    }
}

/// Applies the provided command to the tongue, reporting what happened.
pub fn apply(
    tongue: &mut Tongue,
    command: Command,
    entities: &EntityView,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::BeginExtend => {
            if tongue.begin_extend() {
                out_events.push(Event::ExtendStarted);
            }
        }
        Command::EndExtend => {
            if tongue.end_extend() {
                out_events.push(Event::ExtensionHalted {
                    reason: HaltReason::Released,
                });
            }
        }
        Command::SetNextDirection { direction } => {
            if !tongue.set_next_direction(direction) {
                out_events.push(Event::DirectionRejected {
                    requested: direction,
                });
            }
        }
        Command::Reset => {
            tongue.reset();
            out_events.push(Event::ResetPerformed);
        }
        Command::Tick => {
            let outcome = tongue.advance_tick(entities);
            match outcome.step {
                TickStep::Idle | TickStep::Cooldown | TickStep::Countdown { .. } => {}
                TickStep::Advanced { from, to } => {
                    out_events.push(Event::HeadAdvanced { from, to });
                }
                TickStep::Halted { reason } => {
                    out_events.push(Event::ExtensionHalted { reason });
                }
                TickStep::LoopFormed {
                    at_index,
                    cell_count,
                    trapped,
                } => {
                    out_events.push(Event::LoopFormed {
                        at_index,
                        cell_count,
                        trapped,
                    });
                }
                TickStep::LoopReleased {
                    at_index,
                    cell_count,
                } => {
                    out_events.push(Event::LoopFormed {
                        at_index,
                        cell_count,
                        trapped: Vec::new(),
                    });
                    out_events.push(Event::LoopReleased);
                }
                TickStep::Captured => {
                    if let Some(capture) = outcome.capture {
                        out_events.push(Event::Captured(capture));
                    }
                }
                TickStep::Retracted { removed } => {
                    out_events.push(Event::HeadRetracted { removed });
                }
                TickStep::FullyRetracted => out_events.push(Event::FullyRetracted),
            }
        }
    }
}

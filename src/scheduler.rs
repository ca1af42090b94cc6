//! Action queue and scheduler.
//!
//! ## State machine (per action)
//!
//! ```text
//! enqueue ──► Pending ──(dequeue)──► Running ──(choreography done)──► Done
//!                                       │
//!                                       └── interrupt() ──────────────► Done (Interrupted)
//! ```
//!
//! At most one action is `Running`. A move or interact resolves its
//! direction when it is dequeued, from the facing the player has at that
//! moment, then plans its whole playback up front. `tick` keeps feeding the
//! frame delta to the running playback and starts the next action as soon
//! as one finishes, carrying leftover time over.

use crate::action::{Action, ActionOutcome, ActionReport, Heading};
use crate::animation::{Advance, Choreography, Effect, EffectSink, Tween};
use crate::config::{MotionConfig, RulePolicy};
use crate::grid::{BlockStates, GridRegistry};
use crate::interaction;
use crate::movement::simulate_move;
use crate::player::Player;
use crate::protocol::GameEvent;
use crate::types::{GridSpacing, Pose};
use log::{debug, info, warn};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Draining,
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Everything an action touches while it plans and plays back.
pub struct Stage<'a> {
    pub grid: &'a GridRegistry,
    pub block_states: &'a mut BlockStates,
    pub player: &'a mut Player,
    pub spacing: GridSpacing,
    pub motion: &'a MotionConfig,
    pub rules: &'a RulePolicy,
    pub events: &'a mut Vec<GameEvent>,
    level_complete: bool,
}

impl<'a> Stage<'a> {
    pub fn new(
        grid: &'a GridRegistry,
        block_states: &'a mut BlockStates,
        player: &'a mut Player,
        spacing: GridSpacing,
        motion: &'a MotionConfig,
        rules: &'a RulePolicy,
        events: &'a mut Vec<GameEvent>,
    ) -> Self {
        Self {
            grid,
            block_states,
            player,
            spacing,
            motion,
            rules,
            events,
            level_complete: false,
        }
    }

    fn take_level_complete(&mut self) -> bool {
        std::mem::take(&mut self.level_complete)
    }
}

impl EffectSink for Stage<'_> {
    fn pose_mut(&mut self) -> &mut Pose {
        &mut self.player.pose
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SyncCell => {
                let cell = self.player.sync_cell(&self.spacing);
                debug!("Player now at {}", cell);
            }
            Effect::ToggleBlock(cell) => {
                let on = self.block_states.toggle(cell);
                info!("Block {} {}", cell, if on { "activated" } else { "deactivated" });
            }
            Effect::CompleteLevel => {
                info!("Level complete");
                self.level_complete = true;
                self.events.push(GameEvent::LevelPass);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

struct Running {
    seq: u64,
    action: Action,
    outcome: ActionOutcome,
    plan: Choreography,
    won: bool,
}

#[derive(Default)]
pub struct Scheduler {
    queue: VecDeque<Action>,
    running: Option<Running>,
    next_seq: u64,
    completed: u64,
    reports: Vec<ActionReport>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the back of the queue. Never preempts the running action.
    pub fn enqueue(&mut self, action: Action) {
        debug!("Enqueued {} ({} pending)", action.label(), self.queue.len() + 1);
        self.queue.push_back(action);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_actions(&self) -> impl Iterator<Item = &Action> {
        self.queue.iter()
    }

    pub fn in_flight(&self) -> Option<&Action> {
        self.running.as_ref().map(|r| &r.action)
    }

    /// Number of actions that reached `Done`.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn state(&self) -> SchedulerState {
        if self.running.is_none() && self.queue.is_empty() {
            SchedulerState::Idle
        } else {
            SchedulerState::Draining
        }
    }

    /// Reports for every action finished since the last call.
    pub fn drain_reports(&mut self) -> Vec<ActionReport> {
        std::mem::take(&mut self.reports)
    }

    /// Drop every pending action, leaving the running one alone.
    pub fn clear_pending(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    /// Abandon the running action where it stands and drop the queue.
    pub fn interrupt(&mut self) -> usize {
        let dropped = self.clear_pending();
        if let Some(running) = self.running.take() {
            info!("Interrupted {} #{}", running.action.label(), running.seq);
            self.finish(Running {
                outcome: ActionOutcome::Interrupted,
                ..running
            });
        }
        dropped
    }

    /// Advance by `dt` seconds, running as many actions as the time allows.
    pub fn tick(&mut self, stage: &mut Stage<'_>, dt: f32) -> SchedulerState {
        let mut dt = dt.max(0.0);

        loop {
            if self.running.is_none() {
                let Some(action) = self.queue.pop_front() else {
                    break;
                };
                let started = self.start(action, stage);
                self.running = Some(started);
            }

            let Some(running) = self.running.as_mut() else {
                break;
            };
            let advance = running.plan.advance(stage, dt);

            if stage.take_level_complete() {
                running.won = true;
                self.drop_after_win();
            }

            match advance {
                Advance::Running => break,
                Advance::Finished { leftover } => {
                    dt = leftover;
                    if let Some(done) = self.running.take() {
                        // anything queued while the win played out is dropped too
                        if done.won {
                            self.drop_after_win();
                        }
                        self.finish(done);
                    }
                }
            }
        }

        self.state()
    }

    fn drop_after_win(&mut self) {
        let dropped = self.clear_pending();
        if dropped > 0 {
            info!("Win cleared {} pending action(s)", dropped);
        }
    }

    fn finish(&mut self, done: Running) {
        debug!("Finished {} #{}: {:?}", done.action.label(), done.seq, done.outcome);
        self.completed += 1;
        self.reports.push(ActionReport {
            seq: done.seq,
            action: done.action,
            outcome: done.outcome,
        });
    }

    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    fn start(&mut self, action: Action, stage: &mut Stage<'_>) -> Running {
        self.next_seq += 1;
        let seq = self.next_seq;

        let (outcome, plan) = match &action {
            Action::Move {
                heading,
                distance,
                speed,
            } => plan_move(stage, *heading, *distance, *speed),
            Action::Rotate { turn } => {
                let from = stage.player.pose.yaw;
                let delta = turn.degrees();
                (
                    ActionOutcome::Turned { yaw: from + delta },
                    Choreography::new().tween(Tween::turn(from, delta, stage.motion.turn_speed)),
                )
            }
            Action::Interact => plan_interact(stage),
        };

        if let ActionOutcome::Rejected { reason } = &outcome {
            warn!("Skipping {} #{}: {}", action.label(), seq, reason);
        }

        Running {
            seq,
            action,
            outcome,
            plan,
            won: false,
        }
    }
}

fn rejected(reason: &str) -> (ActionOutcome, Choreography) {
    (
        ActionOutcome::Rejected {
            reason: reason.to_string(),
        },
        Choreography::new(),
    )
}

fn plan_move(
    stage: &Stage<'_>,
    heading: Heading,
    distance: u32,
    speed: f32,
) -> (ActionOutcome, Choreography) {
    let Some(direction) = heading.resolve(stage.player.facing()) else {
        return rejected("direction is not axis-aligned");
    };

    let speed = if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        warn!("Move speed {} is not positive, using 1.0", speed);
        1.0
    };

    let motion = simulate_move(
        stage.grid,
        stage.player.cell(),
        direction,
        distance,
        stage.rules,
    );

    let start = stage.player.pose.position;
    let target = start + stage.spacing.offset(direction, motion.travelled as i32);

    let mut plan = Choreography::new()
        .tween(Tween::translate(
            start,
            target,
            speed * stage.motion.move_speed_scale,
        ))
        .effect(Effect::SyncCell);

    if !motion.is_completed() {
        let m = stage.motion;
        let nudge = target + direction.unit() * m.bounce_distance;
        plan = plan
            .tween(Tween::translate_for(target, nudge, m.bounce_duration))
            .tween(Tween::translate_for(nudge, target, m.bounce_duration))
            .effect(Effect::SyncCell);
    }

    (ActionOutcome::Moved { motion }, plan)
}

fn plan_interact(stage: &Stage<'_>) -> (ActionOutcome, Choreography) {
    let Some(facing) = stage.player.facing() else {
        return rejected("facing is not axis-aligned");
    };

    let target = stage.player.cell().neighbour(facing);
    let branch = interaction::classify(stage.grid.kind_at(target), stage.rules);
    debug!("Interact with {} → {:?}", target, branch);

    let plan = interaction::choreograph(
        branch,
        target,
        stage.player.pose,
        stage.motion,
        stage.rules,
    );
    (ActionOutcome::Interacted { branch }, plan)
}

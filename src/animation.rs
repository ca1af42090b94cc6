//! Animator: eased, tick-driven interpolation of the player pose.
//!
//! A [`Tween`] is one position or yaw segment. A [`Choreography`] strings
//! tweens, fixed waits and synchronous [`Effect`]s together into the full
//! playback of one action. Every call to [`Choreography::advance`] consumes
//! a frame delta and reports either that it is still running or how much of
//! the delta was left over once it finished, so callers can hand the
//! remainder to whatever runs next within the same tick.

use crate::types::{CellCoord, Pose, Vec3};
use std::collections::VecDeque;

/// Hermite ease in/out (`3t² − 2t³`), clamped to `[0, 1]`.
pub fn smoothstep(t: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    t * t * (3.0 - 2.0 * t)
}

/// Result of advancing a segment by one frame delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    Running,
    Finished { leftover: f32 },
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Channel {
    Position { from: Vec3, to: Vec3 },
    Yaw { from: f32, to: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    channel: Channel,
    duration: f32,
    elapsed: f32,
}

/// Durations that cannot be waited out collapse to an immediate snap.
fn sanitize_duration(duration: f32) -> f32 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

impl Tween {
    /// Translation whose duration is `distance / speed`.
    pub fn translate(from: Vec3, to: Vec3, speed: f32) -> Self {
        Self::translate_for(from, to, from.distance(to) / speed)
    }

    /// Translation over a fixed duration, regardless of distance.
    pub fn translate_for(from: Vec3, to: Vec3, duration: f32) -> Self {
        Self {
            channel: Channel::Position { from, to },
            duration: sanitize_duration(duration),
            elapsed: 0.0,
        }
    }

    /// Rotation by `delta` degrees; duration is `|delta| / (speed × 100)`.
    pub fn turn(from_yaw: f32, delta: f32, speed: f32) -> Self {
        Self {
            channel: Channel::Yaw {
                from: from_yaw,
                to: from_yaw + delta,
            },
            duration: sanitize_duration(delta.abs() / (speed * 100.0)),
            elapsed: 0.0,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Eased progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            smoothstep(self.elapsed / self.duration)
        }
    }

    /// Advance by `dt` seconds and write the interpolated value into `pose`.
    /// The finishing tick snaps exactly onto the target.
    pub fn advance(&mut self, pose: &mut Pose, dt: f32) -> Advance {
        let remaining = self.duration - self.elapsed;
        let dt = dt.max(0.0);

        if dt >= remaining {
            self.elapsed = self.duration;
            self.apply_target(pose);
            return Advance::Finished {
                leftover: dt - remaining,
            };
        }

        self.elapsed += dt;
        let t = self.progress();
        match self.channel {
            Channel::Position { from, to } => pose.position = from.lerp(to, t),
            Channel::Yaw { from, to } => pose.yaw = from + (to - from) * t,
        }
        Advance::Running
    }

    fn apply_target(&self, pose: &mut Pose) {
        match self.channel {
            Channel::Position { to, .. } => pose.position = to,
            Channel::Yaw { to, .. } => pose.yaw = to,
        }
    }
}

// ---------------------------------------------------------------------------
// Choreography
// ---------------------------------------------------------------------------

/// Synchronous side effect fired when playback reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Re-derive the player cell from its position.
    SyncCell,
    /// Flip the persistent activation of an interactable block.
    ToggleBlock(CellCoord),
    /// Drop every pending action and announce the level as passed.
    CompleteLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Tween(Tween),
    Wait { remaining: f32 },
    Effect(Effect),
}

/// Receives the effects a choreography fires while advancing.
pub trait EffectSink {
    fn pose_mut(&mut self) -> &mut Pose;
    fn apply(&mut self, effect: Effect);
}

/// Ordered playback of one action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Choreography {
    steps: VecDeque<Step>,
}

impl Choreography {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: Step) -> Self {
        self.steps.push_back(step);
        self
    }

    pub fn tween(self, tween: Tween) -> Self {
        self.then(Step::Tween(tween))
    }

    pub fn wait(self, seconds: f32) -> Self {
        self.then(Step::Wait {
            remaining: sanitize_duration(seconds),
        })
    }

    pub fn effect(self, effect: Effect) -> Self {
        self.then(Step::Effect(effect))
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total playback time still ahead, in seconds.
    pub fn remaining_time(&self) -> f32 {
        self.steps
            .iter()
            .map(|s| match s {
                Step::Tween(t) => t.duration - t.elapsed,
                Step::Wait { remaining } => *remaining,
                Step::Effect(_) => 0.0,
            })
            .sum()
    }

    /// Run steps until one needs more time than `dt` provides.
    pub fn advance(&mut self, sink: &mut dyn EffectSink, dt: f32) -> Advance {
        let mut dt = dt.max(0.0);

        while let Some(step) = self.steps.front_mut() {
            match step {
                Step::Tween(tween) => match tween.advance(sink.pose_mut(), dt) {
                    Advance::Running => return Advance::Running,
                    Advance::Finished { leftover } => dt = leftover,
                },
                Step::Wait { remaining } => {
                    if dt < *remaining {
                        *remaining -= dt;
                        return Advance::Running;
                    }
                    dt -= *remaining;
                }
                Step::Effect(effect) => sink.apply(*effect),
            }
            self.steps.pop_front();
        }

        Advance::Finished { leftover: dt }
    }
}

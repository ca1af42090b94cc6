//! Interaction state machine: classify the cell ahead of the player and
//! build the animated branch that answers an interact action.
//!
//! | Cell ahead                         | Branch   | Playback                                  |
//! |------------------------------------|----------|-------------------------------------------|
//! | empty, `Static`                    | `Fail`   | shake: −a, +2a, −a                        |
//! | `Interactable` (activator/obstacle)| `Toggle` | flourish, then optional persistent toggle |
//! | `Interactable` (goal), `Finish`    | `Win`    | lift, flourish, descend, complete level   |

use crate::animation::{Choreography, Effect, Tween};
use crate::config::{InteractableRole, MotionConfig, RulePolicy};
use crate::grid::BlockKind;
use crate::types::{CellCoord, Pose, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionBranch {
    Fail,
    Toggle,
    Win,
}

/// Pick the branch for the block (if any) in front of the player.
pub fn classify(kind: Option<BlockKind>, rules: &RulePolicy) -> InteractionBranch {
    match kind {
        None | Some(BlockKind::Static) => InteractionBranch::Fail,
        Some(BlockKind::Interactable) => match rules.interactable_role {
            InteractableRole::Goal => InteractionBranch::Win,
            InteractableRole::Activator | InteractableRole::Obstacle => InteractionBranch::Toggle,
        },
        Some(BlockKind::Finish) => InteractionBranch::Win,
    }
}

/// Build the playback for `branch`, starting from `pose`.
pub fn choreograph(
    branch: InteractionBranch,
    target: CellCoord,
    pose: Pose,
    motion: &MotionConfig,
    rules: &RulePolicy,
) -> Choreography {
    let plan = match branch {
        InteractionBranch::Fail => shake(pose.yaw, motion),
        InteractionBranch::Toggle => {
            let plan = flourish(Choreography::new(), pose.yaw, motion);
            if rules.persist_activation {
                plan.effect(Effect::ToggleBlock(target))
            } else {
                plan
            }
        }
        InteractionBranch::Win => {
            let ground = pose.position;
            let lifted = ground + Vec3::new(0.0, motion.levitate_height, 0.0);
            let plan = Choreography::new().tween(Tween::translate_for(
                ground,
                lifted,
                motion.levitate_duration,
            ));
            flourish(plan, pose.yaw, motion)
                .tween(Tween::translate_for(lifted, ground, motion.levitate_duration))
                .effect(Effect::CompleteLevel)
        }
    };

    plan.wait(motion.interact_settle)
}

fn shake(yaw: f32, motion: &MotionConfig) -> Choreography {
    let a = motion.shake_angle;
    let s = motion.shake_speed;
    Choreography::new()
        .tween(Tween::turn(yaw, -a, s))
        .tween(Tween::turn(yaw - a, 2.0 * a, s))
        .tween(Tween::turn(yaw + a, -a, s))
}

fn flourish(mut plan: Choreography, yaw: f32, motion: &MotionConfig) -> Choreography {
    let mut at = yaw;
    for _ in 0..motion.flourish_turns {
        plan = plan.tween(Tween::turn(at, motion.flourish_angle, motion.flourish_speed));
        at += motion.flourish_angle;
    }
    plan
}

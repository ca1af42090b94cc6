//! Interaction state machine tests

#[cfg(test)]
mod tests {
    use cubewalk::animation::{Effect, EffectSink};
    use cubewalk::config::{InteractableRole, MotionConfig, RulePolicy};
    use cubewalk::grid::BlockKind;
    use cubewalk::interaction::{choreograph, classify, InteractionBranch};
    use cubewalk::types::{CellCoord, Pose, Vec3};

    const EPS: f32 = 1e-4;

    #[derive(Default)]
    struct Recorder {
        pose: Pose,
        effects: Vec<Effect>,
        lowest_yaw: f32,
        highest_y: f32,
    }

    impl EffectSink for Recorder {
        fn pose_mut(&mut self) -> &mut Pose {
            &mut self.pose
        }

        fn apply(&mut self, effect: Effect) {
            self.effects.push(effect);
        }
    }

    /// Play `branch` to the end in small steps, tracking extremes.
    fn play(branch: InteractionBranch, rules: &RulePolicy) -> Recorder {
        let motion = MotionConfig::default();
        let start = Pose::new(Vec3::new(1.1, 0.0, 0.0), 90.0);
        let mut plan = choreograph(branch, CellCoord::new(2, 0, 0), start, &motion, rules);
        let mut sink = Recorder {
            pose: start,
            lowest_yaw: start.yaw,
            highest_y: start.position.y,
            ..Recorder::default()
        };

        for _ in 0..10_000 {
            let done = !matches!(
                plan.advance(&mut sink, 0.01),
                cubewalk::animation::Advance::Running
            );
            sink.lowest_yaw = sink.lowest_yaw.min(sink.pose.yaw);
            sink.highest_y = sink.highest_y.max(sink.pose.position.y);
            if done {
                break;
            }
        }
        assert!(plan.is_finished());
        sink
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    #[test]
    fn empty_and_static_cells_fail() {
        let rules = RulePolicy::default();
        assert_eq!(classify(None, &rules), InteractionBranch::Fail);
        assert_eq!(classify(Some(BlockKind::Static), &rules), InteractionBranch::Fail);
    }

    #[test]
    fn finish_always_wins() {
        for role in [
            InteractableRole::Activator,
            InteractableRole::Obstacle,
            InteractableRole::Goal,
        ] {
            let rules = RulePolicy {
                interactable_role: role,
                ..RulePolicy::default()
            };
            assert_eq!(classify(Some(BlockKind::Finish), &rules), InteractionBranch::Win);
        }
    }

    #[test]
    fn interactable_branch_follows_role() {
        let role = |interactable_role| RulePolicy {
            interactable_role,
            ..RulePolicy::default()
        };
        let kind = Some(BlockKind::Interactable);
        assert_eq!(classify(kind, &role(InteractableRole::Activator)), InteractionBranch::Toggle);
        assert_eq!(classify(kind, &role(InteractableRole::Obstacle)), InteractionBranch::Toggle);
        assert_eq!(classify(kind, &role(InteractableRole::Goal)), InteractionBranch::Win);
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    #[test]
    fn fail_shakes_and_returns_to_start_yaw() {
        let sink = play(InteractionBranch::Fail, &RulePolicy::default());
        assert_eq!(sink.pose.yaw, 90.0);
        assert!((sink.lowest_yaw - 75.0).abs() < EPS);
        assert!(sink.effects.is_empty());
    }

    #[test]
    fn toggle_spins_a_full_turn_without_side_effects_by_default() {
        let sink = play(InteractionBranch::Toggle, &RulePolicy::default());
        assert_eq!(sink.pose.yaw, 90.0 + 360.0);
        assert_eq!(sink.pose.position, Vec3::new(1.1, 0.0, 0.0));
        assert!(sink.effects.is_empty());
    }

    #[test]
    fn toggle_persists_when_configured() {
        let rules = RulePolicy {
            persist_activation: true,
            ..RulePolicy::default()
        };
        let sink = play(InteractionBranch::Toggle, &rules);
        assert_eq!(sink.effects, vec![Effect::ToggleBlock(CellCoord::new(2, 0, 0))]);
    }

    #[test]
    fn win_lifts_spins_lands_then_completes() {
        let sink = play(InteractionBranch::Win, &RulePolicy::default());
        assert!((sink.highest_y - 0.5).abs() < EPS);
        assert_eq!(sink.pose.position, Vec3::new(1.1, 0.0, 0.0));
        assert_eq!(sink.effects, vec![Effect::CompleteLevel]);
    }

    #[test]
    fn win_playback_length() {
        let motion = MotionConfig::default();
        let plan = choreograph(
            InteractionBranch::Win,
            CellCoord::new(0, 0, 1),
            Pose::default(),
            &motion,
            &RulePolicy::default(),
        );
        // 0.5 up, 3 × 0.4 spinning, 0.5 down
        assert!((plan.remaining_time() - 2.2).abs() < EPS);
    }

    #[test]
    fn settle_pause_is_appended() {
        let motion = MotionConfig {
            interact_settle: 0.25,
            ..MotionConfig::default()
        };
        let plan = choreograph(
            InteractionBranch::Fail,
            CellCoord::new(0, 0, 1),
            Pose::default(),
            &motion,
            &RulePolicy::default(),
        );
        // 0.15 + 0.3 + 0.15 shaking, then the pause
        assert!((plan.remaining_time() - 0.85).abs() < EPS);
    }
}

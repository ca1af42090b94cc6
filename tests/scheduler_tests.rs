//! Action queue / scheduler tests

#[cfg(test)]
mod tests {
    use cubewalk::action::{Action, ActionOutcome, ActionReport, Heading, Turn};
    use cubewalk::config::{MotionConfig, RulePolicy};
    use cubewalk::grid::{Block, BlockKind, BlockStates, GridRegistry};
    use cubewalk::interaction::InteractionBranch;
    use cubewalk::movement::MotionReason;
    use cubewalk::player::Player;
    use cubewalk::protocol::GameEvent;
    use cubewalk::scheduler::{Scheduler, SchedulerState, Stage};
    use cubewalk::types::{CellCoord, Direction, GridSpacing, Pose, Vec3};

    /// Everything a `Stage` borrows.
    struct Fixture {
        grid: GridRegistry,
        states: BlockStates,
        player: Player,
        motion: MotionConfig,
        rules: RulePolicy,
        events: Vec<GameEvent>,
        scheduler: Scheduler,
    }

    impl Fixture {
        /// A 5×5 floor at y = -1 with the player at the origin facing +z.
        fn new() -> Self {
            let spacing = GridSpacing::default();
            let grid = (0..5)
                .flat_map(|x| (0..5).map(move |z| CellCoord::new(x, -1, z)))
                .map(|c| Block::new(c, BlockKind::Static, spacing.world_of(c)))
                .collect();
            Self {
                grid,
                states: BlockStates::new(),
                player: Player::spawn(Pose::default(), &spacing),
                motion: MotionConfig::default(),
                rules: RulePolicy::default(),
                events: Vec::new(),
                scheduler: Scheduler::new(),
            }
        }

        fn place(mut self, kind: BlockKind, cell: CellCoord) -> Self {
            let position = GridSpacing::default().world_of(cell);
            self.grid.insert(Block::new(cell, kind, position)).unwrap();
            self
        }

        fn tick(&mut self, dt: f32) -> SchedulerState {
            let mut stage = Stage::new(
                &self.grid,
                &mut self.states,
                &mut self.player,
                GridSpacing::default(),
                &self.motion,
                &self.rules,
                &mut self.events,
            );
            self.scheduler.tick(&mut stage, dt)
        }

        fn settle(&mut self) -> Vec<ActionReport> {
            assert_eq!(self.tick(f32::INFINITY), SchedulerState::Idle);
            self.scheduler.drain_reports()
        }
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-4
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    #[test]
    fn idle_until_something_is_queued() {
        let mut fx = Fixture::new();
        assert_eq!(fx.scheduler.state(), SchedulerState::Idle);
        assert_eq!(fx.tick(1.0), SchedulerState::Idle);
        assert!(fx.scheduler.drain_reports().is_empty());
    }

    #[test]
    fn actions_run_in_fifo_order() {
        let mut fx = Fixture::new();
        fx.scheduler.enqueue(Action::forward(1, 1.0));
        fx.scheduler.enqueue(Action::turn(Turn::Right));
        fx.scheduler.enqueue(Action::forward(2, 1.0));

        let reports = fx.settle();
        let seqs: Vec<u64> = reports.iter().map(|r| r.seq).collect();
        let labels: Vec<&str> = reports.iter().map(|r| r.action.label()).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(labels, vec!["move", "rotate", "move"]);
        assert_eq!(fx.player.cell(), CellCoord::new(2, 0, 1));
        assert_eq!(fx.scheduler.completed(), 3);
    }

    #[test]
    fn enqueue_while_draining_appends_behind() {
        let mut fx = Fixture::new();
        fx.scheduler.enqueue(Action::forward(1, 1.0));
        assert_eq!(fx.tick(0.1), SchedulerState::Draining);
        assert!(fx.scheduler.in_flight().is_some());

        fx.scheduler.enqueue(Action::turn(Turn::Left));
        fx.scheduler.enqueue(Action::Interact);
        assert_eq!(fx.scheduler.pending(), 2);

        let labels: Vec<&str> = fx.settle().iter().map(|r| r.action.label()).collect();
        assert_eq!(labels, vec!["move", "rotate", "interact"]);
    }

    #[test]
    fn one_action_at_a_time() {
        let mut fx = Fixture::new();
        fx.scheduler.enqueue(Action::forward(3, 1.0));
        fx.scheduler.enqueue(Action::forward(1, 1.0));

        fx.tick(0.5);
        assert_eq!(fx.scheduler.pending(), 1);
        assert!(fx.scheduler.drain_reports().is_empty());
        // still between cells: cell only updates when the move lands
        assert_eq!(fx.player.cell(), CellCoord::new(0, 0, 0));
    }

    #[test]
    fn relative_moves_resolve_facing_when_dequeued() {
        let mut fx = Fixture::new();
        // both queued before anything runs; the move must see the turn
        fx.scheduler.enqueue(Action::turn(Turn::Right));
        fx.scheduler.enqueue(Action::forward(1, 1.0));
        fx.settle();
        assert_eq!(fx.player.facing(), Some(Direction::Right));
        assert_eq!(fx.player.cell(), CellCoord::new(1, 0, 0));
    }

    #[test]
    fn leftover_time_starts_the_next_action_in_the_same_tick() {
        let mut fx = Fixture::new();
        fx.scheduler.enqueue(Action::turn(Turn::Right)); // 0.45 s
        fx.scheduler.enqueue(Action::turn(Turn::Right)); // 0.45 s
        fx.tick(0.5);
        assert_eq!(fx.scheduler.drain_reports().len(), 1);
        assert!(fx.player.pose.yaw > 90.0);
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    #[test]
    fn move_lands_on_the_lattice() {
        let mut fx = Fixture::new();
        fx.scheduler.enqueue(Action::forward(3, 2.0));
        let reports = fx.settle();

        match &reports[0].outcome {
            ActionOutcome::Moved { motion } => {
                assert_eq!(motion.reason, MotionReason::Completed);
                assert_eq!(motion.reached_cell, CellCoord::new(0, 0, 3));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(approx(fx.player.pose.position, Vec3::new(0.0, 0.0, 3.3)));
    }

    #[test]
    fn blocked_move_bounces_back_to_the_truncated_target() {
        let mut fx = Fixture::new().place(BlockKind::Static, CellCoord::new(0, 0, 2));
        fx.scheduler.enqueue(Action::forward(4, 1.0));

        // run until the truncated target is reached, then into the bounce
        let travel = 1.1 / 1.5;
        fx.tick(travel + 0.25);
        assert!(fx.player.pose.position.z > 1.1 + 0.2);

        let reports = fx.settle();
        assert!(matches!(
            &reports[0].outcome,
            ActionOutcome::Moved { motion } if motion.reason == MotionReason::BlockedByObstacle
        ));
        assert!(approx(fx.player.pose.position, Vec3::new(0.0, 0.0, 1.1)));
        assert_eq!(fx.player.cell(), CellCoord::new(0, 0, 1));
    }

    #[test]
    fn off_axis_vector_is_rejected_and_queue_continues() {
        let mut fx = Fixture::new();
        fx.scheduler.enqueue(Action::Move {
            heading: Heading::Vector(Vec3::new(1.0, 0.0, 1.0)),
            distance: 1,
            speed: 1.0,
        });
        fx.scheduler.enqueue(Action::toward(Direction::Right, 1, 1.0));

        let reports = fx.settle();
        assert!(matches!(reports[0].outcome, ActionOutcome::Rejected { .. }));
        assert!(matches!(reports[1].outcome, ActionOutcome::Moved { .. }));
        assert_eq!(fx.player.cell(), CellCoord::new(1, 0, 0));
    }

    #[test]
    fn non_positive_speed_falls_back_to_default() {
        let mut fx = Fixture::new();
        fx.scheduler.enqueue(Action::forward(1, 0.0));
        let reports = fx.settle();
        assert!(matches!(reports[0].outcome, ActionOutcome::Moved { .. }));
        assert_eq!(fx.player.cell(), CellCoord::new(0, 0, 1));
    }

    // -----------------------------------------------------------------------
    // Interact
    // -----------------------------------------------------------------------

    #[test]
    fn interact_mid_turn_is_rejected() {
        let mut fx = Fixture::new();
        fx.player.pose.yaw = 45.0;
        fx.scheduler.enqueue(Action::Interact);
        let reports = fx.settle();
        assert!(matches!(reports[0].outcome, ActionOutcome::Rejected { .. }));
    }

    #[test]
    fn win_emits_level_pass_once_and_clears_the_queue() {
        let mut fx = Fixture::new().place(BlockKind::Finish, CellCoord::new(0, 0, 1));
        fx.scheduler.enqueue(Action::Interact);
        fx.scheduler.enqueue(Action::turn(Turn::Right));
        fx.scheduler.enqueue(Action::Interact);

        // actions queued during the win playback are dropped too
        fx.tick(0.1);
        fx.scheduler.enqueue(Action::forward(1, 1.0));

        let reports = fx.settle();
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].outcome,
            ActionOutcome::Interacted {
                branch: InteractionBranch::Win
            }
        );
        assert_eq!(fx.events, vec![GameEvent::LevelPass]);
        assert_eq!(fx.scheduler.pending(), 0);
    }

    #[test]
    fn actions_queued_during_the_win_settle_are_dropped() {
        let mut fx = Fixture::new().place(BlockKind::Finish, CellCoord::new(0, 0, 1));
        fx.motion.interact_settle = 1.0;
        fx.scheduler.enqueue(Action::Interact);

        // level is complete but the win is still settling
        fx.tick(2.5);
        assert_eq!(fx.events, vec![GameEvent::LevelPass]);
        assert!(fx.scheduler.in_flight().is_some());

        fx.scheduler.enqueue(Action::turn(Turn::Right));
        fx.tick(0.75);

        assert_eq!(fx.scheduler.drain_reports().len(), 1);
        assert!(fx.scheduler.in_flight().is_none());
        assert_eq!(fx.scheduler.pending(), 0);
    }

    #[test]
    fn persistent_toggle_flips_block_state() {
        let mut fx = Fixture::new().place(BlockKind::Interactable, CellCoord::new(0, 0, 1));
        fx.rules.persist_activation = true;

        fx.scheduler.enqueue(Action::Interact);
        fx.settle();
        assert!(fx.states.is_activated(CellCoord::new(0, 0, 1)));

        fx.scheduler.enqueue(Action::Interact);
        fx.settle();
        assert!(!fx.states.is_activated(CellCoord::new(0, 0, 1)));
        assert!(fx.events.is_empty());
    }

    // -----------------------------------------------------------------------
    // Interrupt
    // -----------------------------------------------------------------------

    #[test]
    fn interrupt_reports_in_flight_and_drops_pending() {
        let mut fx = Fixture::new();
        fx.scheduler.enqueue(Action::forward(3, 1.0));
        fx.scheduler.enqueue(Action::Interact);
        fx.tick(0.2);

        assert_eq!(fx.scheduler.interrupt(), 1);
        let reports = fx.scheduler.drain_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, ActionOutcome::Interrupted);
        assert_eq!(fx.scheduler.state(), SchedulerState::Idle);
    }
}

//! Configuration loading tests

#[cfg(test)]
mod tests {
    use cubewalk::config::{GameConfig, InteractableRole, RulePolicy, SpecialStop};
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cubewalk-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_match_the_reference_tuning() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.spacing.horizontal, 1.1);
        assert_eq!(cfg.spacing.vertical, 1.0);
        assert_eq!(cfg.motion.move_speed_scale, 1.5);
        assert_eq!(cfg.motion.turn_speed, 2.0);
        assert_eq!(cfg.motion.flourish_turns, 3);
        assert_eq!(cfg.rules, RulePolicy::default());
        assert_eq!(cfg.rules.interactable_role, InteractableRole::Activator);
        assert_eq!(cfg.rules.special_stop, SpecialStop::Before);
        assert!(!cfg.rules.persist_activation);
        assert_eq!(cfg.start_level, 1);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let path = write_temp(
            "override.toml",
            r#"
start_level = 3

[motion]
bounce_distance = 0.5

[rules]
interactable_role = "goal"
special_stop = "at"
"#,
        );

        let cfg = GameConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(cfg.start_level, 3);
        assert_eq!(cfg.motion.bounce_distance, 0.5);
        // untouched keys keep their defaults
        assert_eq!(cfg.motion.bounce_duration, 0.25);
        assert_eq!(cfg.rules.interactable_role, InteractableRole::Goal);
        assert_eq!(cfg.rules.special_stop, SpecialStop::At);
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("cubewalk-does-not-exist.toml");
        assert!(GameConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn environment_overrides_nested_keys() {
        // only keys no other test asserts on through `load`
        std::env::set_var("CUBEWALK_TICK_RATE_HZ", "30");
        std::env::set_var("CUBEWALK_MOTION__LEVITATE_HEIGHT", "2");

        let cfg = GameConfig::load(None).unwrap();

        std::env::remove_var("CUBEWALK_TICK_RATE_HZ");
        std::env::remove_var("CUBEWALK_MOTION__LEVITATE_HEIGHT");

        assert_eq!(cfg.tick_rate_hz, 30.0);
        assert_eq!(cfg.motion.levitate_height, 2.0);
    }
}

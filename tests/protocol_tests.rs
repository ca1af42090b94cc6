//! Host protocol and bridge tests

#[cfg(test)]
mod tests {
    use cubewalk::action::{Action, Heading, Turn};
    use cubewalk::bridge::{BridgeError, HostBridge, MemoryTransport};
    use cubewalk::protocol::{decode, GameEvent, HostCommand, InboundMessage, OutboundMessage};
    use cubewalk::types::RelativeDirection;
    use serde_json::{json, Value};

    fn command(raw: &str) -> Option<HostCommand> {
        decode(raw).expect("message should parse")
    }

    fn parsed(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    #[test]
    fn forward_with_string_args() {
        let cmd = command(r#"{"action":"forward","args":{"distance":"2","speed":"1.0"}}"#);
        assert_eq!(
            cmd,
            Some(HostCommand::Enqueue(Action::Move {
                heading: Heading::Relative(RelativeDirection::Forward),
                distance: 2,
                speed: 1.0,
            }))
        );
    }

    #[test]
    fn numeric_args_are_accepted() {
        let cmd = command(r#"{"action":"left","args":{"distance":3,"speed":2.5}}"#);
        assert_eq!(
            cmd,
            Some(HostCommand::Enqueue(Action::Move {
                heading: Heading::Relative(RelativeDirection::Left),
                distance: 3,
                speed: 2.5,
            }))
        );
    }

    #[test]
    fn missing_args_use_defaults() {
        let cmd = command(r#"{"action":"back"}"#);
        assert_eq!(
            cmd,
            Some(HostCommand::Enqueue(Action::Move {
                heading: Heading::Relative(RelativeDirection::Back),
                distance: 1,
                speed: 1.0,
            }))
        );
    }

    #[test]
    fn bad_arg_values_degrade_to_defaults() {
        let cmd = command(r#"{"action":"right","args":{"distance":"far","speed":"-3"}}"#);
        assert_eq!(
            cmd,
            Some(HostCommand::Enqueue(Action::Move {
                heading: Heading::Relative(RelativeDirection::Right),
                distance: 1,
                speed: 1.0,
            }))
        );

        let fractional = command(r#"{"action":"forward","args":{"distance":1.5}}"#);
        assert!(matches!(
            fractional,
            Some(HostCommand::Enqueue(Action::Move { distance: 1, .. }))
        ));
    }

    #[test]
    fn turns_interact_and_level_commands() {
        assert_eq!(
            command(r#"{"action":"turn_left"}"#),
            Some(HostCommand::Enqueue(Action::turn(Turn::Left)))
        );
        assert_eq!(
            command(r#"{"action":"turn_right","args":{}}"#),
            Some(HostCommand::Enqueue(Action::turn(Turn::Right)))
        );
        assert_eq!(
            command(r#"{"action":"interact"}"#),
            Some(HostCommand::Enqueue(Action::Interact))
        );
        assert_eq!(
            command(r#"{"action":"setLevel","args":{"levelId":"3"}}"#),
            Some(HostCommand::SetLevel(3))
        );
        assert_eq!(
            command(r#"{"action":"restartLevel"}"#),
            Some(HostCommand::RestartLevel)
        );
    }

    #[test]
    fn set_level_without_id_restarts() {
        assert_eq!(
            command(r#"{"action":"setLevel","args":{}}"#),
            Some(HostCommand::RestartLevel)
        );
    }

    #[test]
    fn unknown_action_is_ignored() {
        assert_eq!(command(r#"{"action":"jump","args":{"height":"2"}}"#), None);
    }

    #[test]
    fn malformed_json_fails_the_message() {
        assert!(matches!(decode("{\"action\":"), Err(BridgeError::Malformed(_))));
    }

    #[test]
    fn missing_or_non_string_action_fails_the_message() {
        assert!(matches!(decode(r#"{"args":{}}"#), Err(BridgeError::MissingAction)));
        assert!(matches!(decode(r#"{"action":7}"#), Err(BridgeError::MissingAction)));
        assert!(matches!(decode(r#"["forward"]"#), Err(BridgeError::MissingAction)));
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    #[test]
    fn level_pass_has_null_args() {
        let json = GameEvent::LevelPass.to_message().to_json().unwrap();
        assert_eq!(parsed(&json), json!({ "action": "levelPass", "args": null }));
    }

    #[test]
    fn set_data_tags_value_type() {
        let msg = GameEvent::set_data("levelId", 4).to_message();
        assert_eq!(
            msg.args,
            Some(json!({
                "variableName": "levelId",
                "variableValue": 4,
                "variableType": "int",
            }))
        );

        let hash = GameEvent::set_data("levelHash", "abc");
        assert!(matches!(hash, GameEvent::SetData { ref kind, .. } if kind == "string"));
        let ratio = GameEvent::set_data("ratio", 0.5);
        assert!(matches!(ratio, GameEvent::SetData { ref kind, .. } if kind == "float"));
    }

    #[test]
    fn outbound_envelope_reads_back_inbound() {
        let out = GameEvent::set_data("levelId", 2).to_message();
        let inbound = InboundMessage::parse(&out.to_json().unwrap()).unwrap();

        assert_eq!(inbound.action, out.action);
        let out_args = out.args.unwrap();
        let out_keys: Vec<&String> = out_args.as_object().unwrap().keys().collect();
        let in_keys: Vec<&String> = inbound.args.keys().collect();
        assert_eq!(in_keys, out_keys);
    }

    #[test]
    fn outbound_message_deserializes() {
        let msg: OutboundMessage = serde_json::from_str(r#"{"action":"ready","args":null}"#).unwrap();
        assert_eq!(msg, GameEvent::Ready.to_message());
    }

    // -----------------------------------------------------------------------
    // Bridge
    // -----------------------------------------------------------------------

    #[test]
    fn attach_announces_ready_once() {
        let transport = MemoryTransport::new();
        let bridge = HostBridge::attach(transport.clone()).unwrap();
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(parsed(&transport.sent()[0]), json!({ "action": "ready", "args": null }));

        bridge.publish_all(&[GameEvent::LevelPass]);
        let sent = transport.take();
        assert_eq!(sent.len(), 2);
        assert_eq!(parsed(&sent[1])["action"], "levelPass");
    }

    #[test]
    fn attach_fails_without_a_host() {
        let result = HostBridge::attach(MemoryTransport::unavailable());
        assert!(matches!(result, Err(BridgeError::Unavailable(_))));
    }

    #[test]
    fn receive_drops_bad_messages() {
        let bridge = HostBridge::attach(MemoryTransport::new()).unwrap();
        assert_eq!(bridge.receive("not json"), None);
        assert_eq!(bridge.receive(r#"{"nope":1}"#), None);
        assert_eq!(
            bridge.receive(r#"{"action":"interact"}"#),
            Some(HostCommand::Enqueue(Action::Interact))
        );
    }
}

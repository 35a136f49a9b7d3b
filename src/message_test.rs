use super::*;

// =============================================================================
// WIRE FORMAT
// =============================================================================

#[test]
fn handshake_uses_literal_wire_names() {
    let msg = LinkMessage::handshake(ClientRole::Esp32Device, Some("ai-simulator-001"));
    let json = serde_json::to_string(&msg).expect("serialize");

    assert!(json.contains(r#""type":"handshake""#));
    assert!(json.contains(r#""clientType":"esp32_device""#));
    assert!(json.contains(r#""deviceId":"ai-simulator-001""#));
}

#[test]
fn panel_handshake_omits_device_id() {
    let msg = LinkMessage::handshake(ClientRole::ControlPanel, None);
    let json = serde_json::to_string(&msg).expect("serialize");

    assert!(json.contains(r#""clientType":"control_panel""#));
    assert!(!json.contains("deviceId"));
    assert!(!json.contains("data"));
}

#[test]
fn status_payload_uses_camel_case_names() {
    let status = AiStatus {
        online: true,
        talking: false,
        wifi_signal: -45,
        uptime: 120,
        last_message: "hello".into(),
    };
    let json = serde_json::to_string(&LinkMessage::status(&status)).expect("serialize");

    assert!(json.contains(r#""type":"ai_status""#));
    assert!(json.contains(r#""wifiSignal":-45"#));
    assert!(json.contains(r#""lastMessage":"hello""#));
    assert!(json.contains(r#""uptime":120"#));
}

#[test]
fn heartbeat_round_trip() {
    let hb = Heartbeat { device_id: "ai-simulator-001".into(), uptime: 15, wifi_signal: -48 };
    let json = serde_json::to_string(&LinkMessage::heartbeat(&hb)).expect("serialize");
    let restored: LinkMessage = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored.kind, MessageKind::Heartbeat);
    assert_eq!(restored.heartbeat_data().expect("payload"), hb);
}

#[test]
fn conversation_roles_serialize_lowercase() {
    let msg = ConversationMessage { role: Role::Assistant, text: "hi".into(), timestamp: Some(42) };
    let json = serde_json::to_string(&LinkMessage::conversation(&msg)).expect("serialize");

    assert!(json.contains(r#""role":"assistant""#));
    assert!(json.contains(r#""timestamp":42"#));
}

#[test]
fn conversation_timestamp_is_optional_on_the_wire() {
    let parsed: LinkMessage =
        serde_json::from_str(r#"{"type":"ai_conversation","data":{"role":"user","text":"hey"}}"#)
            .expect("deserialize");
    let utterance = parsed.conversation_data().expect("payload");

    assert_eq!(utterance.role, Role::User);
    assert_eq!(utterance.text, "hey");
    assert!(utterance.timestamp.is_none());
}

// =============================================================================
// UNKNOWN INPUT
// =============================================================================

#[test]
fn unknown_type_parses_to_unknown_kind() {
    let parsed: LinkMessage =
        serde_json::from_str(r#"{"type":"factory_reset","data":{}}"#).expect("deserialize");
    assert_eq!(parsed.kind, MessageKind::Unknown);
}

#[test]
fn unknown_client_type_parses_to_unknown_role() {
    let parsed: LinkMessage =
        serde_json::from_str(r#"{"type":"handshake","clientType":"toaster"}"#).expect("deserialize");
    assert_eq!(parsed.kind, MessageKind::Handshake);
    assert_eq!(parsed.client_type, Some(ClientRole::Unknown));
}

#[test]
fn payload_access_on_wrong_shape_returns_none() {
    let parsed: LinkMessage =
        serde_json::from_str(r#"{"type":"ai_status","data":{"online":"not-a-bool"}}"#)
            .expect("deserialize");
    assert!(parsed.status_data().is_none());
}

#[test]
fn missing_data_returns_none() {
    let msg = LinkMessage::handshake(ClientRole::ControlPanel, None);
    assert!(msg.status_data().is_none());
}

// =============================================================================
// HELPERS
// =============================================================================

#[test]
fn handshake_ack_carries_empty_data() {
    let msg = LinkMessage::handshake_ack();
    assert_eq!(msg.kind, MessageKind::HandshakeAck);
    assert_eq!(msg.data, Some(serde_json::json!({})));
}

#[test]
fn config_passes_payload_through_verbatim() {
    let config = serde_json::json!({"volume": 80, "wake_word": "hey watch"});
    let msg = LinkMessage::config(config.clone());
    assert_eq!(msg.data, Some(config));
}

#[test]
fn default_status_is_offline_and_silent() {
    let status = AiStatus::default();
    assert!(!status.online);
    assert!(!status.talking);
    assert_eq!(status.wifi_signal, 0);
    assert_eq!(status.uptime, 0);
    assert!(status.last_message.is_empty());
}

#[test]
fn now_ms_is_positive() {
    assert!(now_ms() > 0);
}

use super::*;

fn decode_frame(text: &str) -> Frame {
    match decode_message(text).expect("decode should succeed") {
        Inbound::Frame(frame) => frame,
        other => panic!("expected frame, got {other:?}"),
    }
}

#[test]
fn decodes_full_frame() {
    let frame = decode_frame(
        r#"{"t":42,"rid":"A","p":[{"id":1,"x":1.5,"y":-2.0,"l":true}],"m":[{"id":9,"x":3,"y":4}],"pr":[{"x":0.5,"y":0.25}]}"#,
    );
    assert_eq!(frame.tick, 42);
    assert_eq!(frame.room_id, Some(RoomId::new("A")));
    assert_eq!(
        frame.players,
        Some(vec![Player { id: EntityId::Int(1), x: 1.5, y: -2.0, facing: Facing::Left }])
    );
    assert_eq!(frame.monsters, Some(vec![Entity { id: Some(EntityId::Int(9)), x: 3.0, y: 4.0 }]));
    assert_eq!(frame.projectiles, Some(vec![Entity { id: None, x: 0.5, y: 0.25 }]));
}

#[test]
fn missing_layers_are_absent_not_empty() {
    let frame = decode_frame(r#"{"t":3}"#);
    assert_eq!(frame.players, None);
    assert_eq!(frame.monsters, None);
    assert_eq!(frame.projectiles, None);
    assert_eq!(frame.room_id, None);
    assert!(frame.players().is_empty());
}

#[test]
fn empty_object_is_a_frame_at_tick_zero() {
    let frame = decode_frame("{}");
    assert_eq!(frame, Frame::default());
}

#[test]
fn null_fields_are_absent() {
    let frame = decode_frame(r#"{"t":null,"rid":null,"p":null}"#);
    assert_eq!(frame.tick, 0);
    assert_eq!(frame.room_id, None);
    assert_eq!(frame.players, None);
}

#[test]
fn unknown_fields_are_ignored() {
    let frame = decode_frame(r#"{"t":1,"extra":{"nested":true}}"#);
    assert_eq!(frame.tick, 1);
}

#[test]
fn facing_flag_follows_truthiness() {
    let frame = decode_frame(
        r#"{"p":[
            {"id":1,"x":0,"y":0},
            {"id":2,"x":0,"y":0,"l":null},
            {"id":3,"x":0,"y":0,"l":false},
            {"id":4,"x":0,"y":0,"l":0},
            {"id":5,"x":0,"y":0,"l":1},
            {"id":6,"x":0,"y":0,"l":""},
            {"id":7,"x":0,"y":0,"l":"yes"}
        ]}"#,
    );
    let facings: Vec<Facing> = frame.players().iter().map(|p| p.facing).collect();
    assert_eq!(
        facings,
        vec![
            Facing::Unknown,
            Facing::Unknown,
            Facing::Right,
            Facing::Right,
            Facing::Left,
            Facing::Right,
            Facing::Left,
        ]
    );
}

#[test]
fn reset_with_room() {
    let inbound = decode_message(r#"{"reset":true,"roomId":"A"}"#).expect("decode");
    assert_eq!(inbound, Inbound::Reset { room_id: Some(RoomId::new("A")) });
}

#[test]
fn reset_without_room() {
    let inbound = decode_message(r#"{"reset":true}"#).expect("decode");
    assert_eq!(inbound, Inbound::Reset { room_id: None });
}

#[test]
fn falsy_reset_flag_decodes_as_frame() {
    let inbound = decode_message(r#"{"reset":false,"t":5}"#).expect("decode");
    assert!(matches!(inbound, Inbound::Frame(Frame { tick: 5, .. })));
}

#[test]
fn numeric_room_ids_normalize_to_strings() {
    let frame = decode_frame(r#"{"rid":7}"#);
    assert_eq!(frame.room_id, Some(RoomId::new("7")));
    assert_eq!(frame.room_id.map(|r| r.to_string()), Some("7".to_owned()));
}

#[test]
fn string_entity_ids_are_kept_verbatim() {
    let frame = decode_frame(r#"{"p":[{"id":"alice","x":0,"y":0}]}"#);
    assert_eq!(frame.players()[0].id, EntityId::from("alice"));
    assert_eq!(frame.players()[0].id.to_string(), "alice");
}

#[test]
fn malformed_json_is_an_error() {
    let err = decode_message("{not json").expect_err("should fail");
    assert!(matches!(err, DecodeError::Json(_)));
}

#[test]
fn non_object_payload_decodes_as_absent_frame() {
    for text in ["42", r#""hello""#, "[1,2,3]", "null", "true"] {
        let inbound = decode_message(text).expect("decode");
        assert_eq!(inbound, Inbound::Frame(Frame::default()), "payload {text}");
    }
}

#[test]
fn arrays_never_decode_positionally() {
    let reset_like = decode_message(r#"[true, "B"]"#).expect("decode");
    assert_eq!(reset_like, Inbound::Frame(Frame::default()));

    let frame_like = decode_message(r#"[null, null, 7, "A", [{"id":1,"x":0,"y":0}]]"#).expect("decode");
    assert_eq!(frame_like, Inbound::Frame(Frame::default()));
}

#[test]
fn wrong_field_type_drops_only_that_field() {
    let frame = decode_frame(r#"{"t":3,"rid":"A","pr":"x","m":[]}"#);
    assert_eq!(frame.tick, 3);
    assert_eq!(frame.room_id, Some(RoomId::new("A")));
    assert_eq!(frame.projectiles, None);
    assert_eq!(frame.monsters, Some(Vec::new()));

    let frame = decode_frame(r#"{"t":"abc","rid":"A"}"#);
    assert_eq!(frame.tick, 0);
    assert_eq!(frame.room_id, Some(RoomId::new("A")));
}

#[test]
fn bad_entity_drops_its_layer() {
    let frame = decode_frame(r#"{"p":[{"id":1,"x":"left","y":0}],"m":{"id":1}}"#);
    assert_eq!(frame.players, None);
    assert_eq!(frame.monsters, None);
}

#[test]
fn wrong_typed_reset_room_is_absent() {
    let inbound = decode_message(r#"{"reset":true,"roomId":[1]}"#).expect("decode");
    assert_eq!(inbound, Inbound::Reset { room_id: None });
}

#[test]
fn empty_frame_has_present_empty_layers() {
    let frame = Frame::empty(Some(RoomId::new("B")));
    assert_eq!(frame.tick, 0);
    assert_eq!(frame.players, Some(Vec::new()));
    assert_eq!(frame.monsters, Some(Vec::new()));
    assert_eq!(frame.projectiles, Some(Vec::new()));
    assert!(!frame.has_players());
}

#[test]
fn decode_error_message_is_descriptive() {
    let err = decode_message("nope").expect_err("should fail");
    assert!(err.to_string().starts_with("failed to decode message"));
}

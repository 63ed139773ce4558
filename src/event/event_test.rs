use serde_json::json;

use super::*;

#[test]
fn test_raw_message_payload_wire_format() -> Result<()> {
    let event = DataChannelEvent::ReceiveRawMessage(RawMessagePayload {
        tag: "abc".to_owned(),
        connection_id: 7,
    });

    assert_eq!(event.name(), "dataChannelReceiveRawMessage");
    assert_eq!(event.to_json()?, json!({"tag": "abc", "connectionId": 7}));

    Ok(())
}

#[test]
fn test_message_payload_wire_format() -> Result<()> {
    let event = DataChannelEvent::ReceiveMessage(MessagePayload {
        tag: "abc".to_owned(),
        connection_id: 1,
        message_type: MessageType::Binary,
        data: "AQID".to_owned(),
    });

    assert_eq!(event.name(), "dataChannelReceiveMessage");
    assert_eq!(
        event.to_json()?,
        json!({"tag": "abc", "connectionId": 1, "type": "binary", "data": "AQID"})
    );

    Ok(())
}

#[test]
fn test_state_changed_payload_wire_format() -> Result<()> {
    let tests = vec![
        (Some(DataChannelState::Connecting), json!("connecting")),
        (Some(DataChannelState::Open), json!("open")),
        (Some(DataChannelState::Closing), json!("closing")),
        (Some(DataChannelState::Closed), json!("closed")),
        (None, serde_json::Value::Null),
    ];

    for (state, expected) in tests {
        let event = DataChannelEvent::StateChanged(StateChangedPayload {
            tag: "t".to_owned(),
            connection_id: 3,
            id: 9,
            state,
        });

        assert_eq!(event.name(), "dataChannelStateChanged");
        assert_eq!(
            event.to_json()?,
            json!({"tag": "t", "connectionId": 3, "id": 9, "state": expected})
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_unbounded_sender_sink() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let event = DataChannelEvent::ReceiveRawMessage(RawMessagePayload {
        tag: "x".to_owned(),
        connection_id: 0,
    });

    tx.send_event(event.clone());
    assert_eq!(rx.recv().await, Some(event.clone()));

    // a closed receiver only drops the event
    drop(rx);
    tx.send_event(event);
}

//! Integration tests for the relay-core public API.
//!
//! These tests drive the codec, the gesture translator, the audio encoder and
//! endpoint parsing together, the way the device and host use them.

use relay_core::{
    decode_audio_payload, decode_frame, encode_chunk, encode_command, ConnectionEndpoint,
    EndpointError, GestureTranslator, KeyName, MouseButton, RelayCommand, ScrollDirection,
};

fn roundtrip(cmd: RelayCommand) -> RelayCommand {
    let frame = encode_command(&cmd).expect("encode must succeed");
    decode_frame(&frame).expect("decode must succeed")
}

#[test]
fn test_every_command_variant_round_trips() {
    let commands = vec![
        RelayCommand::MouseMove { dx: 1, dy: -1 },
        RelayCommand::MouseClick {
            button: MouseButton::Left,
        },
        RelayCommand::MouseClick {
            button: MouseButton::Right,
        },
        RelayCommand::MouseScroll {
            direction: ScrollDirection::Up,
        },
        RelayCommand::MouseScroll {
            direction: ScrollDirection::Down,
        },
        RelayCommand::TextType {
            text: "hello".to_string(),
        },
        RelayCommand::AudioChunk {
            data: encode_chunk(&[0, 1, -1, i16::MIN, i16::MAX]).expect("non-empty chunk"),
        },
    ];

    for original in commands {
        assert_eq!(roundtrip(original.clone()), original);
    }
}

#[test]
fn test_every_key_in_vocabulary_round_trips() {
    for key in KeyName::ALL {
        let original = RelayCommand::KeyPress { key };
        assert_eq!(roundtrip(original.clone()), original);
    }
}

#[test]
fn test_gesture_stream_produces_wire_frames() {
    // Arrange
    let mut gesture = GestureTranslator::default();
    let samples = [(10.0, 10.0), (12.0, 11.0), (12.5, 10.0)];

    // Act
    let frames: Vec<String> = samples
        .iter()
        .filter_map(|(x, y)| gesture.on_move(*x, *y))
        .map(|cmd| encode_command(&cmd).expect("encode must succeed"))
        .collect();

    // Assert
    assert_eq!(
        frames,
        vec![
            r#"{"type":"mouse_move","dx":4,"dy":2}"#.to_string(),
            r#"{"type":"mouse_move","dx":1,"dy":-2}"#.to_string(),
        ]
    );
}

#[test]
fn test_audio_chunk_payload_decodes_to_pcm_bytes() {
    let samples: Vec<i16> = (0..160).map(|i| i * 100).collect();
    let frame = encode_command(&RelayCommand::AudioChunk {
        data: encode_chunk(&samples).expect("non-empty chunk"),
    })
    .expect("encode must succeed");

    let RelayCommand::AudioChunk { data } = decode_frame(&frame).expect("decode must succeed")
    else {
        panic!("expected an audio chunk");
    };
    let bytes = decode_audio_payload(&data).expect("valid base64");

    assert_eq!(bytes.len(), samples.len() * 2);
    let restored: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    assert_eq!(restored, samples);
}

#[test]
fn test_manual_and_scanned_endpoints_agree() {
    let manual = ConnectionEndpoint::from_manual("192.168.0.12", "8765", "9988").unwrap();
    let scanned = ConnectionEndpoint::parse_url(&manual.to_url()).unwrap();
    assert_eq!(manual, scanned);
}

#[test]
fn test_non_websocket_url_is_rejected() {
    assert!(matches!(
        ConnectionEndpoint::parse_url("http://x"),
        Err(EndpointError::UnsupportedScheme(_))
    ));
}

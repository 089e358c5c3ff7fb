use std::io::Write;

use client_bootstrap::{ClientConfig, SessionBuilder, SessionScript, replay};
use multiworld_runtime::{Event, HintEvent, Topic};

const SCRIPT: &str = r#"{
    "team": 0,
    "slot": 1,
    "players": [
        {"team": 0, "slot": 1, "name": "Me"},
        {"team": 0, "slot": 2, "name": "Ally"}
    ],
    "steps": [
        {"step": "connected"},
        {"step": "received_items", "index": 0, "items": [
            {"item": 7, "location": 70, "player": 2, "flags": 1},
            {"item": 8, "location": 80, "player": 0}
        ]},
        {"step": "set_hints", "hints": [
            {"receiving_player": 1, "finding_player": 2, "location": 5, "item": 9, "found": false}
        ]},
        {"step": "expect_count", "count": 2},
        {"step": "connected"},
        {"step": "received_items", "index": 0, "items": [
            {"item": 7, "location": 70, "player": 2, "flags": 1}
        ]},
        {"step": "expect_count", "count": 1}
    ]
}"#;

fn script_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write script");
    file
}

#[tokio::test]
async fn replays_script_from_file() {
    let file = script_file(SCRIPT);
    let script = SessionScript::load(file.path()).unwrap();

    let setup = SessionBuilder::new(ClientConfig::default())
        .build(&script)
        .await
        .unwrap();
    let handle = setup.runtime.handle();
    let mut hints_rx = handle.subscribe(Topic::Hints);

    let summary = replay(&handle, &setup.storage, &script).await.unwrap();
    assert_eq!(summary.connections, 2);
    assert_eq!(summary.batches, 2);
    assert_eq!(summary.item_count, 1);

    // Hints written before the reconnect come back through the new snapshot.
    assert_eq!(summary.hint_count, 1);

    let mut received = 0;
    while let Ok(event) = hints_rx.try_recv() {
        if let Event::Hints(HintEvent::Received { .. }) = event {
            received += 1;
        }
    }
    assert_eq!(received, 1);

    drop(handle);
    setup.runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn count_mismatch_fails_replay() {
    let script = SessionScript::from_json(
        r#"{"team": 0, "slot": 1, "steps": [
            {"step": "connected"},
            {"step": "expect_count", "count": 3}
        ]}"#,
    )
    .unwrap();

    let setup = SessionBuilder::new(ClientConfig::default())
        .build(&script)
        .await
        .unwrap();
    let err = replay(&setup.runtime.handle(), &setup.storage, &script)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("expected item count 3"));
}

#[tokio::test]
async fn unknown_sender_fails_replay() {
    let script = SessionScript::from_json(
        r#"{"team": 0, "slot": 1, "steps": [
            {"step": "received_items", "index": 0, "items": [
                {"item": 1, "location": 1, "player": 9}
            ]}
        ]}"#,
    )
    .unwrap();

    let setup = SessionBuilder::new(ClientConfig::default())
        .build(&script)
        .await
        .unwrap();
    let err = replay(&setup.runtime.handle(), &setup.storage, &script)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("rejected"));
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = SessionScript::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read session script"));
}

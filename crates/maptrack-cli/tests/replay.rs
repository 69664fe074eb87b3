use serde_json::Value;
use std::fs;
use std::process::Command;

const SESSION: &str = r#"{
  "device": "sni://emunw/localhost:48879",
  "polls": [
    {
      "timestamp_ms": 0,
      "mapping": "lorom",
      "memory": {
        "0x7FC0": [86, 84, 32, 82, 65, 78, 68, 79],
        "0xF50010": [9],
        "0xF50FFF": [0],
        "0x180213": [0],
        "0xF50020": [100, 0, 200, 0],
        "0xF5F43E": [0, 0, 0, 0]
      }
    },
    {
      "timestamp_ms": 500,
      "mapping": "lorom",
      "memory": {
        "0xF50020": [110, 0, 200, 0],
        "0xF5F43E": [30, 0, 0, 0]
      }
    },
    {
      "timestamp_ms": 1000,
      "mapping": "lorom",
      "read_fails": true
    },
    {
      "timestamp_ms": 1500,
      "mapping": "lorom",
      "memory": {
        "0xF50010": [7],
        "0xF50020": [40, 35, 16, 0],
        "0xF5F43E": [90, 0, 0, 0]
      }
    }
  ]
}"#;

const RACE_SESSION: &str = r#"{
  "device": "sni://emunw/localhost:48879",
  "polls": [
    {
      "timestamp_ms": 0,
      "mapping": "lorom",
      "memory": {
        "0x7FC0": [86, 84, 32, 82, 65, 67, 69],
        "0xF50010": [9],
        "0xF50FFF": [0],
        "0x180213": [1],
        "0xF50020": [100, 0, 200, 0]
      }
    }
  ]
}"#;

fn run(args: &[&str]) -> Value {
    run_session(SESSION, args)
}

fn run_session(session_json: &str, args: &[&str]) -> Value {
    let dir = tempfile::tempdir().unwrap();
    let session = dir.path().join("session.json");
    let output = dir.path().join("out.json");
    fs::write(&session, session_json).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_maptrack-replay"))
        .arg("--session")
        .arg(&session)
        .arg("--output")
        .arg(&output)
        .args(args)
        .status()
        .unwrap();
    assert!(status.success());

    serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap()
}

#[test]
fn test_replays_session_and_reports_each_poll() {
    let report = run(&[]);
    let polls = report["polls"].as_array().unwrap();
    assert_eq!(polls.len(), 4);
    assert_eq!(report["rom_name"], "VT RANDO");

    assert_eq!(polls[0]["outcome"]["kind"], "tracked");
    assert_eq!(polls[0]["region"], "LW");
    assert_eq!(polls[0]["outcome"]["sample"]["x"], 200);
    assert_eq!(polls[0]["outcome"]["sample"]["y"], 100);
    assert_eq!(polls[1]["samples"], 2);
    assert_eq!(polls[1]["fps"], 60.0);

    // The failed poll leaves state as it was.
    assert!(polls[2]["error"].as_str().unwrap().contains("recorded read failure"));
    assert_eq!(polls[2]["samples"], 2);
    assert_eq!(polls[2]["region"], "LW");

    // y = 0x2328 = 9000 puts the player on the secondary dungeon sheet.
    assert_eq!(polls[3]["region"], "EG2");
    assert_eq!(polls[3]["outcome"]["sample"]["y"], 808);
    assert_eq!(polls[3]["overlay"]["frame"], "map");

    assert_eq!(report["frame_rate"]["count"], 2);
}

#[test]
fn test_history_len_flag_limits_trail() {
    let report = run(&["--history-len", "1", "--pretty"]);
    let last = &report["polls"][1]["overlay"];
    let trail = last["trail"].as_array().unwrap();
    assert_eq!(trail.len(), 1);
    assert!(trail[0]["segments"].as_array().unwrap().is_empty());
}

#[test]
fn test_race_rom_stays_hidden_without_override() {
    let report = run_session(RACE_SESSION, &[]);
    let poll = &report["polls"][0];
    assert_eq!(poll["outcome"]["kind"], "race_mode_blocked");
    assert_eq!(poll["race"]["detected"], true);
    assert_eq!(poll["race"]["overridden"], false);
    assert_eq!(poll["samples"], 0);
}

#[test]
fn test_race_override_flag_unlocks_first_poll() {
    let report = run_session(RACE_SESSION, &["--race-override"]);
    let poll = &report["polls"][0];
    assert_eq!(poll["outcome"]["kind"], "tracked");
    assert_eq!(poll["race"]["detected"], true);
    assert_eq!(poll["race"]["overridden"], true);
    assert_eq!(poll["samples"], 1);
    assert_eq!(poll["overlay"]["frame"], "map");
}

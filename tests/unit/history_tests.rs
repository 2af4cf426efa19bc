//! Unit tests for shell history persistence and rotation.

use ktrl::shell::history::History;

#[test]
fn blank_and_repeated_lines_are_skipped() {
    let mut history = History::in_memory(10);
    assert!(history.push("show"));
    assert!(!history.push("show"));
    assert!(!history.push("   "));
    assert!(history.push("show -e"));
    assert!(history.push("show"));
    assert_eq!(history.lines(), ["show", "show -e", "show"].map(str::to_owned).as_slice());
}

#[test]
fn rotation_keeps_most_recent_lines() {
    let mut history = History::in_memory(3);
    for i in 0..10 {
        history.push(&format!("cmd {i}"));
    }
    assert_eq!(
        history.lines(),
        ["cmd 7", "cmd 8", "cmd 9"].map(str::to_owned).as_slice()
    );
}

#[test]
fn saved_history_is_reloaded_and_rotated() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("nested").join(".history");

    let mut history = History::open(&path, 5).expect("open creates directory");
    for i in 0..8 {
        history.push(&format!("cmd {i}"));
    }
    history.save().expect("save");

    let raw = std::fs::read_to_string(&path).expect("history file");
    assert_eq!(raw.lines().count(), 5);

    let reloaded = History::open(&path, 2).expect("reopen");
    assert_eq!(reloaded.lines(), ["cmd 6", "cmd 7"].map(str::to_owned).as_slice());
}

#[test]
fn in_memory_save_is_noop() {
    let mut history = History::in_memory(5);
    history.push("show");
    history.save().expect("nothing to write");
}

#[test]
fn unusable_history_path_falls_back_to_memory() {
    let temp = tempfile::tempdir().expect("tempdir");
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, "x").expect("write");

    let path = blocker.join(".history");
    let mut history = History::open_or_in_memory(Some(path.as_path()), 3);
    assert!(!history.is_persistent());
    assert!(history.push("show"));
    history.save().expect("in-memory save");
}

#[test]
fn configured_history_path_is_persistent() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join(".history");
    assert!(History::open_or_in_memory(Some(path.as_path()), 3).is_persistent());
    assert!(!History::open_or_in_memory(None, 3).is_persistent());
}

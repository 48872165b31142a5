//! Runs in its own process so no other test can have loaded content first.

use gambit_core::EngineError;

#[test]
fn engine_calls_before_load_content_are_refused() {
    let err = gambit_core::create_run(1, 7).unwrap_err();
    assert!(matches!(err, EngineError::ContentNotLoaded));

    let log = gambit_core::ActionLog::start(1, 7, "none", "2026-08-02T00:00:00Z");
    let err = gambit_core::replay_log(&log).unwrap_err();
    assert!(matches!(err, EngineError::ContentNotLoaded));
}

// Time-travel debugger tests

use intty::debugger::{Debugger, DebuggerError, StepOutcome};
use intty::interpreter::constants::DEFAULT_SNAPSHOT_LIMIT;
use intty::interpreter::engine::{Engine, RunState};
use intty::interpreter::errors::EngineError;
use intty::snapshot::SnapshotError;

fn debugger_for(program: &[i64]) -> Debugger {
    Debugger::new(Engine::new(program), DEFAULT_SNAPSHOT_LIMIT).expect("Failed to start debugger")
}

#[test]
fn test_step_forward_and_backward() {
    let mut debugger = debugger_for(&[1, 0, 0, 0, 99]);
    assert_eq!(debugger.total_snapshots(), 1);

    assert_eq!(
        debugger.step_forward().unwrap(),
        StepOutcome::Executed(RunState::Running)
    );
    assert_eq!(debugger.engine().memory().peek(0), Some(2));

    debugger.step_backward().unwrap();
    assert_eq!(debugger.engine().memory().peek(0), Some(1));
    assert_eq!(debugger.engine().pc(), 0);
    assert!(!debugger.is_at_head());

    // Replays instead of re-executing
    assert_eq!(debugger.step_forward().unwrap(), StepOutcome::Replayed);
    assert_eq!(debugger.engine().memory().peek(0), Some(2));
    assert_eq!(debugger.total_snapshots(), 2);

    assert_eq!(
        debugger.step_forward().unwrap(),
        StepOutcome::Executed(RunState::Terminated)
    );
    assert_eq!(debugger.step_forward(), Err(DebuggerError::Finished));
}

#[test]
fn test_step_backward_at_start() {
    let mut debugger = debugger_for(&[99]);
    assert_eq!(debugger.step_backward(), Err(DebuggerError::AtStart));
}

#[test]
fn test_rewind_to_start() {
    let mut debugger = debugger_for(&[1101, 2, 3, 0, 99]);
    debugger.run_to_end(None).unwrap();
    assert!(debugger.engine().is_terminated());

    debugger.rewind_to_start();
    assert_eq!(debugger.history_position(), 0);
    assert_eq!(debugger.engine().memory().peek(0), Some(1101));
    assert_eq!(debugger.engine().state(), RunState::Running);
}

#[test]
fn test_input_at_head() {
    let mut debugger = debugger_for(&[3, 0, 4, 0, 99]);

    assert_eq!(
        debugger.step_forward().unwrap(),
        StepOutcome::Executed(RunState::AwaitingInput)
    );
    assert!(debugger.needs_input());
    assert_eq!(debugger.step_forward(), Err(DebuggerError::AwaitingInput));

    debugger.provide_input(7).unwrap();
    assert!(!debugger.needs_input());
    assert_eq!(debugger.total_snapshots(), 3);

    // IN, OUT, HALT
    assert_eq!(debugger.run_to_end(None).unwrap(), 3);
    assert_eq!(debugger.transcript(), &[7]);
    assert!(debugger.engine().is_terminated());
}

#[test]
fn test_transcript_follows_the_cursor() {
    let mut debugger = debugger_for(&[104, 1, 104, 2, 99]);
    debugger.run_to_end(None).unwrap();
    assert_eq!(debugger.transcript(), &[1, 2]);

    debugger.step_backward().unwrap();
    debugger.step_backward().unwrap();
    assert_eq!(debugger.transcript(), &[1]);

    debugger.rewind_to_start();
    assert!(debugger.transcript().is_empty());
}

#[test]
fn test_input_refused_when_not_waiting() {
    let mut debugger = debugger_for(&[3, 0, 99]);
    assert_eq!(debugger.provide_input(1), Err(DebuggerError::NotAwaitingInput));

    debugger.step_forward().unwrap();
    debugger.step_backward().unwrap();
    debugger.step_forward().unwrap();
    debugger.step_backward().unwrap();

    // Away from the head of history
    assert_eq!(debugger.provide_input(1), Err(DebuggerError::NotAwaitingInput));
}

#[test]
fn test_changed_cells() {
    let mut debugger = debugger_for(&[1101, 2, 3, 7, 104, 0, 99]);
    assert!(debugger.changed_cells().is_empty());

    debugger.step_forward().unwrap();
    let changed = debugger.changed_cells();
    assert_eq!(changed.len(), 1);
    assert!(changed.contains(&7));

    // Output changes nothing
    debugger.step_forward().unwrap();
    assert!(debugger.changed_cells().is_empty());
}

#[test]
fn test_engine_error_is_recorded() {
    let mut debugger = debugger_for(&[42]);
    let result = debugger.step_forward();

    assert_eq!(
        result,
        Err(DebuggerError::Engine(EngineError::InvalidOpcode { opcode: 42, pc: 0 }))
    );
    assert!(debugger.last_error().is_some());
    assert_eq!(debugger.total_snapshots(), 1);
    assert!(debugger.run_to_end(None).is_err());
}

#[test]
fn test_run_to_end_respects_step_budget() {
    let mut debugger = debugger_for(&[1105, 1, 0]);
    assert_eq!(debugger.run_to_end(Some(10)).unwrap(), 10);
    assert_eq!(debugger.total_snapshots(), 11);
    assert_eq!(debugger.engine().steps(), 10);
}

#[test]
fn test_snapshot_limit() {
    let result = Debugger::new(Engine::new(&[99]), 1);
    assert!(matches!(
        result,
        Err(DebuggerError::Snapshot(SnapshotError::LimitExceeded { .. }))
    ));

    // Room for the initial snapshot only
    let engine = Engine::new(&[1101, 1, 1, 0, 99]);
    let size = intty::snapshot::Snapshot::new(engine.clone(), Vec::new()).estimated_size();
    let mut debugger = Debugger::new(engine, size).unwrap();
    assert!(matches!(
        debugger.step_forward(),
        Err(DebuggerError::Snapshot(SnapshotError::LimitExceeded { .. }))
    ));
    assert_eq!(debugger.history_memory_usage(), size);
    assert_eq!(debugger.history_memory_limit(), size);
}

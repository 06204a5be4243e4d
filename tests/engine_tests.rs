// Engine behaviour tests

use intty::config::RunConfig;
use intty::interpreter::engine::{BudgetOutcome, Engine, RunState};
use intty::interpreter::errors::EngineError;
use intty::program;

/// Run `program` with `inputs` queued up front, returning all outputs
fn run_with_inputs(program: &[i64], inputs: &[i64]) -> Vec<i64> {
    let mut engine = Engine::new(program);
    engine.feed_inputs(inputs.iter().copied());
    let state = engine.run_to_suspension().expect("Execution failed");
    assert_eq!(state, RunState::Terminated, "Program did not terminate");
    engine.drain_outputs()
}

#[test]
fn test_self_referential_add() {
    let mut engine = Engine::new(&[1, 0, 0, 0, 99]);
    let state = engine.run_to_suspension().expect("Execution failed");

    assert_eq!(state, RunState::Terminated);
    assert_eq!(engine.memory().cells(), &[2, 0, 0, 0, 99]);
}

#[test]
fn test_add_and_multiply_programs() {
    let cases: [(&[i64], &[i64]); 4] = [
        (
            &[1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50],
            &[3500, 9, 10, 70, 2, 3, 11, 0, 99, 30, 40, 50],
        ),
        (&[2, 3, 0, 3, 99], &[2, 3, 0, 6, 99]),
        (&[2, 4, 4, 5, 99, 0], &[2, 4, 4, 5, 99, 9801]),
        (&[1, 1, 1, 4, 99, 5, 6, 0, 99], &[30, 1, 1, 4, 2, 5, 6, 0, 99]),
    ];

    for (program, expected) in cases {
        let mut engine = Engine::new(program);
        engine.run_to_suspension().expect("Execution failed");
        assert_eq!(engine.memory().cells(), expected, "Program {:?}", program);
    }
}

#[test]
fn test_echo() {
    assert_eq!(run_with_inputs(&[3, 0, 4, 0, 99], &[7]), vec![7]);
}

#[test]
fn test_suspends_on_empty_input_and_resumes() {
    let mut engine = Engine::new(&[3, 0, 4, 0, 99]);

    let state = engine.run_to_suspension().expect("Execution failed");
    assert_eq!(state, RunState::AwaitingInput);
    assert!(engine.is_awaiting_input());
    assert_eq!(engine.pc(), 0, "Input must not advance the pc while suspended");
    assert_eq!(engine.drain_output(), None);

    // Retrying without input stays suspended
    assert_eq!(engine.step().unwrap(), RunState::AwaitingInput);
    assert_eq!(engine.pc(), 0);

    engine.feed_input(7);
    assert_eq!(engine.state(), RunState::Running);

    let state = engine.run_to_suspension().expect("Execution failed");
    assert_eq!(state, RunState::Terminated);
    assert!(engine.is_terminated());
    assert_eq!(engine.drain_output(), Some(7));
    assert_eq!(engine.drain_output(), None);
}

#[test]
fn test_multiple_suspensions() {
    // IN [11]; IN [12]; ADD [11], [12], [13]; OUT [13]; HALT
    let program = [3, 11, 3, 12, 1, 11, 12, 13, 4, 13, 99, 0, 0, 0];
    let mut engine = Engine::new(&program);

    assert_eq!(engine.run_to_suspension().unwrap(), RunState::AwaitingInput);
    assert_eq!(engine.pc(), 0);

    engine.feed_input(2);
    assert_eq!(engine.run_to_suspension().unwrap(), RunState::AwaitingInput);
    assert_eq!(engine.pc(), 2);

    engine.feed_input(40);
    assert_eq!(engine.run_to_suspension().unwrap(), RunState::Terminated);
    assert_eq!(engine.drain_outputs(), vec![42]);
}

#[test]
fn test_equals_and_less_than_position_mode() {
    let equals_8 = [3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8];
    assert_eq!(run_with_inputs(&equals_8, &[8]), vec![1]);
    assert_eq!(run_with_inputs(&equals_8, &[5]), vec![0]);

    let less_than_8 = [3, 9, 7, 9, 10, 9, 4, 9, 99, -1, 8];
    assert_eq!(run_with_inputs(&less_than_8, &[7]), vec![1]);
    assert_eq!(run_with_inputs(&less_than_8, &[9]), vec![0]);
}

#[test]
fn test_equals_and_less_than_immediate_mode() {
    let equals_8 = [3, 3, 1108, -1, 8, 3, 4, 3, 99];
    assert_eq!(run_with_inputs(&equals_8, &[8]), vec![1]);
    assert_eq!(run_with_inputs(&equals_8, &[9]), vec![0]);

    let less_than_8 = [3, 3, 1107, -1, 8, 3, 4, 3, 99];
    assert_eq!(run_with_inputs(&less_than_8, &[-3]), vec![1]);
    assert_eq!(run_with_inputs(&less_than_8, &[8]), vec![0]);
}

#[test]
fn test_jumps() {
    let position = [3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9];
    assert_eq!(run_with_inputs(&position, &[0]), vec![0]);
    assert_eq!(run_with_inputs(&position, &[5]), vec![1]);

    let immediate = [3, 3, 1105, -1, 9, 1101, 0, 0, 12, 4, 12, 99, 1];
    assert_eq!(run_with_inputs(&immediate, &[0]), vec![0]);
    assert_eq!(run_with_inputs(&immediate, &[-5]), vec![1]);
}

#[test]
fn test_compare_to_8() {
    let program = [
        3, 21, 1008, 21, 8, 20, 1005, 20, 22, 107, 8, 21, 20, 1006, 20, 31, 1106, 0, 36, 98, 0, 0,
        1002, 21, 125, 20, 4, 20, 1105, 1, 46, 104, 999, 1105, 1, 46, 1101, 1000, 1, 20, 4, 20,
        1105, 1, 46, 98, 99,
    ];

    assert_eq!(run_with_inputs(&program, &[7]), vec![999]);
    assert_eq!(run_with_inputs(&program, &[8]), vec![1000]);
    assert_eq!(run_with_inputs(&program, &[9]), vec![1001]);
}

#[test]
fn test_quine() {
    let program = [
        109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99,
    ];
    assert_eq!(run_with_inputs(&program, &[]), program.to_vec());
}

#[test]
fn test_large_numbers() {
    let output = run_with_inputs(&[1102, 34915192, 34915192, 7, 4, 7, 99, 0], &[]);
    assert_eq!(output, vec![1_219_070_632_396_864]);
    assert_eq!(output[0].to_string().len(), 16);

    assert_eq!(
        run_with_inputs(&[104, 1125899906842624, 99], &[]),
        vec![1125899906842624]
    );
}

#[test]
fn test_relative_mode_write_target() {
    // ARB #10; IN rb[+0]; OUT rb[+0]; HALT
    let mut engine = Engine::new(&[109, 10, 203, 0, 204, 0, 99]);
    engine.feed_input(42);
    engine.run_to_suspension().expect("Execution failed");

    assert_eq!(engine.drain_outputs(), vec![42]);
    assert_eq!(engine.memory().peek(10), Some(42));
    assert_eq!(engine.relative_base(), 10);
}

#[test]
fn test_unwritten_memory_reads_zero() {
    let mut engine = Engine::new(&[4, 100, 99]);
    engine.run_to_suspension().expect("Execution failed");

    assert_eq!(engine.drain_outputs(), vec![0]);
    assert_eq!(engine.memory().len(), 101);
}

#[test]
fn test_wrapping_arithmetic() {
    let output = run_with_inputs(&[1102, i64::MAX, 2, 7, 4, 7, 99, 0], &[]);
    assert_eq!(output, vec![-2]);
}

#[test]
fn test_invalid_opcode_is_an_error() {
    let mut engine = Engine::new(&[42]);
    let result = engine.step();

    assert_eq!(result, Err(EngineError::InvalidOpcode { opcode: 42, pc: 0 }));
    assert_eq!(engine.pc(), 0);
    assert_eq!(engine.state(), RunState::Running);
}

#[test]
fn test_failure_keeps_prior_writes() {
    // ADD #2, #3, [0]; then opcode 77
    let mut engine = Engine::new(&[1101, 2, 3, 0, 77]);
    let result = engine.run_to_suspension();

    assert_eq!(result, Err(EngineError::InvalidOpcode { opcode: 77, pc: 4 }));
    assert_eq!(engine.memory().peek(0), Some(5));
    assert_eq!(engine.pc(), 4);
    assert_eq!(engine.steps(), 1);
}

#[test]
fn test_running_off_the_end() {
    // ADD #1, #1, [5] grows memory; the next fetch reads a zero
    let mut engine = Engine::new(&[1101, 1, 1, 5]);
    let result = engine.run_to_suspension();

    assert_eq!(result, Err(EngineError::InvalidOpcode { opcode: 0, pc: 4 }));
    assert_eq!(engine.memory().cells(), &[1101, 1, 1, 5, 0, 2]);
}

#[test]
fn test_negative_addresses() {
    let mut engine = Engine::new(&[1, -1, 0, 0, 99]);
    assert_eq!(
        engine.step(),
        Err(EngineError::AddressError {
            address: -1,
            pc: Some(0)
        })
    );

    // Jump to a negative target
    let mut engine = Engine::new(&[1105, 1, -1]);
    assert_eq!(
        engine.step(),
        Err(EngineError::AddressError {
            address: -1,
            pc: Some(0)
        })
    );
    assert_eq!(engine.pc(), 0);

    // Relative base pushed below zero
    let mut engine = Engine::new(&[109, -5, 204, 0, 99]);
    engine.step().unwrap();
    assert_eq!(
        engine.step(),
        Err(EngineError::AddressError {
            address: -5,
            pc: Some(2)
        })
    );
}

#[test]
fn test_failed_input_does_not_consume_value() {
    let mut engine = Engine::new(&[3, -1, 99]);
    engine.feed_input(5);

    assert!(matches!(engine.step(), Err(EngineError::AddressError { .. })));
    assert_eq!(engine.input().len(), 1);
}

#[test]
fn test_immediate_write_is_rejected() {
    let mut engine = Engine::new(&[11101, 1, 1, 0, 99]);
    assert_eq!(engine.step(), Err(EngineError::ImmediateWrite { pc: 0 }));
}

#[test]
fn test_invalid_mode_is_rejected() {
    let mut engine = Engine::new(&[301, 0, 0, 0, 99]);
    assert_eq!(engine.step(), Err(EngineError::InvalidMode { mode: 3, pc: 0 }));
}

#[test]
fn test_terminated_engine_stays_terminated() {
    let mut engine = Engine::new(&[99]);
    assert_eq!(engine.step().unwrap(), RunState::Terminated);
    assert_eq!(engine.steps(), 1);

    assert_eq!(engine.step().unwrap(), RunState::Terminated);
    engine.feed_input(3);
    assert_eq!(engine.state(), RunState::Terminated);
    assert_eq!(engine.run_to_suspension().unwrap(), RunState::Terminated);
    assert_eq!(engine.steps(), 1);
}

#[test]
fn test_step_budget() {
    // JNZ #1, #0: loops forever without input
    let mut engine = Engine::new(&[1105, 1, 0]);
    assert_eq!(engine.run_with_budget(100).unwrap(), BudgetOutcome::Exhausted);
    assert_eq!(engine.steps(), 100);

    let mut engine = Engine::new(&[3, 0, 99]);
    assert_eq!(
        engine.run_with_budget(100).unwrap(),
        BudgetOutcome::Suspended(RunState::AwaitingInput)
    );
}

#[test]
fn test_error_messages() {
    let err = EngineError::AddressError {
        address: -4,
        pc: Some(12),
    };
    assert_eq!(err.to_string(), "negative memory address -4 at pc 12");
    assert_eq!(err.pc(), Some(12));

    let err = EngineError::InvalidOpcode { opcode: 0, pc: 3 };
    assert_eq!(err.to_string(), "invalid opcode 0 at pc 3");
}

#[test]
fn test_memory_ceiling() {
    let config = RunConfig {
        memory_limit: 16,
        ..RunConfig::default()
    };
    let mut engine = config.engine(&[1101, 1, 1, 100, 99]);

    assert_eq!(
        engine.step(),
        Err(EngineError::MemoryLimitExceeded {
            address: 100,
            limit: 16,
            pc: Some(0)
        })
    );
    assert_eq!(engine.memory().len(), 5);
    assert_eq!(engine.pc(), 0);

    // Hit by a read two instructions in
    let mut engine = config.engine(&[1101, 1, 1, 0, 4, 50, 99]);
    let err = engine.run_to_suspension().unwrap_err();
    assert_eq!(err.pc(), Some(4));
    assert_eq!(
        err.to_string(),
        "memory limit exceeded: address 50 is beyond the limit of 16 cells at pc 4"
    );
}

#[test]
fn test_program_text_end_to_end() {
    let image = program::parse("3,9,8,9,10,9,4,9,99,-1,8\n").expect("Failed to parse");
    let mut engine = RunConfig::default().engine(&image);
    engine.feed_input(8);

    assert_eq!(engine.run_to_suspension().unwrap(), RunState::Terminated);
    assert_eq!(engine.drain_outputs(), vec![1]);
}

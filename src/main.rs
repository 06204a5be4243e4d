// intty: suspendable integer-tape VM with a time-travel debugger

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};

use intty::config::{init_logging, LogTarget, RunConfig};
use intty::debugger::Debugger;
use intty::interpreter::constants::{DEFAULT_MEMORY_LIMIT, DEFAULT_SNAPSHOT_LIMIT};
use intty::interpreter::disasm::disassemble;
use intty::interpreter::engine::{BudgetOutcome, Engine, RunState};
use intty::memory::Word;
use intty::orchestrator::{Orchestrator, Topology};
use intty::program::{self, Patch};
use intty::ui::App;

#[derive(Parser, Debug)]
#[command(name = "intty")]
#[command(about = "Run, chain and debug integer-tape programs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program, printing each output value on its own line
    Run {
        #[command(flatten)]
        program: ProgramArgs,

        /// Values to queue on input before starting (further input is read from stdin)
        #[arg(short, long = "input", allow_hyphen_values = true)]
        inputs: Vec<Word>,

        /// Print the value of this memory cell after the program halts
        #[arg(long)]
        dump: Vec<usize>,
    },

    /// Chain one engine per phase setting and print the final signal
    Chain {
        #[command(flatten)]
        program: ProgramArgs,

        /// Comma-separated phase settings, one per engine
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        phases: Vec<Word>,

        /// Feed the last engine's output back into the first until it halts
        #[arg(long)]
        ring: bool,

        /// Value fed to the first engine to start the chain
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        initial: Word,
    },

    /// Print a disassembly of the program image
    Disasm {
        #[command(flatten)]
        program: ProgramArgs,
    },

    /// Step through a program in the terminal debugger
    Debug {
        #[command(flatten)]
        program: ProgramArgs,

        /// Values to queue on input before starting
        #[arg(short, long = "input", allow_hyphen_values = true)]
        inputs: Vec<Word>,

        /// Write logs to this file while the debugger owns the terminal
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Byte budget for execution history
        #[arg(long, env = "INTTY_SNAPSHOT_LIMIT", default_value_t = DEFAULT_SNAPSHOT_LIMIT)]
        snapshot_limit: usize,
    },
}

#[derive(Args, Debug)]
struct ProgramArgs {
    /// Path to a comma-separated program file
    file: PathBuf,

    /// Overwrite a cell before running, as ADDR=VALUE
    #[arg(short, long = "patch")]
    patches: Vec<Patch>,

    /// Give up after this many instructions
    #[arg(long, env = "INTTY_MAX_STEPS")]
    max_steps: Option<u64>,

    /// Growth ceiling for each engine's memory, in cells
    #[arg(long, env = "INTTY_MEMORY_LIMIT", default_value_t = DEFAULT_MEMORY_LIMIT)]
    memory_limit: usize,
}

impl ProgramArgs {
    fn config(&self, snapshot_limit: usize) -> RunConfig {
        RunConfig {
            max_steps: self.max_steps,
            memory_limit: self.memory_limit,
            snapshot_limit,
        }
    }

    /// Load the program file and apply patches
    fn image(&self) -> Result<Vec<Word>, Box<dyn std::error::Error>> {
        let mut image = program::load(&self.file)?;
        for patch in &self.patches {
            patch.apply(&mut image, self.memory_limit)?;
        }
        info!(
            "Loaded {} ({} words, {} patches)",
            self.file.display(),
            image.len(),
            self.patches.len()
        );
        Ok(image)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_target = match &cli.command {
        Command::Debug { log_file: Some(path), .. } => LogTarget::File(path),
        Command::Debug { .. } => LogTarget::Silent,
        _ => LogTarget::Stderr,
    };
    if let Err(e) = init_logging(log_target) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Command::Run {
            program,
            inputs,
            dump,
        } => run(&program, inputs, &dump),
        Command::Chain {
            program,
            phases,
            ring,
            initial,
        } => chain(&program, &phases, ring, initial),
        Command::Disasm { program } => disasm(&program),
        Command::Debug {
            program,
            inputs,
            snapshot_limit,
            ..
        } => debug(&program, inputs, snapshot_limit),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run a single engine, reading further input from stdin on demand
fn run(
    args: &ProgramArgs,
    inputs: Vec<Word>,
    dump: &[usize],
) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config(DEFAULT_SNAPSHOT_LIMIT);
    let mut engine = config.engine(&args.image()?);
    engine.feed_inputs(inputs);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout().lock();

    loop {
        let state = match config.max_steps {
            Some(budget) => match engine.run_with_budget(budget.saturating_sub(engine.steps()))? {
                BudgetOutcome::Suspended(state) => state,
                BudgetOutcome::Exhausted => {
                    flush_outputs(&mut engine, &mut stdout)?;
                    return Err(format!("step budget of {} exhausted", budget).into());
                }
            },
            None => engine.run_to_suspension()?,
        };

        flush_outputs(&mut engine, &mut stdout)?;

        match state {
            RunState::Terminated => break,
            RunState::AwaitingInput => match lines.next() {
                Some(line) => {
                    let line = line?;
                    let value = line
                        .trim()
                        .parse::<Word>()
                        .map_err(|_| format!("invalid input {:?}", line.trim()))?;
                    engine.feed_input(value);
                }
                None => {
                    return Err(format!("program is waiting for input at pc {}", engine.pc()).into());
                }
            },
            RunState::Running => continue,
        }
    }

    info!("Program halted after {} steps", engine.steps());

    for &address in dump {
        match engine.memory().peek(address) {
            Some(value) => writeln!(stdout, "[{}] = {}", address, value)?,
            None => warn!("address {} is past the end of memory", address),
        }
    }

    Ok(())
}

fn flush_outputs(engine: &mut Engine, out: &mut impl Write) -> io::Result<()> {
    while let Some(value) = engine.drain_output() {
        writeln!(out, "{}", value)?;
    }
    out.flush()
}

fn chain(
    args: &ProgramArgs,
    phases: &[Word],
    ring: bool,
    initial: Word,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config(DEFAULT_SNAPSHOT_LIMIT);
    let image = args.image()?;
    let topology = if ring {
        Topology::FeedbackRing
    } else {
        Topology::Pipeline
    };

    let engines = phases
        .iter()
        .map(|&phase| {
            let mut engine = config.engine(&image);
            engine.feed_input(phase);
            engine
        })
        .collect();

    let mut orchestrator = Orchestrator::from_engines(engines, topology);
    let signal = orchestrator.run(initial)?;

    info!(
        "{:?} of {} engines finished after {} round(s)",
        topology,
        phases.len(),
        orchestrator.rounds()
    );
    println!("{}", signal);
    Ok(())
}

fn disasm(args: &ProgramArgs) -> Result<(), Box<dyn std::error::Error>> {
    let image = args.image()?;
    let mut stdout = io::stdout().lock();

    for line in disassemble(&image) {
        let label = if line.is_label { "◆" } else { " " };
        writeln!(stdout, "{:6} {} {}", line.address, label, line.text)?;
    }
    Ok(())
}

fn debug(
    args: &ProgramArgs,
    inputs: Vec<Word>,
    snapshot_limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config(snapshot_limit);
    let mut engine = config.engine(&args.image()?);
    engine.feed_inputs(inputs);

    let debugger = Debugger::new(engine, config.snapshot_limit)?;
    run_tui(debugger, config.max_steps, &args.file)
}

fn run_tui(
    debugger: Debugger,
    max_steps: Option<u64>,
    file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting debugger for {}", file.display());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(debugger, max_steps);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

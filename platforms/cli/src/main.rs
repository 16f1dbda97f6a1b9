use clap::Parser;
use ktape::{
    analyzer, report, DescriptionLoader, KTapeError, Machine, MachineDescription, Mode, Verdict,
};
use serde_json::json;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Simulates a deterministic k-tape Turing machine described in a CSV file.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  ktape-cli demos/anbn.csv
  cat demos/copy.csv | ktape-cli -")]
struct Cli {
    /// Path to the machine description, or `-` to read it from stdin
    description: String,

    /// Only print the final verdict
    #[clap(short, long)]
    quiet: bool,

    /// Print one JSON object per step and one for the verdict
    #[clap(long, conflicts_with = "quiet")]
    json: bool,

    /// Stop with an error after this many steps
    #[clap(long)]
    max_steps: Option<usize>,

    /// Fail on conflicting rules and on analyzer findings
    #[clap(long)]
    strict: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[clap(short, long)]
    verbose: bool,
}

/// Exit code for a description that could not be loaded or validated.
const LOAD_FAILURE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    ExitCode::from(execute(&cli))
}

/// Loads and runs the machine, returning the process exit code.
fn execute(cli: &Cli) -> u8 {
    let mut machine = match prepare(cli) {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("Error: {}", e);
            return LOAD_FAILURE;
        }
    };

    let result = if cli.json {
        run_json(&mut machine)
    } else {
        run_text(&mut machine, cli.quiet)
    };

    if let Err(e) = &result {
        eprintln!("Error: {}", e);
    }

    exit_code(&result)
}

/// A finished run exits 0 whatever the verdict; a run cut short exits 1.
fn exit_code(result: &Result<Verdict, KTapeError>) -> u8 {
    match result {
        Ok(Verdict::Accept | Verdict::Reject) => 0,
        Ok(Verdict::RejectedByMissingTransition { .. }) | Err(_) => 1,
    }
}

/// Logs go to stderr so stdout only carries the trace.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the description, runs the analyzer and builds the machine.
fn prepare(cli: &Cli) -> Result<Machine, KTapeError> {
    let mut description = load_description(&cli.description)?;

    if cli.strict {
        description.mode = Mode::Strict;
        analyzer::analyze(&description)?;
    } else {
        for finding in analyzer::findings(&description) {
            warn!("{}", KTapeError::from(finding));
        }
    }

    Ok(Machine::from_description(&description)?.with_max_steps(cli.max_steps))
}

fn load_description(source: &str) -> Result<MachineDescription, KTapeError> {
    if source != "-" {
        return DescriptionLoader::load(Path::new(source));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| KTapeError::FileError(format!("Failed to read from stdin: {}", e)))?;

    DescriptionLoader::load_from_string(&buffer)
}

fn run_text(machine: &mut Machine, quiet: bool) -> Result<Verdict, KTapeError> {
    if !quiet {
        println!("{}", report::header(machine));
    }

    let input = machine.input().to_string();
    let verdict = machine.run_with(|step, machine| {
        if !quiet {
            println!("{}", report::step(step, machine));
        }
    })?;

    println!("{}", report::verdict(&verdict, &input));

    Ok(verdict)
}

fn run_json(machine: &mut Machine) -> Result<Verdict, KTapeError> {
    let verdict = machine.run_with(|step, machine| {
        let line = json!({
            "step": step,
            "configuration": machine.configuration(),
        });
        println!("{}", line);
    })?;

    let line = json!({
        "machine": machine.name(),
        "input": machine.input(),
        "steps": machine.step_count(),
        "accepted": verdict.is_accepted(),
        "verdict": verdict,
    });
    println!("{}", line);

    Ok(verdict)
}

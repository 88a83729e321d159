use std::io::{self, BufWriter, Write};

use clap::Parser;

use filedes::cli::Cli;
use filedes::error::FiledesError;
use filedes::output::{self, DescriptorReport};

/// Exit codes by failure class.
fn exit_code(err: &FiledesError) -> i32 {
    match err {
        FiledesError::QueryFailed { .. } => 1,
        FiledesError::ProtocolViolation(_) => 2,
        FiledesError::ResourceExhausted(_) => 3,
        _ => 4,
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code(&e));
        }
    }
}

fn run(cli: &Cli) -> Result<(), FiledesError> {
    let inspect = !cli.no_stat;

    let mut reports: Vec<DescriptorReport> = Vec::new();
    for pid in cli.targets() {
        let found = output::collect_reports(pid, inspect)?;
        log::info!(
            "pid {}: {} descriptors",
            pid.unwrap_or_else(std::process::id),
            found.len()
        );
        reports.extend(found);
    }

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    output::write_reports(&reports, cli.format, &mut writer)?;
    writer.flush().map_err(FiledesError::Serialization)
}

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "filedes",
    version,
    about = "List the open file descriptors of processes"
)]
pub struct Cli {
    /// Processes to inspect [default: this process]
    #[arg(value_name = "PID", value_parser = validate_pid)]
    pub pids: Vec<u32>,

    /// Output format [default: pretty]
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Only list descriptor numbers, without inspecting each one
    #[arg(long)]
    pub no_stat: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Json,
    Pretty,
}

fn validate_pid(s: &str) -> Result<u32, String> {
    let val: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid pid"))?;
    if val > i32::MAX as u32 {
        Err(format!("pid must be at most {}", i32::MAX))
    } else {
        Ok(val)
    }
}

impl Cli {
    /// The processes to list, in command-line order. `None` is this process.
    pub fn targets(&self) -> Vec<Option<u32>> {
        if self.pids.is_empty() {
            vec![None]
        } else {
            self.pids.iter().copied().map(Some).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_own_process() {
        let cli = Cli::try_parse_from(["filedes"]).unwrap();
        assert_eq!(cli.targets(), vec![None]);
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(!cli.no_stat);
    }

    #[test]
    fn several_pids_keep_order() {
        let cli = Cli::try_parse_from(["filedes", "42", "7", "--format", "json"]).unwrap();
        assert_eq!(cli.targets(), vec![Some(42), Some(7)]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn rejects_bad_pids() {
        assert!(Cli::try_parse_from(["filedes", "abc"]).is_err());
        assert!(Cli::try_parse_from(["filedes", "-3"]).is_err());
        assert!(Cli::try_parse_from(["filedes", "4294967295"]).is_err());
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["filedes", "--format", "xml"]).is_err());
    }
}

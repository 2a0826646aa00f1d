//! Command-line configuration.

/// How layouts are printed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Flags shared by every subcommand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub format: OutputFormat,
    /// Print constructor spans as a tree on stderr.
    pub verbose: bool,
}

impl CliConfig {
    /// Apply one flag. Returns `Ok(false)` if `arg` is not a flag.
    pub fn apply_flag(&mut self, arg: &str) -> Result<bool, String> {
        if let Some(format) = arg.strip_prefix("--format=") {
            self.format = match format {
                "text" => OutputFormat::Text,
                "json" => OutputFormat::Json,
                other => return Err(format!("unknown output format `{other}`")),
            };
        } else if arg == "--verbose" || arg == "-v" {
            self.verbose = true;
        } else if arg.starts_with('-') {
            return Err(format!("unknown option `{arg}`"));
        } else {
            return Ok(false);
        }
        Ok(true)
    }
}

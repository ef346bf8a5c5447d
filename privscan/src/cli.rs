// privscan/src/cli.rs
//! Command-line interface definition for privscan.
//! License: MIT OR Apache-2.0

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use privscan_core::{MaskingMode, RuleFormat, RuleType};

#[derive(Parser, Debug)]
#[command(
    name = "privscan",
    version = env!("CARGO_PKG_VERSION"),
    about = "Find and mask sensitive data in text",
    long_about = "privscan scans text for sensitive data (card numbers, email addresses, SSNs, secrets in `key = \"value\"` assignments, keywords) using an editable rule set, and masks what it finds according to per-rule policies.",
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(long, short = 'q', global = true, help = "Suppress informational messages and logging.")]
    pub quiet: bool,

    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    #[arg(
        long = "rules-file",
        value_name = "FILE",
        env = "PRIVSCAN_RULES_FILE",
        global = true,
        help = "Rule set file (YAML, or JSON when the name ends in .json). Defaults to the user config directory."
    )]
    pub rules_file: Option<PathBuf>,

    #[arg(long = "theme", value_name = "FILE", global = true, help = "Path to a YAML colour theme.")]
    pub theme: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reports every sensitive match with its position.
    Scan(ScanCommand),

    /// Writes the input with every match masked.
    Redact(RedactCommand),

    /// Manages the rule set.
    #[command(subcommand)]
    Rules(RulesCommand),

    /// Switches the whole checker on or off.
    Checker {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args, Debug)]
pub struct ScanCommand {
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    #[arg(
        long,
        help = "Print the matches as JSON. `index` and `length` are UTF-8 byte offsets; `line` and `column` are 1-based, with `column` counted in characters."
    )]
    pub json: bool,

    #[arg(
        long,
        conflicts_with = "input_file",
        help = "Rescan after every line read from stdin and report only when the matches change."
    )]
    pub follow: bool,

    #[arg(long, help = "Show the masked form of each match.")]
    pub masked: bool,

    #[arg(long = "fail-on-match", help = "Exit with code 2 when anything is found.")]
    pub fail_on_match: bool,
}

#[derive(Args, Debug)]
pub struct RedactCommand {
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a file instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(long, short = 'D', help = "Show a diff of the changes instead of the redacted text.")]
    pub diff: bool,

    #[arg(long, short = 'c', help = "Also copy the redacted text to the clipboard.")]
    pub clipboard: bool,

    #[arg(long = "no-summary", help = "Suppress the redaction summary.")]
    pub no_summary: bool,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// Lists the rules.
    List {
        #[arg(long, help = "Print the rule set as JSON.")]
        json: bool,
    },

    /// Adds a rule.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_enum)]
        rule_type: RuleTypeArg,
        #[arg(long)]
        pattern: String,
        #[arg(long = "case-sensitive", help = "Match string rules case-sensitively.")]
        case_sensitive: bool,
        #[arg(long)]
        description: Option<String>,
    },

    /// Edits a rule; omitted fields keep their value.
    Edit {
        id: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type", value_enum)]
        rule_type: Option<RuleTypeArg>,
        #[arg(long)]
        pattern: Option<String>,
        #[arg(long = "case-sensitive", value_name = "BOOL")]
        case_sensitive: Option<bool>,
        #[arg(long, help = "New description; an empty value clears it.")]
        description: Option<String>,
    },

    /// Deletes a rule.
    Delete { id: u32 },

    /// Activates a rule.
    Enable { id: u32 },

    /// Deactivates a rule.
    Disable { id: u32 },

    /// Sets or removes a rule's masking policy.
    Mask(MaskCommand),

    /// Deletes every rule.
    Clear {
        #[arg(long, short = 'y', help = "Confirm deleting every rule.")]
        yes: bool,
    },

    /// Writes the rules as TSV or JSON.
    Export {
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Merges rules from a TSV or JSON file.
    Import {
        file: PathBuf,
        #[arg(long, value_enum, help = "Defaults to the file extension (.json or TSV).")]
        format: Option<FormatArg>,
    },

    /// Replaces the rule set with the built-in rules.
    Reset {
        #[arg(long, short = 'y', help = "Confirm replacing every rule.")]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct MaskCommand {
    pub id: u32,

    #[arg(long, value_enum, default_value = "direct-text")]
    pub mode: MaskModeArg,

    #[arg(long = "char", value_name = "TOKEN", default_value = "*", help = "The mask token.")]
    pub token: String,

    #[arg(long = "preserve-format")]
    pub preserve_format: bool,

    #[arg(long = "preserve-start", value_name = "N", default_value_t = 0)]
    pub preserve_start: usize,

    #[arg(long = "preserve-end", value_name = "N", default_value_t = 0)]
    pub preserve_end: usize,

    #[arg(long = "preserve-length")]
    pub preserve_length: bool,

    #[arg(long = "fixed-length", value_name = "N", help = "Mask width in variable-value mode (default 3).")]
    pub fixed_length: Option<usize>,

    #[arg(long, help = "Remove the masking policy instead.")]
    pub off: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleTypeArg {
    Regex,
    Variable,
    String,
}

impl From<RuleTypeArg> for RuleType {
    fn from(arg: RuleTypeArg) -> Self {
        match arg {
            RuleTypeArg::Regex => RuleType::Regex,
            RuleTypeArg::Variable => RuleType::Variable,
            RuleTypeArg::String => RuleType::String,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MaskModeArg {
    DirectText,
    VariableValue,
}

impl From<MaskModeArg> for MaskingMode {
    fn from(arg: MaskModeArg) -> Self {
        match arg {
            MaskModeArg::DirectText => MaskingMode::DirectText,
            MaskModeArg::VariableValue => MaskingMode::VariableValue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Tsv,
    Json,
}

impl From<FormatArg> for RuleFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tsv => RuleFormat::Tsv,
            FormatArg::Json => RuleFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_rule_add() {
        let cli = Cli::try_parse_from([
            "privscan", "rules", "add", "--name", "Badge", "--type", "regex", "--pattern", r"B-\d+",
        ])
        .unwrap();
        match cli.command {
            Commands::Rules(RulesCommand::Add { name, rule_type, .. }) => {
                assert_eq!(name, "Badge");
                assert_eq!(RuleType::from(rule_type), RuleType::Regex);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn follow_conflicts_with_input_file() {
        assert!(Cli::try_parse_from(["privscan", "scan", "--follow", "-i", "x.txt"]).is_err());
    }

    #[test]
    fn json_help_states_offset_units() {
        let mut cmd = Cli::command();
        let scan = cmd.find_subcommand_mut("scan").unwrap();
        let json = scan.get_arguments().find(|a| a.get_id() == "json").unwrap();
        let help = json.get_help().unwrap().to_string();
        assert!(help.contains("UTF-8 byte offsets"));
        assert!(help.contains("characters"));
    }

    #[test]
    fn edit_accepts_empty_description() {
        let cli = Cli::try_parse_from(["privscan", "rules", "edit", "3", "--description", ""]).unwrap();
        match cli.command {
            Commands::Rules(RulesCommand::Edit { id, description, .. }) => {
                assert_eq!(id, 3);
                assert_eq!(description.as_deref(), Some(""));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

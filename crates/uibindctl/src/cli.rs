use std::path::PathBuf;

use bindconfig::{parse_bool_style, parse_lane_order, parse_scope, BoolStyle, LaneOrder, ScopeMode};
use clap::{Args, Parser, Subcommand};
use uibind::ElementFormat;

#[derive(Parser, Debug)]
#[command(
    name = "uibindctl",
    author,
    version,
    about = "Replays ui_bind uniform writes and prints the resulting preprocessor definitions"
)]
pub struct Cli {
    /// Configuration file (defaults to `uibind.toml` in the config directory).
    #[arg(long, global = true, value_name = "FILE", env = "UIBINDCTL_CONFIG")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a JSON script of uniform writes, flushing at every frame boundary.
    Replay(ReplayArgs),
    /// Render a single uniform value as definition text.
    Format(FormatArgs),
    /// Inspect configuration locations.
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Replay script (JSON).
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Print the replay report as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Element format: bool, int, uint, float, their min16 forms, or unknown.
    #[arg(long, value_name = "FORMAT", value_parser = parse_element_format)]
    pub format: ElementFormat,

    #[arg(long, default_value_t = 1)]
    pub rows: u32,

    #[arg(long, default_value_t = 1)]
    pub columns: u32,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Lane values in upload order (numbers, or true/false for bool).
    #[arg(value_name = "VALUES", allow_negative_numbers = true)]
    pub values: Vec<String>,
}

/// Per-invocation overrides for the configured options.
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Annotation key to read the binding name from.
    #[arg(long, value_name = "KEY")]
    pub annotation: Option<String>,

    /// Lane order: `row-major` or the legacy `column-major`.
    #[arg(long, value_name = "ORDER", value_parser = parse_lane_order)]
    pub lane_order: Option<LaneOrder>,

    /// Boolean text: `numeric` (1/0) or the legacy `words` (true/false).
    #[arg(long, value_name = "STYLE", value_parser = parse_bool_style)]
    pub bool_style: Option<BoolStyle>,

    /// Definition scope: `effect` or the legacy `global`.
    #[arg(long, value_name = "SCOPE", value_parser = parse_scope)]
    pub scope: Option<ScopeMode>,

    /// Flush even when the host reports no loaded effects.
    #[arg(long)]
    pub flush_without_effects: bool,
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config directory and file.
    Where,
    /// Print the effective options after applying the config file.
    Show,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_element_format(value: &str) -> Result<ElementFormat, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("element format must not be empty".to_string());
    }
    trimmed.parse()
}

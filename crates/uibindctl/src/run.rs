use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use bindconfig::{BindConfig, BindOptions};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uibind::{
    render, replay, ReplayReport, Script, TextFormat, UniformShape, UniformSnapshot, WriteSpec,
};

use crate::cli::{ConfigAction, FormatArgs, OverrideArgs, ReplayArgs};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves options from an explicit config file, the default config file if
/// present, or the built-in defaults.
pub fn load_options(explicit: Option<&Path>, paths: &AppPaths) -> Result<BindOptions> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (paths.config_file(), false),
    };

    if !path.exists() {
        if required {
            bail!("config file {} does not exist", path.display());
        }
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return Ok(BindOptions::default());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config = BindConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load config file at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config.options())
}

pub fn apply_overrides(mut options: BindOptions, overrides: &OverrideArgs) -> Result<BindOptions> {
    if let Some(annotation) = &overrides.annotation {
        let trimmed = annotation.trim();
        if trimmed.is_empty() {
            bail!("--annotation must not be empty");
        }
        options.annotation = trimmed.to_string();
    }
    if let Some(lane_order) = overrides.lane_order {
        options.lane_order = lane_order;
    }
    if let Some(bool_style) = overrides.bool_style {
        options.bool_style = bool_style;
    }
    if let Some(scope) = overrides.scope {
        options.scope = scope;
    }
    if overrides.flush_without_effects {
        options.skip_without_effects = false;
    }
    Ok(options)
}

pub fn run_replay(args: &ReplayArgs, options: BindOptions) -> Result<()> {
    let contents = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read replay script at {}", args.script.display()))?;
    let script = Script::from_json_str(&contents)
        .with_context(|| format!("invalid replay script at {}", args.script.display()))?;

    tracing::info!(
        script = %args.script.display(),
        variables = script.variables.len(),
        frames = script.frames.len(),
        lane_order = %options.lane_order,
        bool_style = %options.bool_style,
        scope = %options.scope,
        "replaying uniform writes"
    );
    let report = replay(&script, options)?;

    if args.json {
        let serialized =
            serde_json::to_string_pretty(&report).context("failed to serialize replay report")?;
        println!("{serialized}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ReplayReport) {
    for frame in &report.frames {
        if let Some(pending) = frame.deferred {
            println!("frame {}: deferred {pending} binding(s); no effects loaded", frame.frame);
            continue;
        }
        if frame.applied.is_empty() {
            println!("frame {}: nothing to apply", frame.frame);
            continue;
        }
        println!("frame {}: applied {} definition(s)", frame.frame, frame.applied.len());
        for call in &frame.applied {
            match &call.scope {
                Some(scope) => println!("  [{scope}] {}={}", call.key, call.value),
                None => println!("  {}={}", call.key, call.value),
            }
        }
    }
}

pub fn run_format(args: &FormatArgs, options: BindOptions) -> Result<()> {
    let shape = UniformShape::new(args.rows, args.columns);
    check_value_count(args.values.len(), shape)?;

    let values = args
        .values
        .iter()
        .map(String::as_str)
        .map(parse_value)
        .collect::<Result<Vec<_>>>()?;
    let write = WriteSpec {
        variable: "value".to_string(),
        values: Some(values),
        bytes: None,
    };
    let bytes = write.encode(args.format)?;

    let Some(snapshot) = UniformSnapshot::decode(args.format, shape, &bytes) else {
        bail!(
            "a {}x{} uniform does not fit in a single 4x4 value",
            args.rows,
            args.columns
        );
    };
    let text = render(
        &snapshot,
        TextFormat::new(options.lane_order, options.bool_style),
    );
    println!("{text}");
    Ok(())
}

fn check_value_count(count: usize, shape: UniformShape) -> Result<()> {
    let lanes = shape.lane_count();
    if count > lanes {
        bail!(
            "{count} values given for a {}x{} uniform; at most {lanes} are rendered",
            shape.rows,
            shape.columns
        );
    }
    Ok(())
}

fn parse_value(raw: &str) -> Result<Value> {
    serde_json::from_str(raw.trim()).with_context(|| format!("invalid lane value '{raw}'"))
}

pub fn run_config(action: &ConfigAction, explicit: Option<&Path>, paths: &AppPaths) -> Result<()> {
    match action {
        ConfigAction::Where => {
            println!("config dir:  {}", paths.config_dir().display());
            match explicit {
                Some(path) => println!("config file: {} (explicit)", path.display()),
                None => {
                    let file = paths.config_file();
                    let status = if file.exists() { "present" } else { "missing" };
                    println!("config file: {} ({status})", file.display());
                }
            }
        }
        ConfigAction::Show => {
            let options = load_options(explicit, paths)?;
            println!("annotation:           {}", options.annotation);
            println!("lane_order:           {}", options.lane_order);
            println!("bool_style:           {}", options.bool_style);
            println!("scope:                {}", options.scope);
            println!("skip_without_effects: {}", options.skip_without_effects);
        }
    }
    Ok(())
}

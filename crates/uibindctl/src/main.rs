mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::Command;
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let paths = AppPaths::discover()?;
    let explicit = cli.config.as_deref();

    match cli.command {
        Command::Replay(args) => {
            let options = run::load_options(explicit, &paths)?;
            let options = run::apply_overrides(options, &args.overrides)?;
            run::run_replay(&args, options)
        }
        Command::Format(args) => {
            let options = run::load_options(explicit, &paths)?;
            let options = run::apply_overrides(options, &args.overrides)?;
            run::run_format(&args, options)
        }
        Command::Config(config_cmd) => run::run_config(&config_cmd.action, explicit, &paths),
    }
}

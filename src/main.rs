use clap::Parser;
use pageflow::cli::commands::{cmd_inspect, cmd_list, cmd_run, init_tracing};
use pageflow::cli::config::{Cli, Commands, resolve_run_settings};
use pageflow::fixture::HarnessConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Run {
            suite,
            format,
            output,
            jobs,
        } => {
            let config = HarnessConfig::load(cli.config.as_deref())?;
            // Resolve run settings: CLI > config > defaults
            let settings = resolve_run_settings(&config, format.as_deref(), output.as_deref(), jobs);
            let all_passed = cmd_run(config, suite.as_deref(), &settings)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::List => {
            print!("{}", cmd_list());
        }
        Commands::Inspect { artifact, max_rows } => {
            print!("{}", cmd_inspect(&artifact, max_rows)?);
        }
    }

    Ok(())
}

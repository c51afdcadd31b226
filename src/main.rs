use anyhow::Result;
use clap::Parser;
use skelly::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise warnings only, errors only with --quiet
    let default_level = if cli.quiet { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Plan(args) => skelly::cli_ext::run_plan(args, &ctx),
        Commands::Apply(args) => {
            let code = skelly::cli_ext::run_apply(args, &ctx)?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::Init(args) => skelly::infra::config::init(args, &ctx),
        Commands::Completions(args) => skelly::completion::run(args, &ctx),
    }
}

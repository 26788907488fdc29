use clap::Parser;
use helm_migrate::config::Config;
use helm_migrate::error::Result;
use helm_migrate::output::{self, Format};
use helm_migrate::plan::Plan;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "helm-migrate",
    version,
    about = "CI step that migrates Helm v2 releases to Helm v3"
)]
struct Cli {
    /// Error output format
    #[arg(long, value_enum, default_value = "json", env = "PLUGIN_FORMAT")]
    format: Format,
    #[command(flatten)]
    config: Config,
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut plan = Plan::new(&cli.config)?;
    plan.prepare()?;
    plan.execute()
}

fn main() {
    let cli = Cli::parse();
    let format = cli.format;
    init_tracing(cli.config.debug);

    if let Err(e) = run(cli) {
        eprintln!("{}", output::render_error(&e, format));
        std::process::exit(1);
    }
}

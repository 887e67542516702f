mod args;
mod commands {
    automod::dir!(pub "src/commands");
}

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::HostArgs;

#[derive(Parser)]
#[command(name = "tsweb", version, about = "Compiler-host filesystem utilities")]
struct Cli {
    #[command(flatten)]
    host: HostArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files below a directory the way a compiler host sees them
    Ls(commands::ls::Args),
    /// Print files through the cache
    Cat(commands::cat::Args),
    /// Find tsconfig.json files below a directory
    Configs(commands::configs::Args),
    /// Print the SHA-256 digest of files
    Hash(commands::hash::Args),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let fs = cli.host.build()?;

    match cli.command {
        Commands::Ls(args) => commands::ls::run(&fs, args).await,
        Commands::Cat(args) => commands::cat::run(&fs, args).await,
        Commands::Configs(args) => commands::configs::run(&fs, args).await,
        Commands::Hash(args) => commands::hash::run(&fs, args).await,
    }
}

//! Configs command - discover project configurations.

use tsweb_fs::{SyncFs, find_project_configs};

#[derive(clap::Args)]
pub struct Args {
    /// Directory to search, relative to the project root
    #[arg(default_value = ".")]
    pub path: String,
}

pub async fn run(fs: &SyncFs, args: Args) -> anyhow::Result<()> {
    let configs = find_project_configs(fs, &args.path).await?;
    if configs.is_empty() {
        eprintln!("no tsconfig.json found below {}", fs.resolve(&args.path));
    }
    for config in configs {
        println!("{config}");
    }
    Ok(())
}

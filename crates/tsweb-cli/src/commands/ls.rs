//! Ls command - recursive listing with compiler-host filters.

use tsweb_fs::{CompilerHost, SyncFs, run_until_ready};

#[derive(clap::Args)]
pub struct Args {
    /// Directory to list, relative to the project root
    #[arg(default_value = ".")]
    pub path: String,

    /// Only list files ending with this suffix (repeatable)
    #[arg(short = 'e', long = "ext")]
    pub extensions: Vec<String>,

    /// Skip files matching this glob (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub excludes: Vec<String>,

    /// Only list files matching this glob; every one given must match (repeatable)
    #[arg(short = 'i', long = "include")]
    pub includes: Vec<String>,

    /// Maximum number of directory levels to list
    #[arg(short, long)]
    pub depth: Option<u32>,
}

pub async fn run(fs: &SyncFs, args: Args) -> anyhow::Result<()> {
    let files = run_until_ready(|| {
        fs.read_directory(
            &args.path,
            &args.extensions,
            &args.excludes,
            &args.includes,
            args.depth,
        )
    })
    .await?;

    for file in files {
        println!("{file}");
    }
    Ok(())
}

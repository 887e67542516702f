//! Hash command - content digests as the compiler host computes them.

use anyhow::bail;
use tsweb_fs::{CompilerHost, SyncFs, prefetch, run_until_ready};

#[derive(clap::Args)]
pub struct Args {
    /// Files to hash, relative to the project root
    #[arg(required = true)]
    pub files: Vec<String>,
}

pub async fn run(fs: &SyncFs, args: Args) -> anyhow::Result<()> {
    for line in digests(fs, &args.files).await? {
        println!("{line}");
    }
    Ok(())
}

/// One `<digest>  <file>` line per file, in argument order.
async fn digests(fs: &SyncFs, files: &[String]) -> anyhow::Result<Vec<String>> {
    prefetch(fs, files).await;

    let mut lines = Vec::with_capacity(files.len());
    for file in files {
        let Some(content) = run_until_ready(|| fs.read_file(file, None)).await? else {
            bail!("cannot read {}", fs.resolve(file));
        };
        lines.push(format!("{}  {}", fs.create_sha256_hash(&content)?, file));
    }
    Ok(lines)
}

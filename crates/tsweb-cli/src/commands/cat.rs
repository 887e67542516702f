//! Cat command - print files read through the cache.

use std::sync::Arc;

use anyhow::bail;
use tsweb_fs::{CompilerHost, SyncFs, prefetch, run_until_ready};

#[derive(clap::Args)]
pub struct Args {
    /// Files to print, relative to the project root
    #[arg(required = true)]
    pub files: Vec<String>,
}

pub async fn run(fs: &SyncFs, args: Args) -> anyhow::Result<()> {
    for content in contents(fs, &args.files).await? {
        print!("{content}");
    }
    Ok(())
}

async fn contents(fs: &SyncFs, files: &[String]) -> anyhow::Result<Vec<Arc<str>>> {
    prefetch(fs, files).await;

    let mut contents = Vec::with_capacity(files.len());
    for file in files {
        let Some(content) = run_until_ready(|| fs.read_file(file, None)).await? else {
            bail!("cannot read {}", fs.resolve(file));
        };
        contents.push(content);
    }
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsweb_fs::{HostOptions, TokioBackend, normalize};

    fn host(dir: &tempfile::TempDir) -> SyncFs {
        let root = normalize(&dir.path().to_string_lossy());
        SyncFs::new(TokioBackend::new(), HostOptions::new(root))
    }

    #[tokio::test]
    async fn reads_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/a.ts"), "export {};\n").unwrap();
        std::fs::write(dir.path().join("b.ts"), "b\n").unwrap();
        let fs = host(&dir);

        let contents = contents(&fs, &["src/a.ts".to_string(), "b.ts".to_string()])
            .await
            .unwrap();
        let contents: Vec<&str> = contents.iter().map(|c| c.as_ref()).collect();
        assert_eq!(contents, vec!["export {};\n", "b\n"]);
        assert_eq!(fs.cache().pending_len(), 0);
    }

    #[tokio::test]
    async fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fs = host(&dir);

        let err = contents(&fs, &["gone.ts".to_string()]).await.unwrap_err();
        assert_eq!(err.to_string(), format!("cannot read {}", fs.resolve("gone.ts")));
        assert!(!fs.file_exists("gone.ts").unwrap());
    }
}

//! Shared argument definitions.

use std::path::PathBuf;

use anyhow::Context;
use tsweb_fs::{HostOptions, SyncFs, TokioBackend, normalize, resolve};

/// Host configuration from the command line.
///
/// Flags override values loaded from `--config`.
#[derive(clap::Args, Clone, Default)]
pub struct HostArgs {
    /// Project root; relative paths resolve against it (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// Root that exclude/include patterns are relative to (defaults to the project root)
    #[arg(long, global = true)]
    pub workspace_root: Option<String>,

    /// Treat file names as case-insensitive
    #[arg(long, global = true)]
    pub case_insensitive: bool,

    /// JSON file with host options (kebab-case keys)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl HostArgs {
    pub fn to_host_options(&self) -> anyhow::Result<HostOptions> {
        let current_dir = std::env::current_dir().context("failed to get current directory")?;
        let current_dir = normalize(&current_dir.to_string_lossy());

        let mut options = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                HostOptions::from_json(&text)
                    .with_context(|| format!("invalid host options in {}", path.display()))?
            }
            None => HostOptions::new(current_dir.as_str()),
        };

        if let Some(root) = &self.root {
            options.project_root = root.clone();
        }
        options.project_root = resolve(&current_dir, &options.project_root);

        if let Some(workspace_root) = &self.workspace_root {
            options.workspace_root = Some(workspace_root.clone());
        }
        options.workspace_root = options
            .workspace_root
            .as_deref()
            .map(|workspace_root| resolve(&current_dir, workspace_root));

        if self.case_insensitive {
            options.case_sensitive = false;
        }
        Ok(options)
    }

    pub fn build(&self) -> anyhow::Result<SyncFs> {
        let options = self.to_host_options()?;
        tracing::debug!(root = %options.project_root, "using project root");
        Ok(SyncFs::new(TokioBackend::new(), options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "project-root": "/from-config", "workspace-root": "/ws", "new-line": "\r\n" }}"#
        )
        .unwrap();

        let args = HostArgs {
            root: Some("/from-flag".to_string()),
            case_insensitive: true,
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let options = args.to_host_options().unwrap();

        assert_eq!(options.project_root, "/from-flag");
        assert_eq!(options.workspace_root.as_deref(), Some("/ws"));
        assert_eq!(options.new_line, "\r\n");
        assert!(!options.case_sensitive);
    }

    #[test]
    fn relative_root_resolves_against_current_dir() {
        let args = HostArgs {
            root: Some("sub/../proj".to_string()),
            ..Default::default()
        };
        let options = args.to_host_options().unwrap();
        assert!(options.project_root.ends_with("/proj"), "{}", options.project_root);
        assert!(tsweb_fs::is_absolute(&options.project_root));
    }
}

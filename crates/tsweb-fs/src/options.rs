//! Host configuration.

use serde::Deserialize;

/// Settings for one [`SyncFs`](crate::SyncFs) instance.
///
/// Deserializes from kebab-case keys; every key is optional.
///
/// ```
/// use tsweb_fs::HostOptions;
///
/// let options = HostOptions::from_json(r#"{ "project-root": "/proj", "case-sensitive": false }"#).unwrap();
/// assert_eq!(options.project_root, "/proj");
/// assert_eq!(options.pattern_root(), "/proj");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct HostOptions {
    /// Relative paths resolve against this directory.
    pub project_root: String,
    /// Exclude and include patterns are relative to this directory.
    /// Defaults to the project root.
    pub workspace_root: Option<String>,
    pub case_sensitive: bool,
    pub new_line: String,
    /// Command-line arguments reported to the compiler.
    pub args: Vec<String>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            project_root: "/".to_string(),
            workspace_root: None,
            case_sensitive: true,
            new_line: "\n".to_string(),
            args: Vec::new(),
        }
    }
}

impl HostOptions {
    pub fn new(project_root: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn pattern_root(&self) -> &str {
        self.workspace_root.as_deref().unwrap_or(&self.project_root)
    }
}

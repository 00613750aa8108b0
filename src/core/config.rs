//! Deploy configuration from YAML

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

/// Default commit message: local time, e.g. `2017-03-09 7:05:02`
pub const DEFAULT_COMMIT_MESSAGE_FORMAT: &str = "%Y-%m-%d %-H:%M:%S";

/// Branch-publishing strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Split the build directory into a temp branch and force-push it
    #[default]
    SubtreeSplit,
    /// Commit everything and push to a pre-configured branch
    DirectPush,
}

/// What happens to the temporary split branch when the push fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupPolicy {
    /// Delete it whenever it was created
    #[default]
    Always,
    /// Delete it only after a successful push, keeping it for diagnosis otherwise
    OnSuccess,
}

/// Top-level deploy configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Name shown in progress output
    #[serde(default = "default_name")]
    pub name: String,

    /// git executable (looked up on PATH)
    #[serde(default = "default_git")]
    pub git: String,

    /// Repository root; defaults to the current directory
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Build output directory, relative to the repository root
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Remote to publish to
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub strategy: Strategy,

    /// strftime format of the generated commit message
    #[serde(default = "default_commit_message_format")]
    pub commit_message_format: String,

    #[serde(default)]
    pub subtree_split: SubtreeSplitConfig,

    #[serde(default)]
    pub direct_push: DirectPushConfig,
}

/// Settings for the subtree-split strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtreeSplitConfig {
    /// Development branch checked out before splitting
    #[serde(default = "default_source_branch")]
    pub source_branch: String,

    /// Remote branch that receives the build output
    #[serde(default = "default_published_branch")]
    pub published_branch: String,

    /// Local branch created by the split and deleted afterwards
    #[serde(default = "default_temp_branch")]
    pub temp_branch: String,

    /// Commit the working tree first (when the build output is tracked)
    #[serde(default)]
    pub commit_build: bool,

    #[serde(default)]
    pub cleanup: CleanupPolicy,
}

/// Settings for the direct-push strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectPushConfig {
    /// Target branch; `None` pushes to the configured upstream
    #[serde(default = "default_direct_branch")]
    pub branch: Option<String>,

    /// Push only the build directory with `git subtree push`
    #[serde(default = "default_true")]
    pub subtree: bool,
}

fn default_name() -> String {
    "site".to_string()
}

fn default_git() -> String {
    "git".to_string()
}

fn default_build_dir() -> String {
    "dist".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_commit_message_format() -> String {
    DEFAULT_COMMIT_MESSAGE_FORMAT.to_string()
}

fn default_source_branch() -> String {
    "master".to_string()
}

fn default_published_branch() -> String {
    "gh-pages".to_string()
}

fn default_temp_branch() -> String {
    "gh-pages-deploy".to_string()
}

fn default_direct_branch() -> Option<String> {
    Some("site".to_string())
}

fn default_true() -> bool {
    true
}

impl Default for SubtreeSplitConfig {
    fn default() -> Self {
        Self {
            source_branch: default_source_branch(),
            published_branch: default_published_branch(),
            temp_branch: default_temp_branch(),
            commit_build: false,
            cleanup: CleanupPolicy::default(),
        }
    }
}

impl Default for DirectPushConfig {
    fn default() -> Self {
        Self {
            branch: default_direct_branch(),
            subtree: true,
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            git: default_git(),
            working_dir: None,
            build_dir: default_build_dir(),
            remote: default_remote(),
            strategy: Strategy::default(),
            commit_message_format: default_commit_message_format(),
            subtree_split: SubtreeSplitConfig::default(),
            direct_push: DirectPushConfig::default(),
        }
    }
}

/// Leading character and allowed characters of a branch or remote name
const REF_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._/-]*$";

/// Check a branch or remote name against git's ref-name rules (a safe subset)
pub fn validate_ref_name(kind: &str, name: &str) -> Result<()> {
    let pattern = Regex::new(REF_NAME_PATTERN)?;
    if !pattern.is_match(name) {
        anyhow::bail!("Invalid {} name '{}'", kind, name);
    }
    if name.contains("..") || name.contains("//") || name.ends_with('/') || name.ends_with(".lock")
    {
        anyhow::bail!("Invalid {} name '{}'", kind, name);
    }
    Ok(())
}

impl DeployConfig {
    /// Load deploy configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse deploy configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: DeployConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the deploy configuration
    pub fn validate(&self) -> Result<()> {
        if self.git.trim().is_empty() {
            anyhow::bail!("git executable must not be empty");
        }

        let build_dir = Path::new(&self.build_dir);
        if self.build_dir.trim().is_empty() {
            anyhow::bail!("build_dir must not be empty");
        }
        if build_dir.is_absolute()
            || build_dir
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            anyhow::bail!(
                "build_dir '{}' must be a path inside the repository",
                self.build_dir
            );
        }

        validate_ref_name("remote", &self.remote)?;

        let mut rendered = String::new();
        let now = chrono::Local::now();
        if self.commit_message_format.trim().is_empty()
            || write!(rendered, "{}", now.format(&self.commit_message_format)).is_err()
        {
            anyhow::bail!(
                "Invalid commit_message_format '{}'",
                self.commit_message_format
            );
        }

        match self.strategy {
            Strategy::SubtreeSplit => self.validate_subtree_split()?,
            Strategy::DirectPush => self.validate_direct_push()?,
        }

        Ok(())
    }

    fn validate_subtree_split(&self) -> Result<()> {
        let split = &self.subtree_split;
        validate_ref_name("source branch", &split.source_branch)?;
        validate_ref_name("published branch", &split.published_branch)?;
        validate_ref_name("temp branch", &split.temp_branch)?;

        // The temp branch is force-deleted at the end of the run.
        if split.temp_branch == split.source_branch {
            anyhow::bail!(
                "temp_branch '{}' must differ from source_branch",
                split.temp_branch
            );
        }
        if split.temp_branch == split.published_branch {
            anyhow::bail!(
                "temp_branch '{}' must differ from published_branch",
                split.temp_branch
            );
        }
        Ok(())
    }

    fn validate_direct_push(&self) -> Result<()> {
        let push = &self.direct_push;
        match &push.branch {
            Some(branch) => validate_ref_name("branch", branch)?,
            None if push.subtree => {
                anyhow::bail!("direct_push.subtree requires direct_push.branch to be set")
            }
            None => {}
        }
        Ok(())
    }

    /// Build directory resolved against the working directory
    pub fn build_path(&self) -> PathBuf {
        match &self.working_dir {
            Some(dir) => dir.join(&self.build_dir),
            None => PathBuf::from(&self.build_dir),
        }
    }
}

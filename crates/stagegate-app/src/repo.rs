// Rust guideline compliant 2026-10-15

//! Repository discovery and path management utilities.

use crate::error::{AppError, Result};
use stagegate_core::{Config, FileLimitStore, Item, LimitStore, Storage, TransitionRecord};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the repository directory.
pub const STAGEGATE_DIR: &str = ".stagegate";

/// Repository path metadata for a Stagegate workspace.
#[derive(Debug, Clone)]
pub struct RepoContext {
    root: PathBuf,
    stagegate_dir: PathBuf,
    ideas_path: PathBuf,
    transitions_path: PathBuf,
    limits_path: PathBuf,
    config_path: PathBuf,
}

impl RepoContext {
    /// Discovers a Stagegate repository starting from an optional root.
    ///
    /// # Arguments
    ///
    /// * `repo_root` - Optional repository root to pin discovery
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository root cannot be resolved
    /// - The `.stagegate` directory is missing
    pub fn discover(repo_root: Option<&Path>) -> Result<Self> {
        let context = Self::at(repo_root)?;
        if !context.stagegate_dir.exists() {
            return Err(AppError::RepoNotInitialized {
                path: context.stagegate_dir,
            });
        }
        Ok(context)
    }

    /// Creates the `.stagegate` directory with default configuration, empty
    /// item and record files, and initialized WIP scopes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository is already initialized
    /// - A file cannot be written
    pub fn init(repo_root: Option<&Path>) -> Result<Self> {
        let context = Self::at(repo_root)?;
        if context.stagegate_dir.exists() {
            return Err(AppError::InvalidInput(format!(
                "Stagegate repository already initialized at {}",
                context.stagegate_dir.display()
            )));
        }

        fs::create_dir_all(&context.stagegate_dir)?;
        fs::File::create(&context.ideas_path)?;
        fs::File::create(&context.transitions_path)?;

        let config = Config::default();
        config.save(&context.stagegate_dir)?;
        let created = context
            .open_limits()?
            .initialize(&config.wip_defaults()?)?;
        tracing::info!(
            path = %context.stagegate_dir.display(),
            scopes = created,
            "repository initialized"
        );

        Ok(context)
    }

    fn at(repo_root: Option<&Path>) -> Result<Self> {
        let root = match repo_root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let stagegate_dir = root.join(STAGEGATE_DIR);

        Ok(Self {
            root,
            ideas_path: stagegate_dir.join("ideas.jsonl"),
            transitions_path: stagegate_dir.join("transitions.jsonl"),
            limits_path: stagegate_dir.join("limits.jsonl"),
            config_path: stagegate_dir.join("config.toml"),
            stagegate_dir,
        })
    }

    /// Returns the repository root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Returns the `.stagegate` directory path.
    #[must_use]
    pub fn stagegate_dir(&self) -> &Path {
        self.stagegate_dir.as_path()
    }

    /// Returns the items JSONL path.
    #[must_use]
    pub fn ideas_path(&self) -> &Path {
        self.ideas_path.as_path()
    }

    /// Returns the transition records JSONL path.
    #[must_use]
    pub fn transitions_path(&self) -> &Path {
        self.transitions_path.as_path()
    }

    /// Returns the WIP limits JSONL path.
    #[must_use]
    pub fn limits_path(&self) -> &Path {
        self.limits_path.as_path()
    }

    /// Returns the config TOML path.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        self.config_path.as_path()
    }

    /// Opens storage for the items file.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be initialized.
    pub fn open_items(&self) -> Result<Storage<Item>> {
        Ok(Storage::new(self.ideas_path.clone())?)
    }

    /// Opens storage for the append-only transition log.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be initialized.
    pub fn open_transitions(&self) -> Result<Storage<TransitionRecord>> {
        Ok(Storage::new(self.transitions_path.clone())?)
    }

    /// Opens the file-backed WIP counter store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be initialized.
    pub fn open_limits(&self) -> Result<FileLimitStore> {
        Ok(FileLimitStore::new(self.limits_path.clone())?)
    }

    /// Loads repository configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::load(self.stagegate_dir())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagegate_core::Scope;
    use tempfile::TempDir;

    #[test]
    fn test_discover_requires_init() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = RepoContext::discover(Some(temp_dir.path())).unwrap_err();
        assert!(matches!(err, AppError::RepoNotInitialized { .. }));
    }

    #[test]
    fn test_init_lays_out_repository() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = RepoContext::init(Some(temp_dir.path())).expect("init");

        assert!(repo.ideas_path().exists());
        assert!(repo.transitions_path().exists());
        assert!(repo.config_path().exists());
        let limits = repo.open_limits().expect("limits");
        let portfolio = limits
            .get(&Scope::Portfolio)
            .expect("read")
            .expect("portfolio scope");
        assert_eq!(portfolio.limit, 100);

        let found = RepoContext::discover(Some(temp_dir.path())).expect("discover");
        assert_eq!(found.stagegate_dir(), repo.stagegate_dir());
    }

    #[test]
    fn test_init_twice_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        RepoContext::init(Some(temp_dir.path())).expect("init");
        let err = RepoContext::init(Some(temp_dir.path())).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Read-only view of the process environment used for platform detection
/// and context loading.
///
/// Detection and loading never touch `std::env` directly; they go through
/// this trait so that every platform can be exercised from a plain map.
pub trait EnvSource {
    /// Value of `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;

    /// Whether `path` exists on the filesystem.
    fn path_exists(&self, path: &Path) -> bool;

    /// Current working directory, if it can be determined.
    fn current_dir(&self) -> Option<PathBuf>;

    /// Value of `key`, or the empty string when unset.
    fn get(&self, key: &str) -> String {
        self.var(key).unwrap_or_default()
    }

    /// True when `key` is set to a non-empty value.
    fn is_set(&self, key: &str) -> bool {
        self.var(key).is_some_and(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn current_dir(&self) -> Option<PathBuf> {
        std::env::current_dir().ok()
    }
}

/// Fixed, in-memory environment.
///
/// Useful for tests and for replaying a captured CI environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: BTreeMap<String, String>,
    files: Vec<PathBuf>,
    cwd: Option<PathBuf>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut env = Self::new();
        for (k, v) in pairs {
            env.vars.insert(k.to_string(), v.to_string());
        }
        env
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl EnvSource for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }

    fn current_dir(&self) -> Option<PathBuf> {
        self.cwd.clone()
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub secrets_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let project_root = discover_project_root();
        let data_dir = discover_data_dir(&project_root);
        Self::with_dirs(project_root, data_dir)
    }

    pub fn with_dirs(project_root: PathBuf, data_dir: PathBuf) -> Self {
        let log_dir = data_dir.join("logs");
        let secrets_path = data_dir.join("secrets.yaml");

        for dir in [&data_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            project_root,
            data_dir,
            log_dir,
            secrets_path,
        }
    }

    /// Resolves a configured path against the project root unless it is absolute.
    pub fn resolve(&self, raw: &Path) -> PathBuf {
        if raw.is_absolute() {
            return raw.to_path_buf();
        }
        self.project_root.join(raw)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("TRAVEL_RAG_ROOT") {
        return PathBuf::from(root);
    }

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if cwd.join("config.yml").exists() {
        return cwd;
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join("config.yml").exists() {
        return manifest_dir;
    }

    cwd
}

fn discover_data_dir(project_root: &Path) -> PathBuf {
    if let Ok(dir) = env::var("TRAVEL_RAG_DATA_DIR") {
        return PathBuf::from(dir);
    }
    project_root.to_path_buf()
}

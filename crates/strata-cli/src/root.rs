use std::path::{Path, PathBuf};
use strata_core::{config::CONFIG_FILE, store::DEFAULT_STATE_FILE};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `STRATA_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `strata.yaml` or `.strata`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_marked_ancestor(&cwd).unwrap_or(cwd)
}

fn find_marked_ancestor(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file() || dir.join(DEFAULT_STATE_FILE).exists())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_config_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{}\n").unwrap();
        let deep = dir.path().join("src/deep");
        std::fs::create_dir_all(&deep).unwrap();

        assert_eq!(find_marked_ancestor(&deep).as_deref(), Some(dir.path()));
    }

    #[test]
    fn finds_state_file_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_STATE_FILE), "{}").unwrap();
        let deep = dir.path().join("a");
        std::fs::create_dir_all(&deep).unwrap();

        assert_eq!(find_marked_ancestor(&deep).as_deref(), Some(dir.path()));
    }
}

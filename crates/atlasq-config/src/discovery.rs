//! Configuration file discovery.
//!
//! Collects `.atlasq.toml` files from the working directory upwards, then appends the
//! global `~/.atlasq.toml` if present.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".atlasq.toml";

/// Discovers all configuration files relevant to `cwd`.
///
/// Returns paths in precedence order: closest to `cwd` first, global last. A file
/// with `root = true` ends the walk and suppresses the global file.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if !candidate.is_file() {
            continue;
        }
        let stop = is_root_config(&candidate);
        configs.push(candidate);
        if stop {
            return configs;
        }
    }

    if let Some(global) = global_config_path()
        && global.is_file()
        && !configs.contains(&global)
    {
        configs.push(global);
    }

    configs
}

/// Returns the path to the global configuration file, if a home directory exists.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Checks if a path is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_support::TestDir;

    /// Discovered configs excluding the machine's global file.
    fn local(configs: &[PathBuf]) -> Vec<&PathBuf> {
        configs.iter().filter(|p| !is_global_config(p)).collect()
    }

    #[test]
    fn no_configs_found() {
        let dir = TestDir::new();
        let sub = dir.create_dir("a/b");
        assert!(local(&discover_config_files(&sub)).is_empty());
    }

    #[test]
    fn closest_config_comes_first() {
        let dir = TestDir::new();
        let outer = dir.create_config_at_root();
        let inner = dir.create_config("service");
        let cwd = dir.create_dir("service/src/bin");

        let configs = discover_config_files(&cwd);
        assert_eq!(local(&configs), [&inner, &outer]);
    }

    #[test]
    fn config_in_cwd_is_found() {
        let dir = TestDir::new();
        let config = dir.create_config_at_root();
        assert_eq!(local(&discover_config_files(dir.path())), [&config]);
    }

    #[test]
    fn directory_named_like_config_is_skipped() {
        let dir = TestDir::new();
        fs::create_dir_all(dir.path().join(CONFIG_FILENAME)).unwrap();
        let sub = dir.create_dir("sub");
        assert!(local(&discover_config_files(&sub)).is_empty());
    }

    #[test]
    fn root_config_stops_the_walk() {
        let dir = TestDir::new();
        let _outer = dir.create_config_at_root();
        let root = dir.create_root_config("project");
        let child = dir.create_config("project/api");
        let cwd = dir.create_dir("project/api/handlers");

        let configs = discover_config_files(&cwd);
        assert_eq!(configs, [child, root]);
    }

    #[test]
    fn root_false_keeps_walking() {
        let dir = TestDir::new();
        let outer = dir.create_config_at_root();
        let mid = dir.create_config_with_content("project", "root = false\n");
        let cwd = dir.create_dir("project/src");

        let configs = discover_config_files(&cwd);
        assert_eq!(local(&configs), [&mid, &outer]);
    }

    #[test]
    fn global_path_uses_config_filename() {
        let path = global_config_path().unwrap();
        assert!(path.ends_with(CONFIG_FILENAME));
        assert!(is_global_config(&path));
        assert!(!is_global_config(Path::new("/elsewhere/.atlasq.toml")));
    }
}

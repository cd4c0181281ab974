// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use path_clean::clean;

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = path.to_path_buf();

    loop {
        let file_path = current.join(filename);
        if file_path.exists() {
            return Some(file_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// An explicit file wins (relative paths resolve against `cwd`), otherwise the
/// nearest `default_filename` in `cwd` or its parents. `None` means run on defaults.
pub fn resolve_config_path<P: Into<PathBuf>>(
    find_in_parent: FindInParent,
    cwd: P,
    default_filename: &str,
    cli_file: Option<P>,
) -> Option<PathBuf> {
    let cwd = cwd.into();

    if let Some(cli_file) = cli_file.map(Into::into) {
        if cli_file.is_absolute() {
            return Some(cli_file);
        }
        return Some(clean(cwd.join(cli_file)));
    }

    find_in_parent(&cwd, default_filename)
}

#[cfg(test)]
mod tests {
    use super::resolve_config_path;
    use std::path::{Path, PathBuf};

    fn not_found(_: &Path, _: &str) -> Option<PathBuf> {
        None
    }

    fn found(_: &Path, _: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/foo/tally.config.yaml"))
    }

    #[test]
    fn test_resolve_cli() {
        let path = resolve_config_path(
            not_found,
            PathBuf::from("/foo/bar"),
            "tally.config.yaml",
            None,
        );
        assert_eq!(path, None);

        let path = resolve_config_path(
            found, // should be overridden by the explicit file
            PathBuf::from("/foo/bar"),
            "tally.config.yaml",
            Some(PathBuf::from("/my/absolute/conf.yaml")),
        );
        assert_eq!(path, Some(PathBuf::from("/my/absolute/conf.yaml")));

        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            "tally.config.yaml",
            Some(PathBuf::from("../conf/./tally.yaml")),
        );
        assert_eq!(path, Some(PathBuf::from("/foo/conf/tally.yaml")));

        let path = resolve_config_path(found, PathBuf::from("/foo/bar"), "tally.config.yaml", None);
        assert_eq!(path, Some(PathBuf::from("/foo/tally.config.yaml")));
    }
}

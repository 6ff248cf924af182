// Path helpers for owning-file names
//
// Owning files are reported relative to the workspace root with `/` separators, so trees built
// on different platforms name the same file the same way.

use anyhow::{Context, Result};
use std::path::{Path, MAIN_SEPARATOR};

/// Convert a path under `workspace_root` to a relative Unix-style path
///
/// Both paths are canonicalized when they exist so symlinked roots (`/var` vs `/private/var`
/// on macOS) still compare equal.
///
/// # Examples
/// ```
/// // to_relative_unix_style("/home/dev/project/pkg/module.py", "/home/dev/project")
/// // => "pkg/module.py"
/// ```
pub fn to_relative_unix_style(absolute: &Path, workspace_root: &Path) -> Result<String> {
    let (path, root) = match (absolute.canonicalize(), workspace_root.canonicalize()) {
        (Ok(path), Ok(root)) => (path, root),
        _ => (absolute.to_path_buf(), workspace_root.to_path_buf()),
    };

    let relative = path.strip_prefix(&root).with_context(|| {
        format!(
            "File path '{}' is not within workspace root '{}'",
            path.display(),
            root.display()
        )
    })?;

    let relative = relative.to_str().context("Path contains invalid UTF-8")?;
    if MAIN_SEPARATOR == '\\' {
        Ok(relative.replace('\\', "/"))
    } else {
        Ok(relative.to_string())
    }
}

/// Module name for a source file: its file stem
pub fn module_name(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .with_context(|| format!("'{}' has no file name", path.display()))?;
    let stem = stem.to_str().context("File name contains invalid UTF-8")?;
    Ok(stem.to_string())
}

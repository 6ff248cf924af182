//! DocInfoManager - public entry point for building info trees
//!
//! Runs the per-file pipeline: configuration directives, comment extraction, parsing, then the
//! info-tree walk. Each file is independent, so batches are processed in parallel with rayon
//! and a failing file never affects the others.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::comments::extract_comments;
use crate::config::ExtractionConfig;
use crate::cst::parse_python;
use crate::errors::DocInfoError;
use crate::info::{InfoBuilder, InfoTree};
use crate::language::is_supported_path;
use crate::utils::paths::{module_name, to_relative_unix_style};

/// Result of processing a single file in a batch
#[derive(Debug)]
pub struct BatchFileResult {
    pub path: PathBuf,
    /// `None` when the file failed
    pub tree: Option<InfoTree>,
    pub error: Option<String>,
}

impl BatchFileResult {
    /// Create a successful result
    pub fn success(path: PathBuf, tree: InfoTree) -> Self {
        Self {
            path,
            tree: Some(tree),
            error: None,
        }
    }

    /// Create a failed result with error message
    pub fn error(path: PathBuf, error: String) -> Self {
        Self {
            path,
            tree: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.tree.is_some()
    }
}

/// Builds info trees for Python source files
#[derive(Debug, Clone, Default)]
pub struct DocInfoManager {
    config: ExtractionConfig,
}

impl DocInfoManager {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Build the info tree for source text that has already been read
    pub fn extract_source(
        &self,
        module_name: &str,
        file_path: &Path,
        source: &str,
    ) -> Result<InfoTree, DocInfoError> {
        let module_config = self.config.module_config(source);
        let comments = if self.config.include_comments {
            extract_comments(source)
        } else {
            Default::default()
        };
        let cst = parse_python(source, file_path)?;

        let tree = InfoBuilder::new(self.owning_file(file_path), comments)
            .with_config(module_config)
            .include_comments(self.config.include_comments)
            .build_module(module_name, &cst);

        debug!(
            "Extracted {} info nodes and {} imports from {}",
            tree.node_count(),
            tree.root().imports().map_or(0, |imports| imports.len()),
            file_path.display()
        );
        Ok(tree)
    }

    /// Read and process one file; the module name is the file stem
    pub fn extract_file(&self, path: &Path) -> Result<InfoTree, DocInfoError> {
        if !is_supported_path(path) {
            return Err(DocInfoError::UnsupportedFile {
                path: path.to_path_buf(),
            });
        }
        let source = std::fs::read_to_string(path).map_err(|source| DocInfoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = module_name(path).unwrap_or_else(|e| {
            warn!("Falling back to an empty module name: {}", e);
            String::new()
        });
        self.extract_source(&name, path, &source)
    }

    /// Process many files in parallel, one result per input path in input order
    pub fn extract_files_batch(&self, paths: &[PathBuf]) -> Vec<BatchFileResult> {
        paths
            .par_iter()
            .map(|path| match self.extract_file(path) {
                Ok(tree) => BatchFileResult::success(path.clone(), tree),
                Err(e) => {
                    warn!("Failed to extract {}: {}", path.display(), e);
                    BatchFileResult::error(path.clone(), e.to_string())
                }
            })
            .collect()
    }

    /// Path stored as the owning file of every node
    fn owning_file(&self, file_path: &Path) -> PathBuf {
        let Some(root) = &self.config.workspace_root else {
            return file_path.to_path_buf();
        };
        let absolute = if file_path.is_absolute() {
            file_path.to_path_buf()
        } else {
            root.join(file_path)
        };
        match to_relative_unix_style(&absolute, root) {
            Ok(relative) => PathBuf::from(relative),
            Err(e) => {
                debug!("Keeping path as given: {}", e);
                file_path.to_path_buf()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_extract_source() {
        let manager = DocInfoManager::default();
        let tree = manager
            .extract_source(
                "pets",
                Path::new("pets.py"),
                "# A pet\nclass Dog(Animal, Named):\n    \"\"\"Woof.\"\"\"\n",
            )
            .unwrap();

        let dog = tree.root().class("Dog").unwrap();
        assert_eq!(dog.base_class_names(), ["Animal", "Named"]);
        assert_eq!(dog.docstring(), "Woof.");
        assert_eq!(dog.comment_text(), " A pet\n");
        assert_eq!(tree.file(), Path::new("pets.py"));
    }

    #[test]
    fn test_extract_file_uses_stem_as_module_name() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "shapes.py", include_str!("../test_samples/shapes.py"));

        let tree = DocInfoManager::default().extract_file(&path).unwrap();
        assert_eq!(tree.root().name(), "shapes");
        assert_eq!(
            tree.root()
                .class("Shape")
                .and_then(|shape| shape.function("render"))
                .unwrap()
                .full_name(),
            "shapes.Shape.render"
        );
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.py");

        let err = DocInfoManager::default().extract_file(&missing).unwrap_err();
        assert!(matches!(err, DocInfoError::Io { .. }), "got {:?}", err);
        assert!(err.to_string().contains("missing.py"));
    }

    #[test]
    fn test_non_python_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.txt", "class NotCode:\n");

        let err = DocInfoManager::default().extract_file(&path).unwrap_err();
        assert!(matches!(err, DocInfoError::UnsupportedFile { .. }), "got {:?}", err);
    }

    #[test]
    fn test_batch_isolates_failures_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let first = write(&dir, "first.py", "def one():\n    pass\n");
        let missing = dir.path().join("missing.py");
        let last = write(&dir, "last.py", "class Two:\n    pass\n");

        let results = DocInfoManager::default().extract_files_batch(&[
            first.clone(),
            missing.clone(),
            last.clone(),
        ]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].path, first);
        assert!(results[0].is_success());
        assert!(results[0].tree.as_ref().unwrap().root().function("one").is_some());

        assert_eq!(results[1].path, missing);
        assert!(!results[1].is_success());
        assert!(results[1].error.as_ref().unwrap().contains("missing.py"));

        assert!(results[2].tree.as_ref().unwrap().root().class("Two").is_some());
    }

    #[test]
    fn test_workspace_root_makes_owning_file_relative() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        let path = write(&dir, "pkg/module.py", "x = 1\n");

        let config = ExtractionConfig {
            workspace_root: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let tree = DocInfoManager::new(config).extract_file(&path).unwrap();
        assert_eq!(tree.root().owning_file(), Path::new("pkg/module.py"));
    }

    #[test]
    fn test_comments_disabled() {
        let config = ExtractionConfig {
            include_comments: false,
            ..Default::default()
        };
        let tree = DocInfoManager::new(config)
            .extract_source("pets", Path::new("pets.py"), "# A pet\nclass Dog:\n    pass\n")
            .unwrap();
        assert_eq!(tree.root().class("Dog").unwrap().comment_text(), "");
    }

    #[test]
    fn test_malformed_directive_keeps_defaults() {
        let tree = DocInfoManager::default()
            .extract_source(
                "broken",
                Path::new("broken.py"),
                "# docinfo: docstring_format\n# docinfo: author = Someone\nx = 1\n",
            )
            .unwrap();
        assert_eq!(tree.root().docstring_format(), "StructuredText");
        assert_eq!(tree.root().config_value("author"), Some("Someone"));
    }
}

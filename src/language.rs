//! Language Support - tree-sitter language configuration
//!
//! ALL tree-sitter grammar configuration should go here to avoid duplication.
//! The analysis engine documents Python sources only; other extensions are reported as
//! unsupported so drivers can skip them before reading the file.

/// Get the tree-sitter grammar used to parse documented sources
pub fn python_language() -> tree_sitter::Language {
    tree_sitter_python::LANGUAGE.into()
}

/// Detect language from file extension
///
/// Returns the language name for extensions this crate documents.
pub fn detect_language_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "py" | "pyw" | "pyi" => Some("python"),
        _ => None,
    }
}

/// Whether a path names a source file this crate can document
pub fn is_supported_path(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(detect_language_from_extension)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_python_extensions_detected() {
        assert_eq!(detect_language_from_extension("py"), Some("python"));
        assert_eq!(detect_language_from_extension("pyi"), Some("python"));
        assert_eq!(detect_language_from_extension("rs"), None);
    }

    #[test]
    fn test_supported_path() {
        assert!(is_supported_path(Path::new("pkg/module.py")));
        assert!(!is_supported_path(Path::new("README.md")));
        assert!(!is_supported_path(Path::new("Makefile")));
    }
}

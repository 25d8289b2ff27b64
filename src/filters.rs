// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared file filtering rules applied by every search strategy.

use std::path::Path;

/// Extensions treated as searchable text. Every runner restricts itself to
/// these so the three strategies agree on what the corpus is.
pub const SEARCHABLE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "py", "go", "java", "c", "cpp", "h", "hpp", "cs", "rb", "php",
    "swift", "kt", "scala", "lua", "md", "txt", "json", "yaml", "yml", "toml", "html", "css",
];

/// Directory names excluded from every walk and every external-tool glob.
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".hg",
    ".svn",
    "target",
    "dist",
    "build",
    "out",
    "vendor",
    "__pycache__",
    ".cache",
];

/// True when a file extension is included in searching.
pub fn is_searchable_extension(ext: &str) -> bool {
    let lower = ext.to_ascii_lowercase();
    SEARCHABLE_EXTENSIONS
        .iter()
        .any(|candidate| *candidate == lower.as_str())
}

/// True when a directory name is excluded from traversal.
pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.iter().any(|candidate| *candidate == name)
}

/// File type of a path: the extension without the dot, lowercased.
pub fn file_type_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Detect the tree-sitter language name from a file extension.
pub fn detect_language(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "rs" => Some("rust"),
        "ts" => Some("typescript"),
        "tsx" => Some("tsx"),
        "js" | "jsx" => Some("javascript"),
        "py" => Some("python"),
        "go" => Some("go"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(is_searchable_extension("TS"));
        assert!(is_searchable_extension("rs"));
        assert!(!is_searchable_extension("exe"));
        assert!(!is_searchable_extension("png"));
    }

    #[test]
    fn excluded_dirs_cover_dependency_and_vcs_names() {
        for name in ["node_modules", ".git", "target", "dist", "__pycache__"] {
            assert!(is_excluded_dir(name), "{name} should be excluded");
        }
        assert!(!is_excluded_dir("src"));
    }

    #[test]
    fn file_type_strips_the_dot() {
        assert_eq!(file_type_of(&PathBuf::from("/a/b/app.TS")), "ts");
        assert_eq!(file_type_of(&PathBuf::from("/a/b/Makefile")), "");
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of tree-sitter languages supported by the symbol-aware runner.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tree_sitter::Language;

/// Map from language name to its compiled grammar.
pub static LANGUAGES: Lazy<HashMap<&'static str, Language>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(
        "typescript",
        Language::new(tree_sitter_typescript::LANGUAGE_TYPESCRIPT),
    );
    map.insert("tsx", Language::new(tree_sitter_typescript::LANGUAGE_TSX));
    map.insert(
        "javascript",
        Language::new(tree_sitter_javascript::LANGUAGE),
    );
    map.insert("python", Language::new(tree_sitter_python::LANGUAGE));
    map.insert("rust", Language::new(tree_sitter_rust::LANGUAGE));
    map.insert("go", Language::new(tree_sitter_go::LANGUAGE));
    map
});

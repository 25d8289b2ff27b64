// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parser module - AST parsing using tree-sitter

pub mod identifiers;
pub mod languages;

//! Imports-only scanner for Gno source files.
//!
//! Gno shares Go's syntax, so the Go tree-sitter grammar is used. Only the
//! package clause and the import declarations that directly follow it are
//! inspected: syntax errors further down the file do not fail the scan,
//! errors inside the header do.

use crate::error::GnoError;
use crate::queries::{GNO_HEADER_SCM, HeaderIndices};
use gnodriver_plugin::FileHeader;
use std::path::Path;
use std::sync::Arc;
use tree_sitter::{Node, Parser, Query, QueryCursor, StreamingIterator};

pub struct GnoHeaderParser {
    language: tree_sitter::Language,
    query: Arc<Query>,
    indices: HeaderIndices,
}

impl Clone for GnoHeaderParser {
    fn clone(&self) -> Self {
        Self {
            language: self.language.clone(),
            query: Arc::clone(&self.query),
            indices: self.indices,
        }
    }
}

impl GnoHeaderParser {
    pub fn new() -> Result<Self, GnoError> {
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        let query = Query::new(&language, GNO_HEADER_SCM)
            .map_err(|e| GnoError::Query(format!("{:?}", e)))?;
        let indices = HeaderIndices::new(&query)?;

        Ok(Self {
            language,
            query: Arc::new(query),
            indices,
        })
    }

    /// Scan the package clause and imports of one file.
    pub fn scan(&self, source: &str, path: &Path) -> Result<FileHeader, GnoError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| GnoError::Language(e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| syntax_error(path, None, "parser produced no tree"))?;
        let root = tree.root_node();
        let header_end = header_end(root, path)?;

        let mut cursor = QueryCursor::new();
        cursor.set_byte_range(0..header_end);
        let mut matches = cursor.matches(&self.query, root, source.as_bytes());

        let mut header = FileHeader::default();
        while let Some(mat) = matches.next() {
            for cap in mat.captures {
                let text = cap
                    .node
                    .utf8_text(source.as_bytes())
                    .map_err(|e| syntax_error(path, Some(cap.node), &e.to_string()))?;

                if cap.index == self.indices.package_name {
                    if header.package_name.is_empty() {
                        header.package_name = text.to_string();
                    }
                } else if cap.index == self.indices.import_path {
                    let import_path = unquote(text);
                    if !import_path.is_empty() {
                        header.imports.push(import_path.to_string());
                    }
                }
            }
        }

        if header.package_name.is_empty() {
            return Err(syntax_error(path, None, "expected 'package'"));
        }

        Ok(header)
    }
}

/// Byte offset where the header (package clause plus imports) ends.
fn header_end(root: Node, path: &Path) -> Result<usize, GnoError> {
    let mut walker = root.walk();
    let mut end = 0;
    let mut seen_package = false;

    for child in root.named_children(&mut walker) {
        match child.kind() {
            "comment" => continue,
            "package_clause" if !seen_package => seen_package = true,
            "import_declaration" if seen_package => {}
            _ => {
                if !seen_package {
                    return Err(syntax_error(path, Some(child), "expected 'package'"));
                }
                if child.is_error() && looks_like_import(child) {
                    let at = first_error(child).unwrap_or(child);
                    return Err(syntax_error(path, Some(at), "malformed import declaration"));
                }
                break;
            }
        }

        if child.has_error() {
            let at = first_error(child).unwrap_or(child);
            let msg = if at.is_missing() {
                format!("missing {}", at.kind())
            } else {
                "unexpected token in file header".to_string()
            };
            return Err(syntax_error(path, Some(at), &msg));
        }
        end = child.end_byte();
    }

    if !seen_package {
        return Err(syntax_error(path, None, "expected 'package'"));
    }
    Ok(end)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut walker = node.walk();
    for child in node.children(&mut walker) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

/// Whether a top-level error node is a broken import declaration rather
/// than broken code after the header.
fn looks_like_import(node: Node) -> bool {
    if node.child(0).is_some_and(|first| first.kind() == "import") {
        return true;
    }
    let mut walker = node.walk();
    node.children(&mut walker).any(|child| {
        matches!(
            child.kind(),
            "import_declaration" | "import_spec" | "import_spec_list"
        )
    })
}

fn unquote(literal: &str) -> &str {
    if literal.len() >= 2 {
        &literal[1..literal.len() - 1]
    } else {
        literal
    }
}

fn syntax_error(path: &Path, node: Option<Node>, msg: &str) -> GnoError {
    let (line, column) = node
        .map(|n| {
            let p = n.start_position();
            (p.row + 1, p.column + 1)
        })
        .unwrap_or((1, 1));
    GnoError::Syntax {
        path: path.display().to_string(),
        line,
        column,
        msg: msg.to_string(),
    }
}

use tree_sitter::{Node, Point};

use crate::{
    error::{Result, ToolsmithError},
    parser::types::{FunctionDecl, ModuleOutline, Segment, SyntaxError},
};

/// Tree-sitter backed scanner over top-level Rust items.
///
/// `async fn`, `pub fn`, `unsafe fn` and friends all parse as a single
/// `function_item` kind, so no variant filtering is needed beyond it. Outer
/// attributes and comments are siblings of the item in this grammar; the
/// scanner reattaches them so a declaration travels as one group.
pub struct SourceScanner {
    parser: tree_sitter::Parser,
}

impl SourceScanner {
    pub fn new() -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| ToolsmithError::InvalidState(format!("loading Rust grammar: {e}")))?;
        Ok(Self { parser })
    }

    /// Parse full module text into its outline. The outline owns copies of
    /// the relevant source slices, so the tree is dropped before returning.
    pub fn parse_module(&mut self, source: &str) -> Result<ModuleOutline, SyntaxError> {
        let tree = self.parse_tree(source)?;
        let root = tree.root_node();

        let mut cursor = root.walk();
        let children: Vec<Node> = root.named_children(&mut cursor).collect();

        // Declaration segments with the byte offset their text starts at.
        let mut raw: Vec<(usize, Segment)> = Vec::new();
        // Attributes and comments waiting for the item they belong to.
        let mut pending: Vec<Node> = Vec::new();

        for child in children {
            match child.kind() {
                "attribute_item" | "line_comment" | "block_comment" => pending.push(child),
                "function_item" => {
                    let attach = attach_index(source, &pending, child.start_byte());
                    for node in &pending[..attach] {
                        raw.push(other_segment(source, *node));
                    }
                    let start = pending
                        .get(attach)
                        .map_or_else(|| child.start_byte(), |node| node.start_byte());
                    let name = function_name(child, source)?;
                    raw.push((
                        start,
                        Segment::Function(FunctionDecl {
                            name,
                            text: source[start..child.end_byte()].trim().to_string(),
                        }),
                    ));
                    pending.clear();
                }
                _ => {
                    for node in pending.drain(..) {
                        raw.push(other_segment(source, node));
                    }
                    raw.push(other_segment(source, child));
                }
            }
        }
        for node in pending {
            raw.push(other_segment(source, node));
        }

        let first_function = raw
            .iter()
            .position(|(_, segment)| matches!(segment, Segment::Function(_)));

        Ok(match first_function {
            Some(index) => ModuleOutline {
                preamble: source[..raw[index].0].trim_end().to_string(),
                segments: raw.into_iter().skip(index).map(|(_, seg)| seg).collect(),
            },
            None => ModuleOutline {
                preamble: source.trim_end().to_string(),
                segments: Vec::new(),
            },
        })
    }

    /// Validate that `code` is exactly one top-level function definition and
    /// extract its name. Outer attributes and comments are allowed; any other
    /// item kind, a second function, or an attribute dangling after the
    /// function is rejected.
    pub fn parse_definition(&mut self, code: &str) -> Result<FunctionDecl> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(ToolsmithError::InvalidDefinition {
                reason: "definition is empty".to_string(),
            });
        }

        let tree = self
            .parse_tree(trimmed)
            .map_err(|e| ToolsmithError::InvalidDefinition {
                reason: e.to_string(),
            })?;
        let root = tree.root_node();

        let mut cursor = root.walk();
        let mut function: Option<Node> = None;
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "function_item" => {
                    if function.is_some() {
                        return Err(ToolsmithError::InvalidDefinition {
                            reason: "code must contain exactly one function definition"
                                .to_string(),
                        });
                    }
                    function = Some(child);
                }
                "line_comment" | "block_comment" => {}
                "attribute_item" => {
                    // A trailing attribute would attach to whatever gets
                    // appended after this declaration later.
                    if function.is_some() {
                        return Err(ToolsmithError::InvalidDefinition {
                            reason: "attribute after the function body is not attached to it"
                                .to_string(),
                        });
                    }
                }
                kind => {
                    return Err(ToolsmithError::InvalidDefinition {
                        reason: format!(
                            "unexpected `{kind}` item; only a single function definition is accepted"
                        ),
                    });
                }
            }
        }

        let function = function.ok_or_else(|| ToolsmithError::InvalidDefinition {
            reason: "code does not contain a function definition".to_string(),
        })?;
        let name =
            function_name(function, trimmed).map_err(|e| ToolsmithError::InvalidDefinition {
                reason: e.to_string(),
            })?;

        Ok(FunctionDecl {
            name,
            text: trimmed.to_string(),
        })
    }

    fn parse_tree(&mut self, source: &str) -> Result<tree_sitter::Tree, SyntaxError> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Err(SyntaxError::new("parser produced no tree"));
        };
        let root = tree.root_node();
        if root.has_error() {
            let at = first_error(root).unwrap_or_else(|| root.start_position());
            return Err(SyntaxError::new(format!(
                "syntax error at line {}, column {}",
                at.row + 1,
                at.column + 1
            )));
        }
        Ok(tree)
    }
}

fn function_name(node: Node, source: &str) -> Result<String, SyntaxError> {
    let name = node
        .child_by_field_name("name")
        .ok_or_else(|| SyntaxError::new("function item has no name"))?;
    name.utf8_text(source.as_bytes())
        .map(str::to_string)
        .map_err(|e| SyntaxError::new(format!("function name is not valid UTF-8: {e}")))
}

/// Index into `pending` from which the trailing run attaches to a function
/// starting at `function_start`. Attributes always attach (Rust binds them to
/// the next item across blank lines); a comment only while no blank line
/// separates it from what follows.
fn attach_index(source: &str, pending: &[Node], function_start: usize) -> usize {
    let mut attach = pending.len();
    let mut anchor = function_start;
    for (index, node) in pending.iter().enumerate().rev() {
        let attaches = match node.kind() {
            "attribute_item" => true,
            _ => !has_blank_line(source, node.end_byte(), anchor),
        };
        if !attaches {
            break;
        }
        attach = index;
        anchor = node.start_byte();
    }
    attach
}

fn has_blank_line(source: &str, from: usize, to: usize) -> bool {
    source
        .get(from..to)
        .is_some_and(|gap| gap.bytes().filter(|b| *b == b'\n').count() > 1)
}

fn other_segment(source: &str, node: Node) -> (usize, Segment) {
    let start = node.start_byte();
    (
        start,
        Segment::Other(source[start..node.end_byte()].trim().to_string()),
    )
}

fn first_error(node: Node) -> Option<Point> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position());
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(point) = first_error(child) {
            return Some(point);
        }
    }
    Some(node.start_position())
}

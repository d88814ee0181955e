//! Structural checks applied before a document is rebuilt.

use super::{DefinitionNode, NodeKind};
use crate::error::DefMapError;

/// Checks that `root` is a module whose descendants carry the fields their
/// kinds require.
pub(crate) fn validate(root: &DefinitionNode) -> Result<(), DefMapError> {
    if root.kind != NodeKind::Module {
        return Err(DefMapError::structure(
            "$",
            format!("document root must be a module, found {}", root.kind),
        ));
    }
    validate_node(root, "$")
}

fn validate_node(node: &DefinitionNode, path: &str) -> Result<(), DefMapError> {
    match node.kind {
        NodeKind::Module => {
            if !node.header.is_empty() {
                return Err(DefMapError::structure(path, "a module has no header"));
            }
        }
        NodeKind::Class | NodeKind::NestedClass => {
            require_declaration(node, path, &["class"])?;
        }
        NodeKind::Function | NodeKind::NestedFunction => {
            require_declaration(node, path, &["def", "async"])?;
        }
        NodeKind::OtherStatement => validate_statement(node, path)?,
    }

    for (index, child) in node.body_definitions.iter().enumerate() {
        let child_path = format!("{path}.body_definitions[{index}]");
        if child.kind == NodeKind::Module {
            return Err(DefMapError::structure(
                child_path,
                "a module cannot be nested inside another node",
            ));
        }
        validate_node(child, &child_path)?;
    }
    Ok(())
}

fn require_declaration(
    node: &DefinitionNode,
    path: &str,
    keywords: &[&str],
) -> Result<(), DefMapError> {
    if node.name.trim().is_empty() {
        return Err(DefMapError::structure(
            path,
            format!("a {} requires a name", node.kind),
        ));
    }
    if node.header.trim().is_empty() {
        return Err(DefMapError::structure(
            path,
            format!("a {} requires a header", node.kind),
        ));
    }
    let declares = node
        .header
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .any(|word| keywords.contains(&word));
    if !declares {
        return Err(DefMapError::structure(
            path,
            format!(
                "header of {} {:?} does not declare a {}",
                node.kind,
                node.name,
                keywords.join("/"),
            ),
        ));
    }
    Ok(())
}

fn validate_statement(node: &DefinitionNode, path: &str) -> Result<(), DefMapError> {
    if !node.header.is_empty() || node.docstring.is_some() {
        return Err(DefMapError::structure(
            path,
            "an other_statement carries neither header nor docstring",
        ));
    }
    if !node.body_definitions.is_empty() {
        return Err(DefMapError::structure(
            path,
            "an other_statement cannot contain definitions",
        ));
    }
    if node.raw_body.trim().is_empty() {
        return Err(DefMapError::structure(
            path,
            "an other_statement requires a raw_body",
        ));
    }
    Ok(())
}

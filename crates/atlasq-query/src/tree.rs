//! Logical trees.
//!
//! A postfix token stream is reduced into a tree of leaves and n-ary groups.
//! Runs of the same connective are merged into one flat group as the tree is
//! built, so `a AND b AND c` becomes `AND[a, b, c]` rather than
//! `AND[AND[a, b], c]`.

use std::{fmt, iter};

use tracing::debug;

use crate::{
    error::QueryError,
    postfix::to_postfix,
    token::{Operand, Operator, Token},
};

/// A node in a logical tree. Leaves borrow their operand from the token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalNode<'t> {
    /// A single comparison.
    Leaf(&'t Operand),
    /// A connective over two or more children.
    Group {
        /// The connective joining the children.
        operator: Operator,
        /// Child nodes in source order.
        children: Vec<Self>,
    },
}

impl<'t> LogicalNode<'t> {
    /// Creates a group node, applying the merge rule.
    ///
    /// A child that is itself a group with the same connective has its children
    /// spliced in, unless `operator` is marked separate. A group left with a
    /// single child collapses to that child.
    pub fn group(operator: Operator, nodes: impl IntoIterator<Item = Self>) -> Self {
        let mut children = Vec::new();
        for node in nodes {
            match node {
                Self::Group {
                    operator: inner,
                    children: grandchildren,
                } if !operator.separate && inner.connective == operator.connective => {
                    children.extend(grandchildren);
                }
                other => children.push(other),
            }
        }

        if children.len() == 1
            && let Some(only) = children.pop()
        {
            return only;
        }

        Self::Group { operator, children }
    }

    /// Returns the operand if this is a leaf.
    pub fn as_leaf(&self) -> Option<&'t Operand> {
        match self {
            Self::Leaf(operand) => Some(operand),
            Self::Group { .. } => None,
        }
    }

    /// Collects every leaf operand in left-to-right order.
    pub fn leaves(&self) -> Vec<&'t Operand> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    /// Recursive helper for [`Self::leaves`].
    fn collect_leaves(&self, out: &mut Vec<&'t Operand>) {
        match self {
            Self::Leaf(operand) => out.push(operand),
            Self::Group { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Maximum nesting depth; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    /// Formats the tree with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Leaf(operand) => {
                let comparison = operand
                    .comparison
                    .map_or("NOT_NULL", |c| c.expression());
                writeln!(
                    f,
                    "{prefix}{} {comparison} {}",
                    operand.field, operand.value
                )
            }
            Self::Group { operator, children } => {
                if operator.separate {
                    writeln!(f, "{prefix}{} (separate)", operator.connective)?;
                } else {
                    writeln!(f, "{prefix}{}", operator.connective)?;
                }
                for child in children {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for LogicalNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

/// Reduces a postfix token sequence into a logical tree.
///
/// An operator pops its right operand, then its left operand if one is left.
/// Fails with a state error if an operator finds nothing to pop or if the
/// reduction does not end with exactly one node.
pub fn from_postfix<'t>(postfix: &[&'t Token]) -> Result<LogicalNode<'t>, QueryError> {
    let mut stack: Vec<LogicalNode<'t>> = Vec::new();

    for token in postfix {
        match token {
            Token::Operand(operand) => stack.push(LogicalNode::Leaf(operand)),
            Token::Operator(operator) => {
                let right = stack.pop().ok_or_else(|| {
                    QueryError::state(format!(
                        "operator {} has no operands",
                        operator.connective
                    ))
                })?;
                let left = stack.pop();
                stack.push(LogicalNode::group(
                    *operator,
                    left.into_iter().chain(iter::once(right)),
                ));
            }
            Token::Open | Token::Close => {
                return Err(QueryError::state("parenthesis in postfix sequence"));
            }
        }
    }

    if stack.len() != 1 {
        return Err(QueryError::state(format!(
            "{} nodes left after reduction, expected 1",
            stack.len()
        )));
    }

    stack
        .pop()
        .ok_or_else(|| QueryError::state("empty reduction"))
}

/// Builds the logical tree for an infix token stream.
pub fn build_tree(tokens: &[Token]) -> Result<LogicalNode<'_>, QueryError> {
    let postfix = to_postfix(tokens)?;
    let tree = from_postfix(&postfix)?;
    debug!("logical tree:\n{tree}");
    Ok(tree)
}

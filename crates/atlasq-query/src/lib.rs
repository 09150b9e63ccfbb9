//! Search expressions for atlasq.
//!
//! A search expression arrives as a flat infix stream of [`Token`]s:
//!
//! - **Operands**: one field comparison each (`price < 1200`)
//! - **Operators**: `AND` / `OR`, optionally marked as a separate group
//! - **Parentheses**: explicit grouping
//!
//! [`build_tree`] converts the stream to postfix and reduces it to a
//! [`LogicalNode`] tree with flat n-ary groups.
//!
//! # Example
//!
//! ```
//! use atlasq_query::{Comparison, Operand, Token, build_tree};
//!
//! let tokens = vec![
//!     Token::operand(Operand::new("name", Comparison::Equal, "Laptop")),
//!     Token::and(),
//!     Token::operand(Operand::new("price", Comparison::LessThan, 1200)),
//! ];
//! let tree = build_tree(&tokens).unwrap();
//! assert_eq!(tree.leaves().len(), 2);
//! ```

#![warn(missing_docs)]

mod error;
mod postfix;
mod token;
mod tree;

pub use error::QueryError;
pub use postfix::to_postfix;
pub use token::{Comparison, Connective, Operand, Operator, TextModifiers, Token, stringify};
pub use tree::{LogicalNode, build_tree, from_postfix};

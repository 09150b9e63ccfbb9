//! Atlas Search document compiler for atlasq.
//!
//! [`Compiler`] turns an infix token stream into the nested `compound`
//! document an Atlas Search `$search` stage takes as its criteria:
//!
//! 1. the stream is parsed into a merged logical tree (`atlasq-query`)
//! 2. each leaf's field is resolved against a schema tree (`atlasq-schema`)
//! 3. leaves are lowered to primitive clauses through [`ClauseLowering`]
//! 4. groups become `compound` documents, with embedded leaves gathered under
//!    one `embeddedDocument` wrapper per parent path
//!
//! [`SearchStage`] and [`SearchMetaStage`] place the result in a pipeline stage.
//!
//! # Example
//!
//! ```
//! use atlasq_compile::compile;
//! use atlasq_query::{Comparison, Operand, Token};
//! use atlasq_schema::SchemaNode;
//! use serde_json::json;
//!
//! let schema = SchemaNode::new("Product", "Product")
//!     .with_child(SchemaNode::new("price", "Double"));
//! let tokens = [Token::operand(Operand::new("price", Comparison::LessThan, 1200))];
//!
//! let doc = compile(&tokens, &schema).unwrap();
//! assert_eq!(doc, json!({ "range": { "path": "price", "lt": 1200 } }));
//! ```

#![warn(missing_docs)]

mod compile;
mod embed;
mod envelope;
mod error;
mod lower;

pub use compile::{Compiler, Preprocessor, compile};
pub use embed::EmbeddingRules;
pub use envelope::{SearchMetaStage, SearchStage, SortOrder};
pub use error::CompileError;
pub use lower::{
    Clause, ClauseLowering, DefaultLowering, LeafContext, is_null_document, negate,
    not_null_document,
};

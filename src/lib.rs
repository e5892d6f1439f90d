pub mod ast;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod lexer;
pub mod parser;
pub mod prune;
pub mod resolver;
pub mod schema;
pub mod template;

pub use ast::Value;
pub use config::{MaterializeOptions, Materializer};
pub use error::CfgError;
pub use resolver::Bindings;
pub use schema::{JsonSchemaValidator, Schema, SchemaValidator};

#![forbid(unsafe_code)]

pub mod error;
pub mod expressions;
pub mod parser;
pub mod types;
pub mod validate;

pub use crate::error::{DocumentError, ParseError, ValidationError, Violation};
pub use crate::parser::{parse_document_str, DocumentFormat, ParsedDocument};
pub use crate::types::ArazzoDocument;
pub use crate::validate::{validate_document, Validate};

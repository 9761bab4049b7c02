//! Structural validation of parsed documents.
//!
//! The walk collects every violation it finds instead of stopping at the
//! first one, so a caller sees the full list in a single pass.

mod rules;
mod validator;

use crate::error::ValidationError;
use crate::types::ArazzoDocument;
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for ArazzoDocument {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.validate_document(self);
        v.finish()
    }
}

/// Free-function form of [`Validate::validate`].
pub fn validate_document(doc: &ArazzoDocument) -> Result<(), ValidationError> {
    doc.validate()
}

use std::collections::BTreeMap;

pub type AnyValue = serde_json::Value;
pub type JsonSchema = serde_json::Value;
pub type RuntimeExpression = String;

/// Specification Extensions (`x-...`) captured from the document.
///
/// Unknown fields deserialize into this map; the `x-` prefix is enforced at
/// validation time.
pub type Extensions = BTreeMap<String, serde_json::Value>;

use std::collections::{BTreeMap, BTreeSet};

use crate::sources::model::{method_keys, select_base_url, ResolvedOperation, SourceDocument};
use crate::sources::op_path::parse_operation_path_ref;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("unknown source description: {0}")]
    UnknownSource(String),
    #[error("operationId '{operation_id}' not found in source '{source_name}'")]
    UnknownOperation {
        source_name: String,
        operation_id: String,
    },
    #[error("operationId '{operation_id}' not found in any registered source (available: {available})")]
    OperationNotFound {
        operation_id: String,
        available: String,
    },
    #[error("ambiguous operationId '{operation_id}' found in sources: {sources} (qualify with $sourceDescriptions.<name>.<operationId>)")]
    AmbiguousOperation {
        operation_id: String,
        sources: String,
    },
    #[error("no source descriptions registered")]
    NoSources,
    #[error("invalid operationPath reference: {0}")]
    InvalidOperationPath(String),
    #[error("failed to load source description '{name}' from '{url}': {message}")]
    Load {
        name: String,
        url: String,
        message: String,
    },
}

/// API descriptions keyed by the alias workflow steps use to reference them.
/// Populated at construction and read-only afterwards, so it is freely shared
/// across concurrent executions.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    docs: BTreeMap<String, SourceDocument>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-parsed description documents keyed by alias.
    pub fn from_docs(docs: BTreeMap<String, serde_json::Value>) -> Self {
        let mut registry = Self::new();
        for (alias, raw) in docs {
            registry.register(alias, raw, None);
        }
        registry
    }

    pub fn register(
        &mut self,
        alias: impl Into<String>,
        raw: serde_json::Value,
        source_url: Option<String>,
    ) {
        self.docs
            .insert(alias.into(), SourceDocument { source_url, raw });
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, alias: &str) -> Result<&SourceDocument, SourceError> {
        self.docs
            .get(alias)
            .ok_or_else(|| SourceError::UnknownSource(alias.to_string()))
    }

    /// Resolve an operation reference to its HTTP call template.
    ///
    /// With an alias the lookup is confined to that source; without one a
    /// single registered source is used directly, and multiple sources are
    /// searched with ambiguity reported as an error rather than guessed away.
    pub fn resolve_operation(
        &self,
        alias: Option<&str>,
        operation_id: &str,
    ) -> Result<ResolvedOperation, SourceError> {
        if let Some(alias) = alias {
            let doc = self.get(alias)?;
            return find_operation_by_id(&doc.raw, alias, operation_id).ok_or_else(|| {
                SourceError::UnknownOperation {
                    source_name: alias.to_string(),
                    operation_id: operation_id.to_string(),
                }
            });
        }

        if self.docs.is_empty() {
            return Err(SourceError::NoSources);
        }

        if self.docs.len() == 1 {
            let (alias, doc) = self.docs.iter().next().ok_or(SourceError::NoSources)?;
            return find_operation_by_id(&doc.raw, alias, operation_id).ok_or_else(|| {
                SourceError::UnknownOperation {
                    source_name: alias.clone(),
                    operation_id: operation_id.to_string(),
                }
            });
        }

        let mut matches = BTreeSet::<String>::new();
        for (alias, doc) in &self.docs {
            if find_operation_by_id(&doc.raw, alias, operation_id).is_some() {
                matches.insert(alias.clone());
            }
        }
        match matches.len() {
            0 => Err(SourceError::OperationNotFound {
                operation_id: operation_id.to_string(),
                available: self.docs.keys().cloned().collect::<Vec<_>>().join(", "),
            }),
            1 => {
                let alias = matches.iter().next().cloned().unwrap_or_default();
                let doc = self.get(&alias)?;
                find_operation_by_id(&doc.raw, &alias, operation_id).ok_or_else(|| {
                    SourceError::UnknownOperation {
                        source_name: alias,
                        operation_id: operation_id.to_string(),
                    }
                })
            }
            _ => Err(SourceError::AmbiguousOperation {
                operation_id: operation_id.to_string(),
                sources: matches.into_iter().collect::<Vec<_>>().join(", "),
            }),
        }
    }

    /// Resolve an `operationPath` reference
    /// (`{$sourceDescriptions.<name>.url}#/paths/.../<method>`).
    pub fn resolve_operation_path(&self, op_path: &str) -> Result<ResolvedOperation, SourceError> {
        let (source_name, pointer, method, path) =
            parse_operation_path_ref(op_path).map_err(SourceError::InvalidOperationPath)?;

        let doc = self.get(&source_name)?;
        let op_obj = doc.raw.pointer(&pointer).ok_or_else(|| {
            SourceError::InvalidOperationPath(format!(
                "pointer '{pointer}' not found in source '{source_name}'"
            ))
        })?;

        let base_url = select_base_url(&doc.raw, &path, op_obj).unwrap_or_default();
        Ok(ResolvedOperation {
            source_name,
            base_url,
            method: method.to_uppercase(),
            path,
            operation_id: op_obj
                .get("operationId")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }
}

fn find_operation_by_id(
    doc: &serde_json::Value,
    source_name: &str,
    operation_id: &str,
) -> Option<ResolvedOperation> {
    let paths = doc.get("paths")?.as_object()?;
    for (path, item) in paths {
        let item_obj = item.as_object()?;
        for method in method_keys() {
            let Some(op) = item_obj.get(*method) else {
                continue;
            };
            let Some(opid) = op.get("operationId").and_then(|v| v.as_str()) else {
                continue;
            };
            if opid == operation_id {
                let base_url = select_base_url(doc, path, op).unwrap_or_default();
                return Some(ResolvedOperation {
                    source_name: source_name.to_string(),
                    base_url,
                    method: method.to_uppercase(),
                    path: path.clone(),
                    operation_id: Some(operation_id.to_string()),
                });
            }
        }
    }
    None
}

/// A registered API description, held as parsed JSON (YAML inputs are
/// converted at load time).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SourceDocument {
    /// Original location (URL or file path), when loaded from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub raw: serde_json::Value,
}

/// A concrete HTTP call template resolved from a step's operation reference.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedOperation {
    pub source_name: String,
    /// Base URL selected from OpenAPI `servers` (operation > path-item > doc).
    pub base_url: String,
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

pub(crate) fn method_keys() -> &'static [&'static str] {
    &[
        "get", "put", "post", "delete", "options", "head", "patch", "trace",
    ]
}

pub(crate) fn select_base_url(
    doc: &serde_json::Value,
    path: &str,
    operation: &serde_json::Value,
) -> Option<String> {
    if let Some(url) = servers_first_url(operation) {
        return Some(url);
    }
    if let Some(path_item) = doc.get("paths").and_then(|p| p.get(path)) {
        if let Some(url) = servers_first_url(path_item) {
            return Some(url);
        }
    }
    servers_first_url(doc)
}

fn servers_first_url(v: &serde_json::Value) -> Option<String> {
    let servers = v.get("servers")?.as_array()?;
    let first = servers.first()?.as_object()?;
    first.get("url")?.as_str().map(|s| s.to_string())
}

pub(crate) fn decode_json_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

pub(crate) fn pointer_from_str(pointer: &str) -> Option<String> {
    if pointer.is_empty() {
        return Some(String::new());
    }
    if pointer.starts_with('/') {
        Some(pointer.to_string())
    } else if pointer.starts_with('#') {
        Some(pointer.trim_start_matches('#').to_string())
    } else {
        None
    }
}

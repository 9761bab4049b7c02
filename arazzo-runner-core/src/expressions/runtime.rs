use std::sync::LazyLock;

use regex::Regex;

use super::json_pointer::{JsonPointer, JsonPointerError};

static TCHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+$").expect("valid regex"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-_]+$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeExpr {
    Url,
    Method,
    StatusCode,
    Response(Source),
    Inputs(NamePath),
    Steps(NamePath),
    SourceDescriptions(NamePath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Header(String),
    Query(String),
    Path(String),
    Body { pointer: Option<JsonPointer> },
}

/// One hop of a dotted name path: a member access or a zero-based array
/// index (`posts[0]` parses as `Key("posts")` followed by `Index(0)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePath {
    pub root: String,
    pub segments: Vec<PathSegment>,
    pub pointer: Option<JsonPointer>,
}

pub fn parse_runtime_expr(input: &str) -> Result<RuntimeExpr, RuntimeExprError> {
    let s = input.trim();
    if !s.starts_with('$') {
        return Err(RuntimeExprError::MissingDollarPrefix);
    }

    // Split optional `#<json-pointer>` suffix.
    let (head, pointer) = split_pointer_suffix(&s[1..])?;

    if head == "url" {
        return Ok(RuntimeExpr::Url);
    }
    if head == "method" {
        return Ok(RuntimeExpr::Method);
    }
    if head == "statusCode" {
        return Ok(RuntimeExpr::StatusCode);
    }

    if let Some(rest) = head.strip_prefix("response.") {
        return Ok(RuntimeExpr::Response(parse_source(rest, pointer)?));
    }
    if let Some(rest) = head.strip_prefix("inputs.") {
        return Ok(RuntimeExpr::Inputs(parse_name_path(rest, pointer)?));
    }
    if let Some(rest) = head.strip_prefix("steps.") {
        return Ok(RuntimeExpr::Steps(parse_name_path(rest, pointer)?));
    }
    if let Some(rest) = head.strip_prefix("sourceDescriptions.") {
        return Ok(RuntimeExpr::SourceDescriptions(parse_name_path(
            rest, pointer,
        )?));
    }

    Err(RuntimeExprError::UnknownExpression(head.to_string()))
}

fn split_pointer_suffix(s: &str) -> Result<(String, Option<JsonPointer>), RuntimeExprError> {
    if let Some((head, frag)) = s.split_once('#') {
        let ptr = JsonPointer::parse(frag).map_err(RuntimeExprError::InvalidJsonPointer)?;
        Ok((head.to_string(), Some(ptr)))
    } else {
        Ok((s.to_string(), None))
    }
}

fn parse_source(rest: &str, pointer: Option<JsonPointer>) -> Result<Source, RuntimeExprError> {
    if rest == "body" {
        return Ok(Source::Body { pointer });
    }

    // A pointer suffix is only meaningful against the body.
    if pointer.is_some() {
        return Err(RuntimeExprError::InvalidSource(rest.to_string()));
    }

    if let Some(token) = rest.strip_prefix("header.") {
        if token.is_empty() {
            return Err(RuntimeExprError::EmptyName);
        }
        if !TCHAR_RE.is_match(token) {
            return Err(RuntimeExprError::InvalidHeaderToken(token.to_string()));
        }
        return Ok(Source::Header(token.to_string()));
    }
    if let Some(name) = rest.strip_prefix("query.") {
        validate_name(name)?;
        return Ok(Source::Query(name.to_string()));
    }
    if let Some(name) = rest.strip_prefix("path.") {
        validate_name(name)?;
        return Ok(Source::Path(name.to_string()));
    }

    Err(RuntimeExprError::InvalidSource(rest.to_string()))
}

fn parse_name_path(rest: &str, pointer: Option<JsonPointer>) -> Result<NamePath, RuntimeExprError> {
    let parts: Vec<&str> = rest.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(RuntimeExprError::EmptyName);
    }

    let mut segments = Vec::new();
    let mut root = None;
    for part in parts {
        let (name, indices) = split_index_suffixes(part)?;
        validate_name(name)?;
        match root {
            None => root = Some(name.to_string()),
            Some(_) => segments.push(PathSegment::Key(name.to_string())),
        }
        for idx in indices {
            segments.push(PathSegment::Index(idx));
        }
    }

    let root = root.ok_or(RuntimeExprError::EmptyName)?;
    Ok(NamePath {
        root,
        segments,
        pointer,
    })
}

/// Split `posts[0][1]` into the bare name and its index suffixes.
fn split_index_suffixes(part: &str) -> Result<(&str, Vec<usize>), RuntimeExprError> {
    let Some(open) = part.find('[') else {
        return Ok((part, Vec::new()));
    };
    let (name, mut rest) = part.split_at(open);

    let mut indices = Vec::new();
    while !rest.is_empty() {
        let inner = rest
            .strip_prefix('[')
            .and_then(|r| r.split_once(']'))
            .ok_or_else(|| RuntimeExprError::InvalidIndex(part.to_string()))?;
        let idx: usize = inner
            .0
            .parse()
            .map_err(|_| RuntimeExprError::InvalidIndex(part.to_string()))?;
        indices.push(idx);
        rest = inner.1;
    }
    Ok((name, indices))
}

fn validate_name(name: &str) -> Result<(), RuntimeExprError> {
    if name.is_empty() {
        return Err(RuntimeExprError::EmptyName);
    }
    if !NAME_RE.is_match(name) {
        return Err(RuntimeExprError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeExprError {
    #[error("runtime expression must start with '$'")]
    MissingDollarPrefix,
    #[error("unknown runtime expression: {0}")]
    UnknownExpression(String),
    #[error("invalid source reference: {0}")]
    InvalidSource(String),
    #[error("name segment must not be empty")]
    EmptyName,
    #[error("invalid name segment: {0}")]
    InvalidName(String),
    #[error("invalid array index in segment: {0}")]
    InvalidIndex(String),
    #[error("invalid header token: {0}")]
    InvalidHeaderToken(String),
    #[error("invalid json pointer: {0}")]
    InvalidJsonPointer(#[from] JsonPointerError),
}

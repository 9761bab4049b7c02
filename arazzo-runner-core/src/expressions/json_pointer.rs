/// RFC 6901 JSON pointer fragment, as carried by the `#/...` suffix of a
/// runtime expression. Stored raw; traversal happens at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPointer {
    raw: String,
}

impl JsonPointer {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn parse(fragment: &str) -> Result<Self, JsonPointerError> {
        // "" addresses the whole document; anything else must start with '/'.
        if fragment.is_empty() {
            return Ok(Self {
                raw: fragment.to_string(),
            });
        }
        if !fragment.starts_with('/') {
            return Err(JsonPointerError::InvalidPrefix);
        }

        // Only the escapes "~0" and "~1" are allowed.
        let mut chars = fragment.chars();
        while let Some(ch) = chars.next() {
            if ch == '~' {
                match chars.next() {
                    Some('0' | '1') => {}
                    _ => return Err(JsonPointerError::InvalidEscape),
                }
            }
        }

        Ok(Self {
            raw: fragment.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsonPointerError {
    #[error("json pointer must start with '/'")]
    InvalidPrefix,
    #[error("json pointer contains invalid escape (only ~0 and ~1 are allowed)")]
    InvalidEscape,
}

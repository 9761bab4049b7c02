use crate::error::ParseError;
use crate::types::ArazzoDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: ArazzoDocument,
    pub format: DocumentFormat,
}

pub fn parse_document_str(
    input: &str,
    format: DocumentFormat,
) -> Result<ParsedDocument, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedDocument {
            document: serde_json::from_str::<ArazzoDocument>(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedDocument {
            document: serde_yaml::from_str::<ArazzoDocument>(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_document_auto(input),
    }
}

fn parse_document_auto(input: &str) -> Result<ParsedDocument, ParseError> {
    // Heuristic: JSON documents start with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<ArazzoDocument>(input) {
            Ok(document) => {
                return Ok(ParsedDocument {
                    document,
                    format: DocumentFormat::Json,
                })
            }
            Err(json_err) => {
                // Fall back to YAML, but report the JSON error if both fail.
                return match serde_yaml::from_str::<ArazzoDocument>(input) {
                    Ok(document) => Ok(ParsedDocument {
                        document,
                        format: DocumentFormat::Yaml,
                    }),
                    Err(_) => Err(ParseError::Json(json_err)),
                };
            }
        }
    }

    match serde_yaml::from_str::<ArazzoDocument>(input) {
        Ok(document) => Ok(ParsedDocument {
            document,
            format: DocumentFormat::Yaml,
        }),
        Err(yaml_err) => {
            if let Ok(document) = serde_json::from_str::<ArazzoDocument>(input) {
                return Ok(ParsedDocument {
                    document,
                    format: DocumentFormat::Json,
                });
            }
            Err(ParseError::Yaml(yaml_err))
        }
    }
}

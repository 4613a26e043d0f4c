use crate::error::ParseError;
use crate::types::PlaybookBundle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedBundle {
    pub bundle: PlaybookBundle,
    pub format: DocumentFormat,
}

pub fn parse_bundle_str(input: &str, format: DocumentFormat) -> Result<ParsedBundle, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedBundle {
            bundle: serde_json::from_str(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedBundle {
            bundle: serde_yaml::from_str(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_bundle_auto(input),
    }
}

/// Parses any serde type from JSON or YAML, picking the format from the first
/// non-blank character and falling back to the other one.
pub fn parse_auto<T: serde::de::DeserializeOwned>(
    input: &str,
) -> Result<(T, DocumentFormat), ParseError> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<T>(input) {
            Ok(value) => Ok((value, DocumentFormat::Json)),
            // Retry as YAML before reporting the JSON error.
            Err(e) => serde_yaml::from_str::<T>(input)
                .map(|value| (value, DocumentFormat::Yaml))
                .map_err(|_| ParseError::Json(e)),
        };
    }

    match serde_yaml::from_str::<T>(input) {
        Ok(value) => Ok((value, DocumentFormat::Yaml)),
        Err(e) => serde_json::from_str::<T>(input)
            .map(|value| (value, DocumentFormat::Json))
            .map_err(|_| ParseError::Yaml(e)),
    }
}

fn parse_bundle_auto(input: &str) -> Result<ParsedBundle, ParseError> {
    let (bundle, format) = parse_auto::<PlaybookBundle>(input)?;
    Ok(ParsedBundle { bundle, format })
}

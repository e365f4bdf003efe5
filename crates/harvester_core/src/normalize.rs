use url::Url;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OriginError {
    #[error("invalid base origin {raw:?}: {message}")]
    Parse { raw: String, message: String },
    #[error("base origin {0:?} has no host")]
    Opaque(String),
}

/// Scheme + host (+ port) that root-relative references resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseOrigin(String);

impl BaseOrigin {
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let url = Url::parse(raw.trim()).map_err(|err| OriginError::Parse {
            raw: raw.to_string(),
            message: err.to_string(),
        })?;
        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(OriginError::Opaque(raw.to_string()));
        }
        Ok(Self(origin.ascii_serialization()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Makes an extracted reference absolute.
///
/// - `//host/path` gets an `https:` scheme
/// - `/path` is prefixed with the base origin
/// - anything else passes through unchanged
///
/// Blank input yields `None`.
pub fn absolutize(reference: &str, base: &BaseOrigin) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with("//") {
        return Some(format!("https:{trimmed}"));
    }
    if trimmed.starts_with('/') {
        return Some(format!("{}{trimmed}", base.as_str()));
    }
    Some(trimmed.to_string())
}

use crate::models::{Habit, ProgressEntry};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const VIEW_PARAM: &str = "view";
pub const DATA_PARAM: &str = "data";
pub const PUBLIC_VIEW: &str = "public";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("invalid share data: not percent-encoded utf-8")]
    InvalidPercentEncoding(#[from] std::string::FromUtf8Error),

    #[error("invalid share data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("invalid share data: payload is not utf-8")]
    InvalidUtf8(#[source] std::string::FromUtf8Error),

    #[error("invalid share data: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("invalid share data: missing habits or progress")]
    MissingSections,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSnapshot {
    pub habits: Vec<Habit>,
    pub progress: Vec<ProgressEntry>,
}

impl ShareSnapshot {
    pub fn new(habits: &[Habit], progress: &[ProgressEntry]) -> Self {
        Self {
            habits: habits.iter().map(Habit::retained).collect(),
            progress: progress.to_vec(),
        }
    }
}

pub fn encode(habits: &[Habit], progress: &[ProgressEntry], base_url: &str) -> Result<String, ShareError> {
    let snapshot = ShareSnapshot::new(habits, progress);
    let json = serde_json::to_string(&snapshot)?;
    let packed = STANDARD.encode(json.as_bytes());

    Ok(format!(
        "{}?{VIEW_PARAM}={PUBLIC_VIEW}&{DATA_PARAM}={}",
        strip_query(base_url),
        urlencoding::encode(&packed)
    ))
}

pub fn decode(url: &str) -> Result<Option<ShareSnapshot>, ShareError> {
    if !is_read_only_mode(url) {
        return Ok(None);
    }
    let Some(raw) = query_param(url, DATA_PARAM) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }

    let packed = urlencoding::decode(raw)?;
    let bytes = STANDARD.decode(packed.as_bytes())?;
    let json = String::from_utf8(bytes).map_err(ShareError::InvalidUtf8)?;

    let value: serde_json::Value = serde_json::from_str(&json)?;
    let has_sections = value.get("habits").is_some_and(serde_json::Value::is_array)
        && value.get("progress").is_some_and(serde_json::Value::is_array);
    if !has_sections {
        return Err(ShareError::MissingSections);
    }

    let snapshot: ShareSnapshot = serde_json::from_value(value)?;
    Ok(Some(snapshot))
}

pub fn is_read_only_mode(url: &str) -> bool {
    query_param(url, VIEW_PARAM) == Some(PUBLIC_VIEW)
}

fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

// Value is returned still percent-encoded.
fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let query = match url.split_once('?') {
        Some((_, rest)) => rest,
        None => url.strip_prefix('?').unwrap_or(""),
    };
    let query = query.split('#').next().unwrap_or("");

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

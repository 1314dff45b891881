//! Accept-list requests
//!
//! Parses and validates accept-list update batches and shapes the read
//! documents. A batch is validated in full before anything is applied.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::data::AcceptList;
use crate::error::AppError;

/// One entry of an update batch as sent on the wire
///
/// Absent and `null` fields are both treated as empty.
#[derive(Debug, Deserialize)]
struct AcceptListRequest {
    #[serde(rename = "type", default)]
    accept_type: Option<String>,
    #[serde(default)]
    add: Option<Vec<String>>,
    #[serde(default)]
    remove: Option<Vec<String>>,
}

/// A validated update for one accept type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptListUpdate {
    pub accept_type: String,
    pub additions: Vec<Url>,
    pub removals: Vec<Url>,
}

/// Accept list as returned by the read endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptListDocument {
    #[serde(rename = "type")]
    pub accept_type: String,
    #[serde(rename = "url")]
    pub urls: Vec<String>,
}

impl AcceptListDocument {
    pub fn new(accept_type: &str, urls: &[Url]) -> Self {
        Self {
            accept_type: accept_type.to_string(),
            urls: urls.iter().map(Url::to_string).collect(),
        }
    }
}

impl From<&AcceptList> for AcceptListDocument {
    fn from(list: &AcceptList) -> Self {
        Self::new(&list.accept_type, &list.urls)
    }
}

/// Parse and validate an update batch
///
/// # Errors
/// Returns `AppError::Validation` for malformed JSON, an entry without a
/// type, or any URI that is not an absolute URL.
pub fn parse_update_request(body: &[u8]) -> Result<Vec<AcceptListUpdate>, AppError> {
    let requests: Vec<AcceptListRequest> = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("invalid accept list request: {e}")))?;

    requests
        .into_iter()
        .map(|request| {
            validate_request(request)
                .map_err(|e| AppError::Validation(format!("invalid accept list request: {e}")))
        })
        .collect()
}

fn validate_request(request: AcceptListRequest) -> Result<AcceptListUpdate, String> {
    let accept_type = request
        .accept_type
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "accept list type is required".to_string())?;

    let additions = parse_uris(&request.add.unwrap_or_default())
        .map_err(|e| format!("parse URIs for additions: {e}"))?;
    let removals = parse_uris(&request.remove.unwrap_or_default())
        .map_err(|e| format!("parse URIs for deletion: {e}"))?;

    Ok(AcceptListUpdate {
        accept_type,
        additions,
        removals,
    })
}

fn parse_uris(raw: &[String]) -> Result<Vec<Url>, String> {
    raw.iter()
        .map(|uri| Url::parse(uri).map_err(|e| format!("invalid URI in accept list {uri:?}: {e}")))
        .collect()
}

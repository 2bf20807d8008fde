use shared::{
    domain::{SuggestionId, TargetId},
    error::ApiException,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend rejected {endpoint}: {source}")]
    Api {
        endpoint: String,
        #[source]
        source: ApiException,
    },
    #[error("malformed change payload in suggestion {suggestion_id}: {source}")]
    MalformedSuggestion {
        suggestion_id: SuggestionId,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed opportunity details for target {target_id}: {source}")]
    MalformedDetails {
        target_id: TargetId,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Api { source, .. }
                if matches!(
                    source.code,
                    shared::error::ErrorCode::Unauthorized | shared::error::ErrorCode::Forbidden
                )
        )
    }
}

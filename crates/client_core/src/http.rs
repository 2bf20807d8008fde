use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{ReviewAction, SuggestionId, SuggestionType, TargetId, TargetType},
    error::{ApiError, ApiException},
    protocol::{
        CommunityRights, ExplorationResolutionRequest, SkillResolutionRequest,
        SuggestionListResponse, UserInfo,
    },
};
use tracing::{debug, info};
use url::Url;

use crate::{
    config::PanelConfig, contributions::ContributionSet, error::ClientError, SuggestionService,
    UserSession,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Submitted,
    Reviewable,
}

impl Listing {
    fn handler(self) -> &'static str {
        match self {
            Listing::Submitted => "getsubmittedsuggestions",
            Listing::Reviewable => "getreviewablesuggestions",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContributionClient {
    http: Client,
    base_url: Url,
}

impl ContributionClient {
    pub fn new(config: &PanelConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ClientError::HttpClient)?;
        Self::with_http_client(http, &config.server_url)
    }

    pub fn with_http_client(http: Client, server_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(server_url).map_err(|err| ClientError::InvalidServerUrl {
            url: server_url.to_string(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidServerUrl {
                url: server_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            });
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.endpoint(segments);
        let endpoint = url.path().to_string();
        debug!(%endpoint, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        let response = check_status(&endpoint, response).await?;
        response
            .json()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })
    }

    async fn put_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(segments);
        let endpoint = url.path().to_string();
        debug!(%endpoint, "PUT");
        let response = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        check_status(&endpoint, response).await?;
        Ok(())
    }

    async fn fetch_listing(
        &self,
        listing: Listing,
        kind: SuggestionType,
    ) -> Result<ContributionSet, ClientError> {
        let response: SuggestionListResponse = self
            .get_json(&[listing.handler(), kind.target_type().as_str(), kind.as_str()])
            .await?;
        let set = ContributionSet::from_listing(response)?;
        info!(?listing, %kind, count = set.len(), "fetched suggestions");
        Ok(set)
    }

    fn resolution_path<'a>(
        target_type: TargetType,
        target_id: &'a TargetId,
        suggestion_id: &'a SuggestionId,
    ) -> [&'a str; 4] {
        [
            "suggestionactionhandler",
            target_type.as_str(),
            target_id.as_str(),
            suggestion_id.as_str(),
        ]
    }
}

async fn check_status(endpoint: &str, response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let api_error = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| {
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.trim().to_string()
        };
        ApiError::new(status.as_u16(), message)
    });
    Err(ClientError::Api {
        endpoint: endpoint.to_string(),
        source: ApiException::from(api_error),
    })
}

#[async_trait]
impl SuggestionService for ContributionClient {
    async fn user_created_question_suggestions(&self) -> Result<ContributionSet, ClientError> {
        self.fetch_listing(Listing::Submitted, SuggestionType::AddQuestion)
            .await
    }

    async fn user_created_translation_suggestions(&self) -> Result<ContributionSet, ClientError> {
        self.fetch_listing(Listing::Submitted, SuggestionType::TranslateContent)
            .await
    }

    async fn reviewable_question_suggestions(&self) -> Result<ContributionSet, ClientError> {
        self.fetch_listing(Listing::Reviewable, SuggestionType::AddQuestion)
            .await
    }

    async fn reviewable_translation_suggestions(&self) -> Result<ContributionSet, ClientError> {
        self.fetch_listing(Listing::Reviewable, SuggestionType::TranslateContent)
            .await
    }

    async fn resolve_suggestion_to_skill(
        &self,
        target_id: &TargetId,
        suggestion_id: &SuggestionId,
        action: ReviewAction,
        review_message: &str,
        skill_difficulty: Option<f64>,
    ) -> Result<SuggestionId, ClientError> {
        let body = SkillResolutionRequest {
            action,
            review_message: review_message.to_string(),
            skill_difficulty,
        };
        self.put_json(
            &Self::resolution_path(TargetType::Skill, target_id, suggestion_id),
            &body,
        )
        .await?;
        Ok(suggestion_id.clone())
    }

    async fn resolve_suggestion_to_exploration(
        &self,
        target_id: &TargetId,
        suggestion_id: &SuggestionId,
        action: ReviewAction,
        review_message: &str,
        commit_message: Option<&str>,
    ) -> Result<SuggestionId, ClientError> {
        let body = ExplorationResolutionRequest {
            action,
            review_message: review_message.to_string(),
            commit_message: commit_message.map(str::to_string),
        };
        self.put_json(
            &Self::resolution_path(TargetType::Exploration, target_id, suggestion_id),
            &body,
        )
        .await?;
        Ok(suggestion_id.clone())
    }
}

#[async_trait]
impl UserSession for ContributionClient {
    async fn user_info(&self) -> Result<UserInfo, ClientError> {
        self.get_json(&["userinfohandler"]).await
    }

    async fn community_rights(&self) -> Result<CommunityRights, ClientError> {
        self.get_json(&["usercommunityrightsdatahandler"]).await
    }
}

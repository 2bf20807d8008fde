use async_trait::async_trait;
use shared::{
    domain::{ReviewAction, SuggestionId, TargetId},
    protocol::{CommunityRights, UserInfo},
};

pub mod config;
pub mod contributions;
pub mod error;
pub mod http;
pub mod labels;
pub mod panel;
pub mod review_modal;
pub mod rte_preview;
pub mod summary;

pub use config::{load_settings, DifficultyScale, PanelConfig};
pub use contributions::{ContributionEntry, ContributionSet};
pub use error::ClientError;
pub use http::ContributionClient;
pub use panel::{ContributionsAndReviewPanel, PanelEvent, PanelServices, PanelSnapshot, PanelTab};
pub use review_modal::{ModalOutcome, ReviewDecision, ReviewModal};
pub use rte_preview::FormatRtePreview;
pub use summary::{ContributionSummary, ContributionSummaryBuilder};

/// Suggestion listing and resolution endpoints.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn user_created_question_suggestions(&self) -> Result<ContributionSet, ClientError>;
    async fn user_created_translation_suggestions(&self) -> Result<ContributionSet, ClientError>;
    async fn reviewable_question_suggestions(&self) -> Result<ContributionSet, ClientError>;
    async fn reviewable_translation_suggestions(&self) -> Result<ContributionSet, ClientError>;

    /// Returns the id of the resolved suggestion on success.
    async fn resolve_suggestion_to_skill(
        &self,
        target_id: &TargetId,
        suggestion_id: &SuggestionId,
        action: ReviewAction,
        review_message: &str,
        skill_difficulty: Option<f64>,
    ) -> Result<SuggestionId, ClientError>;

    async fn resolve_suggestion_to_exploration(
        &self,
        target_id: &TargetId,
        suggestion_id: &SuggestionId,
        action: ReviewAction,
        review_message: &str,
        commit_message: Option<&str>,
    ) -> Result<SuggestionId, ClientError>;
}

#[async_trait]
pub trait UserSession: Send + Sync {
    async fn user_info(&self) -> Result<UserInfo, ClientError>;
    async fn community_rights(&self) -> Result<CommunityRights, ClientError>;
}

pub trait RichTextPreview: Send + Sync {
    fn preview(&self, html: &str) -> String;
}

/// Presents a review session to the reviewer and reports how it closed.
/// Dismissing the dialog must yield [`ModalOutcome::Cancelled`].
#[async_trait]
pub trait ReviewModalHost: Send + Sync {
    async fn present(&self, modal: ReviewModal) -> ModalOutcome;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

use std::sync::Arc;

use shared::domain::{ReviewAction, SuggestionId, SuggestionType, TargetId};
use shared::protocol::CommunityRights;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    config::PanelConfig,
    contributions::{ContributionEntry, ContributionSet},
    error::ClientError,
    review_modal::{
        ModalOutcome, QuestionReviewSession, ReviewDecision, ReviewModal, ReviewModalError,
        TranslationReviewSession,
    },
    summary::{ContributionSummary, ContributionSummaryBuilder},
    ReviewModalHost, RichTextPreview, SuggestionService, UserSession,
};

pub const RESOLVED_ALERT: &str = "Submitted suggestion review.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTab {
    /// The user's own submissions of this kind.
    Contributions(SuggestionType),
    /// Suggestions of this kind awaiting the user's review.
    Review(SuggestionType),
}

impl PanelTab {
    pub fn suggestion_type(self) -> SuggestionType {
        match self {
            PanelTab::Contributions(kind) | PanelTab::Review(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDescriptor {
    pub suggestion_type: SuggestionType,
    pub text: &'static str,
}

pub fn contribution_tabs() -> Vec<TabDescriptor> {
    vec![
        TabDescriptor {
            suggestion_type: SuggestionType::AddQuestion,
            text: "Questions",
        },
        TabDescriptor {
            suggestion_type: SuggestionType::TranslateContent,
            text: "Translations",
        },
    ]
}

pub fn review_tabs_for(rights: &CommunityRights) -> Vec<TabDescriptor> {
    let mut tabs = Vec::new();
    if rights.can_review_questions {
        tabs.push(TabDescriptor {
            suggestion_type: SuggestionType::AddQuestion,
            text: "Review Questions",
        });
    }
    if !rights.can_review_translation_for_language_codes.is_empty() {
        tabs.push(TabDescriptor {
            suggestion_type: SuggestionType::TranslateContent,
            text: "Review Translations",
        });
    }
    tabs
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    Alert(Alert),
    SummariesUpdated {
        tab: PanelTab,
        count: usize,
    },
    SuggestionResolved {
        suggestion_id: SuggestionId,
        action: ReviewAction,
    },
    StaleResponseDiscarded {
        tab: PanelTab,
        generation: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSuggestion {
    pub suggestion_id: SuggestionId,
    pub action: ReviewAction,
}

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("failed to load user details: {0}")]
    UserDetails(#[source] ClientError),
    #[error("failed to fetch suggestions for {tab:?}: {source}")]
    Fetch {
        tab: PanelTab,
        #[source]
        source: ClientError,
    },
    #[error("review modal returned an unusable decision: {0}")]
    Decision(#[source] ReviewModalError),
    #[error("suggestion {0} is not in the current list")]
    UnknownSuggestion(SuggestionId),
    #[error("failed to resolve suggestion {suggestion_id}: {source}")]
    Resolve {
        suggestion_id: SuggestionId,
        #[source]
        source: ClientError,
    },
}

/// Read-only copy of the panel's observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSnapshot {
    pub user_details_loading: bool,
    pub user_is_logged_in: bool,
    pub contributions_data_loading: bool,
    pub active_tab: Option<PanelTab>,
    pub contribution_tabs: Vec<TabDescriptor>,
    pub review_tabs: Vec<TabDescriptor>,
    pub contribution_summaries: Vec<ContributionSummary>,
}

impl PanelSnapshot {
    pub fn active_review_tab(&self) -> Option<SuggestionType> {
        match self.active_tab {
            Some(PanelTab::Review(kind)) => Some(kind),
            _ => None,
        }
    }

    pub fn active_contribution_tab(&self) -> Option<SuggestionType> {
        match self.active_tab {
            Some(PanelTab::Contributions(kind)) => Some(kind),
            _ => None,
        }
    }
}

pub struct PanelServices {
    pub suggestions: Arc<dyn SuggestionService>,
    pub user: Arc<dyn UserSession>,
    pub modals: Arc<dyn ReviewModalHost>,
    pub preview: Arc<dyn RichTextPreview>,
}

struct PanelState {
    user_details_loading: bool,
    user_is_logged_in: bool,
    contributions: ContributionSet,
    contribution_summaries: Vec<ContributionSummary>,
    contributions_data_loading: bool,
    active_tab: Option<PanelTab>,
    review_tabs: Vec<TabDescriptor>,
    generation: u64,
}

impl PanelState {
    fn active_review_tab(&self) -> Option<SuggestionType> {
        match self.active_tab {
            Some(PanelTab::Review(kind)) => Some(kind),
            _ => None,
        }
    }
}

pub struct ContributionsAndReviewPanel {
    config: Arc<PanelConfig>,
    services: PanelServices,
    state: Mutex<PanelState>,
    events: broadcast::Sender<PanelEvent>,
}

impl ContributionsAndReviewPanel {
    pub fn new(config: Arc<PanelConfig>, services: PanelServices) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            config,
            services,
            state: Mutex::new(PanelState {
                user_details_loading: true,
                user_is_logged_in: false,
                contributions: ContributionSet::default(),
                contribution_summaries: Vec::new(),
                contributions_data_loading: true,
                active_tab: None,
                review_tabs: Vec::new(),
                generation: 0,
            }),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> PanelSnapshot {
        let state = self.state.lock().await;
        PanelSnapshot {
            user_details_loading: state.user_details_loading,
            user_is_logged_in: state.user_is_logged_in,
            contributions_data_loading: state.contributions_data_loading,
            active_tab: state.active_tab,
            contribution_tabs: contribution_tabs(),
            review_tabs: state.review_tabs.clone(),
            contribution_summaries: state.contribution_summaries.clone(),
        }
    }

    /// Loads the user's login state and reviewer rights, then opens the
    /// first review tab the user is entitled to, falling back to their own
    /// question contributions.
    pub async fn init(&self) -> Result<(), PanelError> {
        {
            let mut state = self.state.lock().await;
            state.user_details_loading = true;
            state.user_is_logged_in = false;
            state.review_tabs.clear();
        }

        let user_info = self
            .services
            .user
            .user_info()
            .await
            .map_err(PanelError::UserDetails)?;
        {
            let mut state = self.state.lock().await;
            state.user_is_logged_in = user_info.user_is_logged_in;
            state.user_details_loading = false;
        }
        if !user_info.user_is_logged_in {
            info!("user is not logged in; contributions panel stays empty");
            return Ok(());
        }

        let rights = self
            .services
            .user
            .community_rights()
            .await
            .map_err(PanelError::UserDetails)?;
        let review_tabs = review_tabs_for(&rights);
        let first_review_tab = review_tabs.first().map(|tab| tab.suggestion_type);
        info!(
            username = user_info.username.as_deref().unwrap_or_default(),
            review_tabs = review_tabs.len(),
            "loaded reviewer rights"
        );
        self.state.lock().await.review_tabs = review_tabs;

        match first_review_tab {
            Some(kind) => self.switch_to_review_tab(kind).await,
            None => {
                self.switch_to_contributions_tab(SuggestionType::AddQuestion)
                    .await
            }
        }
    }

    pub async fn switch_to_contributions_tab(
        &self,
        kind: SuggestionType,
    ) -> Result<(), PanelError> {
        self.switch_tab(PanelTab::Contributions(kind)).await
    }

    pub async fn switch_to_review_tab(&self, kind: SuggestionType) -> Result<(), PanelError> {
        self.switch_tab(PanelTab::Review(kind)).await
    }

    async fn switch_tab(&self, tab: PanelTab) -> Result<(), PanelError> {
        let generation = {
            let mut state = self.state.lock().await;
            state.active_tab = Some(tab);
            state.contributions_data_loading = true;
            state.contributions = ContributionSet::default();
            state.contribution_summaries.clear();
            state.generation += 1;
            state.generation
        };
        debug!(?tab, generation, "switching contributions panel tab");

        let suggestions = &self.services.suggestions;
        let fetched = match tab {
            PanelTab::Contributions(SuggestionType::AddQuestion) => {
                suggestions.user_created_question_suggestions().await
            }
            PanelTab::Contributions(SuggestionType::TranslateContent) => {
                suggestions.user_created_translation_suggestions().await
            }
            PanelTab::Review(SuggestionType::AddQuestion) => {
                suggestions.reviewable_question_suggestions().await
            }
            PanelTab::Review(SuggestionType::TranslateContent) => {
                suggestions.reviewable_translation_suggestions().await
            }
        };

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(
                ?tab,
                generation,
                current = state.generation,
                "discarding suggestions fetched for a superseded tab"
            );
            self.emit(PanelEvent::StaleResponseDiscarded { tab, generation });
            return Ok(());
        }

        match fetched {
            Ok(contributions) => {
                let builder = ContributionSummaryBuilder::new(self.services.preview.as_ref());
                let summaries = builder.build(&contributions, state.active_review_tab());
                state.contribution_summaries = summaries;
                state.contributions = contributions;
                state.contributions_data_loading = false;
                let count = state.contribution_summaries.len();
                info!(?tab, count, "loaded contributions");
                self.emit(PanelEvent::SummariesUpdated { tab, count });
                Ok(())
            }
            Err(source) => {
                state.contributions = ContributionSet::default();
                state.contributions_data_loading = false;
                warn!(?tab, error = %source, "failed to fetch suggestions");
                self.emit(PanelEvent::Alert(Alert {
                    severity: AlertSeverity::Warning,
                    message: "Failed to load suggestions.".to_string(),
                }));
                Err(PanelError::Fetch { tab, source })
            }
        }
    }

    /// Opens the review modal for `suggestion_id` and, if the reviewer
    /// accepts or rejects, sends exactly one resolution request.
    /// Returns `None` when the modal is cancelled or dismissed.
    pub async fn on_click_view_suggestion(
        &self,
        suggestion_id: &SuggestionId,
    ) -> Result<Option<ResolvedSuggestion>, PanelError> {
        let (modal, target_id, reviewable) = {
            let state = self.state.lock().await;
            let entry = state
                .contributions
                .get(suggestion_id)
                .ok_or_else(|| PanelError::UnknownSuggestion(suggestion_id.clone()))?;
            let reviewable = state.active_review_tab() == Some(entry.suggestion_type());
            let modal = match entry {
                ContributionEntry::Question(question) => {
                    ReviewModal::Question(QuestionReviewSession::open(
                        question,
                        reviewable,
                        &self.config.skill_difficulties,
                    ))
                }
                ContributionEntry::Translation(translation) => ReviewModal::Translation(
                    TranslationReviewSession::open(translation, reviewable),
                ),
            };
            (modal, entry.suggestion().target_id.clone(), reviewable)
        };
        let kind = modal.suggestion_type();

        let decision = match self.services.modals.present(modal).await {
            ModalOutcome::Resolved(decision) => decision,
            ModalOutcome::Cancelled => {
                debug!(%suggestion_id, "review modal closed without a decision");
                return Ok(None);
            }
        };
        if let Err(source) = decision.check_against(suggestion_id, kind, reviewable) {
            warn!(%suggestion_id, error = %source, "review modal returned an unusable decision");
            return Err(PanelError::Decision(source));
        }
        let action = decision.action();

        let resolved = self
            .resolve(kind, &target_id, suggestion_id, action, &decision)
            .await;
        let resolved_id = match resolved {
            Ok(resolved_id) => resolved_id,
            Err(source) => {
                warn!(%suggestion_id, error = %source, "failed to resolve suggestion");
                self.emit(PanelEvent::Alert(Alert {
                    severity: AlertSeverity::Warning,
                    message: "Failed to submit suggestion review.".to_string(),
                }));
                return Err(PanelError::Resolve {
                    suggestion_id: suggestion_id.clone(),
                    source,
                });
            }
        };

        {
            let mut state = self.state.lock().await;
            state
                .contribution_summaries
                .retain(|summary| summary.id != resolved_id);
            state.contributions.remove(&resolved_id);
        }
        info!(suggestion_id = %resolved_id, action = action.as_str(), "resolved suggestion");
        self.emit(PanelEvent::Alert(Alert {
            severity: AlertSeverity::Success,
            message: RESOLVED_ALERT.to_string(),
        }));
        self.emit(PanelEvent::SuggestionResolved {
            suggestion_id: resolved_id.clone(),
            action,
        });

        Ok(Some(ResolvedSuggestion {
            suggestion_id: resolved_id,
            action,
        }))
    }

    async fn resolve(
        &self,
        kind: SuggestionType,
        target_id: &TargetId,
        suggestion_id: &SuggestionId,
        action: ReviewAction,
        decision: &ReviewDecision,
    ) -> Result<SuggestionId, ClientError> {
        let suggestions = &self.services.suggestions;
        match kind {
            SuggestionType::AddQuestion => {
                suggestions
                    .resolve_suggestion_to_skill(
                        target_id,
                        suggestion_id,
                        action,
                        decision.review_message(),
                        decision.skill_difficulty(),
                    )
                    .await
            }
            SuggestionType::TranslateContent => {
                suggestions
                    .resolve_suggestion_to_exploration(
                        target_id,
                        suggestion_id,
                        action,
                        decision.review_message(),
                        decision.commit_message(),
                    )
                    .await
            }
        }
    }

    fn emit(&self, event: PanelEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/panel_tests.rs"]
mod tests;

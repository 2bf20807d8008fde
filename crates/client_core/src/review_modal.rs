use shared::{
    domain::{QuestionId, ReviewAction, Rubric, SuggestionId, SuggestionType, TargetId},
    protocol::QuestionDict,
};
use thiserror::Error;

use crate::{
    config::DifficultyScale,
    contributions::{QuestionContribution, TranslationContribution},
};

pub const RUBRIC_NOT_SPECIFIED: &str = "This rubric has not yet been specified.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewModalError {
    #[error("suggestion {0} was opened read-only")]
    ReadOnly(SuggestionId),
    #[error("decision for {suggestion_id} does not fit a {suggestion_type} suggestion")]
    MismatchedDecision {
        suggestion_id: SuggestionId,
        suggestion_type: SuggestionType,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecisionExtras {
    SkillDifficulty(f64),
    CommitMessage(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewDecision {
    Accept {
        review_message: String,
        extras: DecisionExtras,
    },
    Reject {
        review_message: String,
    },
}

impl ReviewDecision {
    pub fn action(&self) -> ReviewAction {
        match self {
            ReviewDecision::Accept { .. } => ReviewAction::Accept,
            ReviewDecision::Reject { .. } => ReviewAction::Reject,
        }
    }

    pub fn review_message(&self) -> &str {
        match self {
            ReviewDecision::Accept { review_message, .. }
            | ReviewDecision::Reject { review_message } => review_message,
        }
    }

    pub fn skill_difficulty(&self) -> Option<f64> {
        match self {
            ReviewDecision::Accept {
                extras: DecisionExtras::SkillDifficulty(difficulty),
                ..
            } => Some(*difficulty),
            _ => None,
        }
    }

    pub fn commit_message(&self) -> Option<&str> {
        match self {
            ReviewDecision::Accept {
                extras: DecisionExtras::CommitMessage(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Checks a decision returned by a modal host against the session it
    /// came from: the session must have been reviewable and an accept must
    /// carry the extras of its suggestion type.
    pub fn check_against(
        &self,
        suggestion_id: &SuggestionId,
        suggestion_type: SuggestionType,
        reviewable: bool,
    ) -> Result<(), ReviewModalError> {
        if !reviewable {
            return Err(ReviewModalError::ReadOnly(suggestion_id.clone()));
        }
        match (suggestion_type, self) {
            (_, ReviewDecision::Reject { .. })
            | (
                SuggestionType::AddQuestion,
                ReviewDecision::Accept {
                    extras: DecisionExtras::SkillDifficulty(_),
                    ..
                },
            )
            | (
                SuggestionType::TranslateContent,
                ReviewDecision::Accept {
                    extras: DecisionExtras::CommitMessage(_),
                    ..
                },
            ) => Ok(()),
            _ => Err(ReviewModalError::MismatchedDecision {
                suggestion_id: suggestion_id.clone(),
                suggestion_type,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalOutcome {
    Resolved(ReviewDecision),
    /// Cancel button or dismissal; nothing is sent to the backend.
    Cancelled,
}

/// First rubric whose difficulty matches `label`, else the placeholder.
pub fn rubric_explanation(rubrics: &[Rubric], label: Option<&str>) -> String {
    label
        .and_then(|label| rubrics.iter().find(|rubric| rubric.difficulty == label))
        .map(|rubric| rubric.explanation.clone())
        .unwrap_or_else(|| RUBRIC_NOT_SPECIFIED.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReviewSession {
    suggestion_id: SuggestionId,
    target_id: TargetId,
    author_name: String,
    content_html: String,
    question: QuestionDict,
    question_header: String,
    reviewable: bool,
    review_message: String,
    skill_difficulty: f64,
    skill_difficulty_label: Option<String>,
    skill_rubric_explanation: String,
    validation_error: Option<String>,
}

impl QuestionReviewSession {
    pub fn open(
        contribution: &QuestionContribution,
        reviewable: bool,
        difficulties: &DifficultyScale,
    ) -> Self {
        let skill_difficulty = contribution.change.skill_difficulty;
        let skill_difficulty_label = difficulties.label_for(skill_difficulty).map(str::to_string);
        let skill_rubric_explanation = rubric_explanation(
            &contribution.details.skill_rubrics,
            skill_difficulty_label.as_deref(),
        );
        let question = contribution.change.question_dict.clone();

        Self {
            suggestion_id: contribution.suggestion.suggestion_id.clone(),
            target_id: contribution.suggestion.target_id.clone(),
            author_name: contribution.suggestion.author_name.clone(),
            content_html: question.question_state_data.content.html.clone(),
            question,
            question_header: contribution.details.skill_description.clone(),
            reviewable,
            review_message: String::new(),
            skill_difficulty,
            skill_difficulty_label,
            skill_rubric_explanation,
            validation_error: None,
        }
    }

    pub fn suggestion_id(&self) -> &SuggestionId {
        &self.suggestion_id
    }

    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn content_html(&self) -> &str {
        &self.content_html
    }

    pub fn question(&self) -> &QuestionDict {
        &self.question
    }

    pub fn question_id(&self) -> Option<&QuestionId> {
        self.question.id.as_ref()
    }

    pub fn question_header(&self) -> &str {
        &self.question_header
    }

    pub fn reviewable(&self) -> bool {
        self.reviewable
    }

    pub fn review_message(&self) -> &str {
        &self.review_message
    }

    pub fn skill_difficulty(&self) -> f64 {
        self.skill_difficulty
    }

    pub fn skill_difficulty_label(&self) -> Option<&str> {
        self.skill_difficulty_label.as_deref()
    }

    pub fn skill_rubric_explanation(&self) -> &str {
        &self.skill_rubric_explanation
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    pub fn set_review_message(&mut self, message: impl Into<String>) {
        self.review_message = message.into();
    }

    pub fn set_validation_error(&mut self, error: impl Into<String>) {
        self.validation_error = Some(error.into());
    }

    /// Replaces the question content in the local snapshot. Edits stay in
    /// the session; the resolution call does not carry them.
    pub fn edit_question_content(
        &mut self,
        html: impl Into<String>,
    ) -> Result<(), ReviewModalError> {
        if !self.reviewable {
            return Err(ReviewModalError::ReadOnly(self.suggestion_id.clone()));
        }
        let html = html.into();
        self.question.question_state_data.content.html = html.clone();
        self.content_html = html;
        self.question_changed();
        Ok(())
    }

    pub fn question_changed(&mut self) {
        self.validation_error = None;
    }

    pub fn accept(self) -> Result<ModalOutcome, ReviewModalError> {
        if !self.reviewable {
            return Err(ReviewModalError::ReadOnly(self.suggestion_id));
        }
        Ok(ModalOutcome::Resolved(ReviewDecision::Accept {
            review_message: self.review_message,
            extras: DecisionExtras::SkillDifficulty(self.skill_difficulty),
        }))
    }

    pub fn reject(self) -> Result<ModalOutcome, ReviewModalError> {
        if !self.reviewable {
            return Err(ReviewModalError::ReadOnly(self.suggestion_id));
        }
        Ok(ModalOutcome::Resolved(ReviewDecision::Reject {
            review_message: self.review_message,
        }))
    }

    pub fn cancel(self) -> ModalOutcome {
        ModalOutcome::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationReviewSession {
    suggestion_id: SuggestionId,
    target_id: TargetId,
    language_code: String,
    content_html: String,
    translation_html: String,
    reviewable: bool,
    review_message: String,
    commit_message: String,
}

impl TranslationReviewSession {
    pub fn open(contribution: &TranslationContribution, reviewable: bool) -> Self {
        Self {
            suggestion_id: contribution.suggestion.suggestion_id.clone(),
            target_id: contribution.suggestion.target_id.clone(),
            language_code: contribution.change.language_code.clone(),
            content_html: contribution.change.content_html.clone(),
            translation_html: contribution.change.translation_html.clone(),
            reviewable,
            review_message: String::new(),
            commit_message: String::new(),
        }
    }

    pub fn suggestion_id(&self) -> &SuggestionId {
        &self.suggestion_id
    }

    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn content_html(&self) -> &str {
        &self.content_html
    }

    pub fn translation_html(&self) -> &str {
        &self.translation_html
    }

    pub fn reviewable(&self) -> bool {
        self.reviewable
    }

    pub fn review_message(&self) -> &str {
        &self.review_message
    }

    pub fn commit_message(&self) -> &str {
        &self.commit_message
    }

    pub fn set_review_message(&mut self, message: impl Into<String>) {
        self.review_message = message.into();
    }

    pub fn set_commit_message(&mut self, message: impl Into<String>) {
        self.commit_message = message.into();
    }

    pub fn accept(self) -> Result<ModalOutcome, ReviewModalError> {
        if !self.reviewable {
            return Err(ReviewModalError::ReadOnly(self.suggestion_id));
        }
        Ok(ModalOutcome::Resolved(ReviewDecision::Accept {
            review_message: self.review_message,
            extras: DecisionExtras::CommitMessage(self.commit_message),
        }))
    }

    pub fn reject(self) -> Result<ModalOutcome, ReviewModalError> {
        if !self.reviewable {
            return Err(ReviewModalError::ReadOnly(self.suggestion_id));
        }
        Ok(ModalOutcome::Resolved(ReviewDecision::Reject {
            review_message: self.review_message,
        }))
    }

    pub fn cancel(self) -> ModalOutcome {
        ModalOutcome::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewModal {
    Question(QuestionReviewSession),
    Translation(TranslationReviewSession),
}

impl ReviewModal {
    pub fn suggestion_id(&self) -> &SuggestionId {
        match self {
            ReviewModal::Question(session) => session.suggestion_id(),
            ReviewModal::Translation(session) => session.suggestion_id(),
        }
    }

    pub fn suggestion_type(&self) -> SuggestionType {
        match self {
            ReviewModal::Question(_) => SuggestionType::AddQuestion,
            ReviewModal::Translation(_) => SuggestionType::TranslateContent,
        }
    }

    pub fn reviewable(&self) -> bool {
        match self {
            ReviewModal::Question(session) => session.reviewable(),
            ReviewModal::Translation(session) => session.reviewable(),
        }
    }

    pub fn set_review_message(&mut self, message: impl Into<String>) {
        match self {
            ReviewModal::Question(session) => session.set_review_message(message),
            ReviewModal::Translation(session) => session.set_review_message(message),
        }
    }

    pub fn accept(self) -> Result<ModalOutcome, ReviewModalError> {
        match self {
            ReviewModal::Question(session) => session.accept(),
            ReviewModal::Translation(session) => session.accept(),
        }
    }

    pub fn reject(self) -> Result<ModalOutcome, ReviewModalError> {
        match self {
            ReviewModal::Question(session) => session.reject(),
            ReviewModal::Translation(session) => session.reject(),
        }
    }

    pub fn cancel(self) -> ModalOutcome {
        ModalOutcome::Cancelled
    }
}

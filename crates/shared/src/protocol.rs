use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    QuestionId, ReviewAction, Rubric, SkillId, SuggestionId, SuggestionStatus, SuggestionType,
    TargetId, TargetType,
};

/// A suggestion exactly as the backend serializes it. The `change`
/// payload is kept raw until [`SuggestionBackendDict::decode_change`]
/// picks the variant from `suggestion_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionBackendDict {
    pub suggestion_id: SuggestionId,
    pub suggestion_type: SuggestionType,
    pub target_type: TargetType,
    pub target_id: TargetId,
    pub status: SuggestionStatus,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_msecs: Option<f64>,
    pub change: serde_json::Value,
}

impl SuggestionBackendDict {
    pub fn decode_change(&self) -> Result<SuggestionChange, serde_json::Error> {
        match self.suggestion_type {
            SuggestionType::AddQuestion => {
                serde_json::from_value(self.change.clone()).map(SuggestionChange::AddQuestion)
            }
            SuggestionType::TranslateContent => {
                serde_json::from_value(self.change.clone()).map(SuggestionChange::TranslateContent)
            }
        }
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        let msecs = self.last_updated_msecs?;
        Utc.timestamp_millis_opt(msecs as i64).single()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionChange {
    AddQuestion(QuestionChange),
    TranslateContent(TranslationChange),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionChange {
    #[serde(default)]
    pub cmd: String,
    pub question_dict: QuestionDict,
    pub skill_id: SkillId,
    pub skill_difficulty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDict {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuestionId>,
    pub question_state_data: QuestionStateData,
    #[serde(default)]
    pub language_code: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub linked_skill_ids: Vec<SkillId>,
}

/// Only the content is interpreted client-side; interaction, hints and
/// the rest of the state are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStateData {
    pub content: SubtitledHtml,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitledHtml {
    #[serde(default)]
    pub content_id: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationChange {
    #[serde(default)]
    pub cmd: String,
    pub state_name: String,
    pub content_id: String,
    pub language_code: String,
    pub content_html: String,
    pub translation_html: String,
}

/// Opportunity details for the skill a question suggestion targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDetails {
    pub skill_description: String,
    #[serde(default)]
    pub skill_rubrics: Vec<Rubric>,
}

/// Opportunity details for the chapter a translation suggestion targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterDetails {
    pub topic_name: String,
    pub story_title: String,
    pub chapter_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionListResponse {
    pub suggestions: Vec<SuggestionBackendDict>,
    #[serde(default)]
    pub target_id_to_opportunity_dict: HashMap<TargetId, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillResolutionRequest {
    pub action: ReviewAction,
    pub review_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_difficulty: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationResolutionRequest {
    pub action: ReviewAction,
    pub review_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_is_logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub is_moderator: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_site_language_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityRights {
    pub can_review_questions: bool,
    #[serde(default)]
    pub can_review_translation_for_language_codes: Vec<String>,
    #[serde(default)]
    pub can_review_voiceover_for_language_codes: Vec<String>,
}

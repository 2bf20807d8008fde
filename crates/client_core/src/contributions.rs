use chrono::{DateTime, Utc};
use shared::{
    domain::{SuggestionId, SuggestionStatus, SuggestionType, TargetId},
    protocol::{
        ChapterDetails, QuestionChange, SkillDetails, SuggestionBackendDict, SuggestionChange,
        SuggestionListResponse, TranslationChange,
    },
};
use tracing::warn;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionMeta {
    pub suggestion_id: SuggestionId,
    pub target_id: TargetId,
    pub author_name: String,
    pub status: SuggestionStatus,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SuggestionMeta {
    fn from_backend(dict: &SuggestionBackendDict) -> Self {
        Self {
            suggestion_id: dict.suggestion_id.clone(),
            target_id: dict.target_id.clone(),
            author_name: dict.author_name.clone(),
            status: dict.status,
            last_updated: dict.last_updated(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionContribution {
    pub suggestion: SuggestionMeta,
    pub change: QuestionChange,
    pub details: SkillDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationContribution {
    pub suggestion: SuggestionMeta,
    pub change: TranslationChange,
    pub details: ChapterDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContributionEntry {
    Question(QuestionContribution),
    Translation(TranslationContribution),
}

impl ContributionEntry {
    pub fn suggestion(&self) -> &SuggestionMeta {
        match self {
            ContributionEntry::Question(entry) => &entry.suggestion,
            ContributionEntry::Translation(entry) => &entry.suggestion,
        }
    }

    pub fn id(&self) -> &SuggestionId {
        &self.suggestion().suggestion_id
    }

    pub fn suggestion_type(&self) -> SuggestionType {
        match self {
            ContributionEntry::Question(_) => SuggestionType::AddQuestion,
            ContributionEntry::Translation(_) => SuggestionType::TranslateContent,
        }
    }
}

/// Entries in backend order, unique by suggestion id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionSet {
    entries: Vec<ContributionEntry>,
}

impl ContributionSet {
    /// A later entry with an id already present replaces the earlier one
    /// in place.
    pub fn insert(&mut self, entry: ContributionEntry) {
        match self.entries.iter_mut().find(|existing| existing.id() == entry.id()) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, id: &SuggestionId) -> Option<&ContributionEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn remove(&mut self, id: &SuggestionId) -> Option<ContributionEntry> {
        let index = self.entries.iter().position(|entry| entry.id() == id)?;
        Some(self.entries.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContributionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs each suggestion in a listing with the opportunity details of
    /// its target. Suggestions whose target has no details are skipped.
    pub fn from_listing(response: SuggestionListResponse) -> Result<Self, ClientError> {
        let SuggestionListResponse {
            suggestions,
            target_id_to_opportunity_dict: opportunities,
        } = response;

        let mut set = ContributionSet::default();
        for dict in suggestions {
            let change =
                dict.decode_change()
                    .map_err(|source| ClientError::MalformedSuggestion {
                        suggestion_id: dict.suggestion_id.clone(),
                        source,
                    })?;

            let Some(raw_details) = opportunities.get(&dict.target_id) else {
                warn!(
                    suggestion_id = %dict.suggestion_id,
                    target_id = %dict.target_id,
                    "no opportunity details for suggestion target; skipping"
                );
                continue;
            };

            let malformed = |source: serde_json::Error| ClientError::MalformedDetails {
                target_id: dict.target_id.clone(),
                source,
            };
            let suggestion = SuggestionMeta::from_backend(&dict);
            let entry = match change {
                SuggestionChange::AddQuestion(change) => {
                    ContributionEntry::Question(QuestionContribution {
                        suggestion,
                        change,
                        details: serde_json::from_value(raw_details.clone()).map_err(malformed)?,
                    })
                }
                SuggestionChange::TranslateContent(change) => {
                    ContributionEntry::Translation(TranslationContribution {
                        suggestion,
                        change,
                        details: serde_json::from_value(raw_details.clone()).map_err(malformed)?,
                    })
                }
            };
            set.insert(entry);
        }
        Ok(set)
    }
}

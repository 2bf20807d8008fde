use shared::domain::{SuggestionId, SuggestionType};

use crate::{
    contributions::{ContributionEntry, ContributionSet},
    labels::suggestion_label,
    RichTextPreview,
};

pub const REVIEW_BUTTON_TITLE: &str = "Review";
pub const VIEW_BUTTON_TITLE: &str = "View";

/// One row of the contributions list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionSummary {
    pub id: SuggestionId,
    pub heading: String,
    pub subheading: String,
    pub label_text: String,
    pub label_color: String,
    pub action_button_title: String,
}

pub struct ContributionSummaryBuilder<'a> {
    preview: &'a dyn RichTextPreview,
}

impl<'a> ContributionSummaryBuilder<'a> {
    pub fn new(preview: &'a dyn RichTextPreview) -> Self {
        Self { preview }
    }

    pub fn build(
        &self,
        contributions: &ContributionSet,
        active_review_tab: Option<SuggestionType>,
    ) -> Vec<ContributionSummary> {
        contributions
            .iter()
            .map(|entry| self.summarize(entry, active_review_tab))
            .collect()
    }

    pub fn summarize(
        &self,
        entry: &ContributionEntry,
        active_review_tab: Option<SuggestionType>,
    ) -> ContributionSummary {
        let (heading, subheading) = match entry {
            ContributionEntry::Question(question) => (
                self.preview
                    .preview(&question.change.question_dict.question_state_data.content.html),
                question.details.skill_description.clone(),
            ),
            ContributionEntry::Translation(translation) => (
                self.preview.preview(&translation.change.translation_html),
                format!(
                    "{} / {} / {}",
                    translation.details.topic_name,
                    translation.details.story_title,
                    translation.details.chapter_title
                ),
            ),
        };
        let label = suggestion_label(entry.suggestion().status);
        let action_button_title = if active_review_tab == Some(entry.suggestion_type()) {
            REVIEW_BUTTON_TITLE
        } else {
            VIEW_BUTTON_TITLE
        };

        ContributionSummary {
            id: entry.id().clone(),
            heading,
            subheading,
            label_text: label.text.to_string(),
            label_color: label.color.to_string(),
            action_button_title: action_button_title.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rte_preview::FormatRtePreview;
    use serde_json::json;
    use shared::protocol::SuggestionListResponse;

    fn mixed_set() -> ContributionSet {
        let response: SuggestionListResponse = serde_json::from_value(json!({
            "suggestions": [
                {
                    "suggestion_id": "skill.s1.q1",
                    "suggestion_type": "add_question",
                    "target_type": "skill",
                    "target_id": "s1",
                    "status": "accepted",
                    "author_name": "ada",
                    "change": {
                        "question_dict": {
                            "question_state_data": {
                                "content": {"content_id": "content", "html": "<p>Add <b>2</b> and 2</p>"}
                            }
                        },
                        "skill_id": "s1",
                        "skill_difficulty": 0.6
                    }
                },
                {
                    "suggestion_id": "exploration.e1.t1",
                    "suggestion_type": "translate_content",
                    "target_type": "exploration",
                    "target_id": "e1",
                    "status": "review",
                    "author_name": "grace",
                    "change": {
                        "state_name": "Intro",
                        "content_id": "content",
                        "language_code": "fr",
                        "content_html": "<p>Hello</p>",
                        "translation_html": "<p>Bonjour</p>"
                    }
                }
            ],
            "target_id_to_opportunity_dict": {
                "s1": {"skill_description": "Addition", "skill_rubrics": []},
                "e1": {"topic_name": "Greetings", "story_title": "Trip", "chapter_title": "Arrival"}
            }
        }))
        .expect("listing");
        ContributionSet::from_listing(response).expect("set")
    }

    #[test]
    fn projects_headings_and_labels_per_kind() {
        let preview = FormatRtePreview;
        let summaries = ContributionSummaryBuilder::new(&preview).build(&mixed_set(), None);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].heading, "Add 2 and 2");
        assert_eq!(summaries[0].subheading, "Addition");
        assert_eq!(summaries[0].label_text, "Accepted");
        assert_eq!(summaries[1].heading, "Bonjour");
        assert_eq!(summaries[1].subheading, "Greetings / Trip / Arrival");
        assert_eq!(summaries[1].label_color, "#eeeeee");
        assert!(summaries
            .iter()
            .all(|summary| !summary.heading.is_empty() && !summary.subheading.is_empty()));
    }

    #[test]
    fn review_button_only_for_active_review_kind() {
        let preview = FormatRtePreview;
        let builder = ContributionSummaryBuilder::new(&preview);
        let set = mixed_set();

        let titles = |tab| -> Vec<String> {
            builder
                .build(&set, tab)
                .into_iter()
                .map(|summary| summary.action_button_title)
                .collect()
        };
        assert_eq!(titles(None), vec!["View", "View"]);
        assert_eq!(titles(Some(SuggestionType::AddQuestion)), vec!["Review", "View"]);
        assert_eq!(
            titles(Some(SuggestionType::TranslateContent)),
            vec!["View", "Review"]
        );
    }
}

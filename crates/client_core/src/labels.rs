use shared::domain::SuggestionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionLabel {
    pub text: &'static str,
    pub color: &'static str,
}

const AWAITING_REVIEW: SuggestionLabel = SuggestionLabel {
    text: "Awaiting review",
    color: "#eeeeee",
};
const ACCEPTED: SuggestionLabel = SuggestionLabel {
    text: "Accepted",
    color: "#8ed274",
};
const REJECTED: SuggestionLabel = SuggestionLabel {
    text: "Rejected",
    color: "#e76c8c",
};

pub fn suggestion_label(status: SuggestionStatus) -> SuggestionLabel {
    match status {
        SuggestionStatus::Review => AWAITING_REVIEW,
        SuggestionStatus::Accepted => ACCEPTED,
        SuggestionStatus::Rejected => REJECTED,
    }
}

use crate::RichTextPreview;

const COMPONENT_TAG_PREFIX: &str = "oppia-noninteractive";

/// Strips markup, keeping rich-text components visible as `[Name]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatRtePreview;

impl RichTextPreview for FormatRtePreview {
    fn preview(&self, html: &str) -> String {
        format_rte_preview(html)
    }
}

pub fn format_rte_preview(html: &str) -> String {
    let html = replace_ignore_ascii_case(html, "&nbsp;", " ");
    let html = replace_ignore_ascii_case(&html, "&quot;", "");

    let mut out = String::with_capacity(html.len());
    let mut rest = html.as_str();
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tag_start = &rest[open..];
        let Some(close) = tag_start.find('>') else {
            out.push_str(tag_start);
            rest = "";
            break;
        };
        let inner = &tag_start[1..close];
        if let Some(name) = component_name(inner) {
            out.push_str(" [");
            out.push_str(&name);
            out.push_str("] ");
        }
        rest = &tag_start[close + 1..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// `oppia-noninteractive-image filepath-with-value=...` yields `Image`.
fn component_name(tag: &str) -> Option<String> {
    let after_prefix = tag.strip_prefix(COMPONENT_TAG_PREFIX)?;
    let name = after_prefix
        .strip_prefix('-')?
        .split(['-', ' ', '/'])
        .next()
        .unwrap_or_default();
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

fn replace_ignore_ascii_case(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (index, _) in lower.match_indices(needle) {
        out.push_str(&haystack[last..index]);
        out.push_str(replacement);
        last = index + needle.len();
    }
    out.push_str(&haystack[last..]);
    out
}

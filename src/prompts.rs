//! Prompt templates for the commercial-analyst model call.
//!
//! The default template is used unless
//! [`crate::config::AnalysisConfig::prompt_template`] overrides it. Templates
//! mark where the extracted report goes with [`REPORT_PLACEHOLDER`].

/// Marker replaced by the extracted report text.
pub const REPORT_PLACEHOLDER: &str = "{report}";

/// Default instruction template sent to the model.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are a commercial analyst assistant. Based on the following report, summarize the key insights and suggest:
1. Sales strategies
2. Product portfolio recommendations
3. Resource allocation insights

Report:
{report}";

/// The three recommendation categories the default template asks for.
pub const RECOMMENDATION_CATEGORIES: [&str; 3] = [
    "Sales strategies",
    "Product portfolio recommendations",
    "Resource allocation insights",
];

/// Build the default prompt for `text`.
///
/// Total: any input, including the empty string, yields a prompt that embeds
/// it verbatim under the "Report:" label. No truncation or escaping.
pub fn build_prompt(text: &str) -> String {
    render_prompt(DEFAULT_PROMPT_TEMPLATE, text)
}

/// Substitute `text` for the first [`REPORT_PLACEHOLDER`] in `template`.
///
/// The inserted text is not rescanned, so a report that itself contains
/// `{report}` is embedded unchanged. A template without the placeholder gets
/// the report appended on its own line.
pub fn render_prompt(template: &str, text: &str) -> String {
    match template.split_once(REPORT_PLACEHOLDER) {
        Some((before, after)) => {
            let mut prompt = String::with_capacity(template.len() + text.len());
            prompt.push_str(before);
            prompt.push_str(text);
            prompt.push_str(after);
            prompt
        }
        None => format!("{template}\n{text}"),
    }
}

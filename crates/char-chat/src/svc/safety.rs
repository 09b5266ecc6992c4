//! Detection of replies that warrant a wellbeing notice.

const WARNING_KEYWORDS: [&str; 5] = [
    "suicide",
    "self-harm",
    "kill myself",
    "harm myself",
    "end my life",
];

/// Returns true if `text` mentions self-harm, ignoring case.
pub fn needs_warning(text: &str) -> bool {
    let text = text.to_lowercase();
    WARNING_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

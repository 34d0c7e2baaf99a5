//! Content formatting for chat bubbles.
//!
//! User text is escaped before it reaches markup. Agent text is trusted:
//! bracketed role tags are emphasized and newlines become line breaks.

use std::sync::LazyLock;

use regex::Regex;

/// Escapes HTML metacharacters so `text` renders literally.
#[must_use]
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Bracketed role tag such as `[Researcher]`.
static ROLE_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").ok());

/// Wraps every non-empty `[Role]` tag in `<strong>`.
#[must_use]
pub fn emphasize_roles(text: &str) -> String {
    match ROLE_TAG.as_ref() {
        Some(tag) => tag.replace_all(text, "<strong>[$1]</strong>").into_owned(),
        None => text.to_string(),
    }
}

/// Formats a crew reply as bubble markup.
#[must_use]
pub fn format_agent_message(text: &str) -> String {
    emphasize_roles(text).replace('\n', "<br>")
}

/// Formats user text as bubble markup.
#[must_use]
pub fn format_user_message(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text))
}

use time::macros::format_description;
use time::OffsetDateTime;
use unicode_segmentation::UnicodeSegmentation;

const ELLIPSIS: &str = "\u{2026}";

/// Title for a freshly created conversation, e.g. `Chat 10/19/2026, 3:04:05 PM`.
#[must_use]
pub fn creation_title() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    creation_title_at(now)
}

#[must_use]
pub fn creation_title_at(at: OffsetDateTime) -> String {
    let format = format_description!(
        "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
    );
    match at.format(&format) {
        Ok(stamp) => format!("Chat {stamp}"),
        Err(error) => {
            tracing::debug!(%error, "falling back to unix timestamp title");
            format!("Chat {}", at.unix_timestamp())
        }
    }
}

/// Truncates `title` to at most `max_chars` grapheme clusters, ending with `…`
/// when anything was cut.
#[must_use]
pub fn display_title(title: &str, max_chars: usize) -> String {
    let graphemes: Vec<&str> = title.graphemes(true).collect();
    if graphemes.len() <= max_chars {
        return title.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let kept = graphemes[..max_chars - 1].concat();
    format!("{}{ELLIPSIS}", kept.trim_end())
}

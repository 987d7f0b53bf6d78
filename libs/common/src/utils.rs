use chrono::{DateTime, Utc};
use uuid::Uuid;

pub fn generate_id() -> Uuid {
    Uuid::new_v4()
}

pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Hard truncation with a trailing ellipsis. Used for display titles.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let truncated: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Truncation that backs up to the last word boundary before appending "...".
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) => &cut[..idx],
        None => cut.as_str(),
    };
    format!("{}...", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_with_ellipsis_leaves_short_text_alone() {
        assert_eq!(truncate_with_ellipsis("short", 80), "short");
    }

    #[test]
    fn truncate_with_ellipsis_cuts_long_text() {
        let text = "a".repeat(100);
        let out = truncate_with_ellipsis(&text, 80);
        assert_eq!(out.chars().count(), 83);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncate_at_word_backs_up_to_boundary() {
        let text = "the quick brown fox jumps over the lazy dog and keeps on running far away";
        let out = truncate_at_word(text, 30);
        assert!(out.len() <= 30);
        assert!(out.ends_with("..."));
        assert!(!out.contains("jumps"));
    }
}

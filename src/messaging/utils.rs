use crate::bot_handler::CallbackAction;

/// Serializes a `CallbackAction` to a JSON string. Used for keyboard buttons.
/// expect is ok because inputs are simple and controlled.
pub fn serialize_action(action: &CallbackAction) -> String {
    serde_json::to_string(action).expect("Failed to serialize action")
}

/// Cut `text` to at most `max_chars` characters, appending "..." when
/// something was removed.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Icon of a toggle.
pub fn check_mark(enabled: bool) -> &'static str {
    if enabled { "✅" } else { "❌" }
}

/// `count` stars, at most `max`.
pub fn stars(count: u8, max: u8) -> String {
    "⭐".repeat(usize::from(count.min(max)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_with_ellipsis("a longer sentence", 8), "a longer...");
        assert_eq!(truncate_with_ellipsis("ação rápida", 4), "ação...");
    }

    #[test]
    fn test_serialize_action() {
        let action = CallbackAction::Help;
        let serialized = serialize_action(&action);
        assert_eq!(serialized, r#""hlp""#);
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(3, 5), "⭐⭐⭐");
        assert_eq!(stars(9, 5), "⭐⭐⭐⭐⭐");
        assert_eq!(stars(0, 5), "");
    }
}

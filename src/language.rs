use crate::schema::Language;
use whatlang::{Lang, Script};

const GREETINGS: &[&str] = &[
    "bonjour",
    "bonsoir",
    "salut",
    "hello",
    "hi",
    "مرحبًا",
    "سلام",
    "bon journée",
    "good morning",
];

const MAX_GREETING_TOKENS: usize = 3;

/// Detects French, English or Arabic. Other Arabic-script text counts as Arabic;
/// anything else, or a failed detection, is French.
pub fn detect_language(text: &str) -> Language {
    match whatlang::detect(text).map(|info| info.lang()) {
        Some(Lang::Ara) => Language::Arabic,
        Some(Lang::Eng) => Language::English,
        Some(Lang::Fra) => Language::French,
        _ if whatlang::detect_script(text) == Some(Script::Arabic) => Language::Arabic,
        _ => Language::default(),
    }
}

/// Lower-cases, trims, and strips everything except word characters and whitespace.
fn clean(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

/// True for a bare greeting, or a short message of at most three tokens that carries one.
pub fn is_simple_greeting(message: &str) -> bool {
    let cleaned = clean(message);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return false;
    }

    if GREETINGS.iter().any(|g| clean(g) == cleaned) {
        return true;
    }

    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.len() > MAX_GREETING_TOKENS {
        return false;
    }

    GREETINGS.iter().map(|g| clean(g)).any(|greeting| {
        if greeting.contains(' ') {
            cleaned.contains(&greeting)
        } else {
            tokens.iter().any(|t| *t == greeting)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_greetings() {
        assert!(is_simple_greeting("Bonjour"));
        assert!(is_simple_greeting("Hi"));
        assert!(is_simple_greeting("hello there"));
        assert!(is_simple_greeting("Salut !"));
        assert!(is_simple_greeting("  Good morning, team "));
        assert!(is_simple_greeting("مرحبًا"));
    }

    #[test]
    fn test_questions_are_not_greetings() {
        assert!(!is_simple_greeting("Bonjour, quel est le budget de 2026?"));
        assert!(!is_simple_greeting("budget par entité"));
        assert!(!is_simple_greeting("this is it"));
        assert!(!is_simple_greeting("?!"));
        assert!(!is_simple_greeting(""));
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(
            detect_language("Quelle est la répartition du budget entre les différentes régions cette année ?"),
            Language::French
        );
        assert_eq!(
            detect_language("What is the total budget allocated to the northern region this year?"),
            Language::English
        );
        assert_eq!(
            detect_language("ما هو إجمالي الميزانية المخصصة للمنطقة الشمالية في هذه السنة؟"),
            Language::Arabic
        );
    }

    #[test]
    fn test_short_arabic_script_is_arabic() {
        assert_eq!(detect_language("سلام"), Language::Arabic);
        assert_eq!(detect_language("مرحبًا"), Language::Arabic);
    }

    #[test]
    fn test_unknown_language_defaults_to_french() {
        assert_eq!(detect_language(""), Language::French);
        assert_eq!(detect_language("12345"), Language::French);
    }
}

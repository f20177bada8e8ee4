use once_cell::sync::Lazy;
use regex::Regex;

const TITLE_TOKENS: usize = 5;
const DESCRIPTION_TOKENS: usize = 3;
pub const MAX_TAGS: usize = 10;

static TITLE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[가-힣A-Za-z0-9]+").expect("valid regex"));
static HANGUL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[가-힣]{2,}").expect("valid regex"));

/// Post hashtags: the first title words followed by the first Hangul words
/// of the description, de-duplicated in order.
pub fn generate_tags(title: &str, description: &str) -> Vec<String> {
    let candidates = TITLE_WORD
        .find_iter(title)
        .take(TITLE_TOKENS)
        .chain(HANGUL_WORD.find_iter(description).take(DESCRIPTION_TOKENS))
        .map(|m| m.as_str());

    let mut tags: Vec<String> = Vec::new();
    for candidate in candidates {
        if !tags.iter().any(|tag| tag == candidate) {
            tags.push(candidate.to_string());
        }
    }
    tags.truncate(MAX_TAGS);
    tags
}

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

/// Splits on `.`, `!` or `?` followed by whitespace, keeping the terminator
/// with its sentence. Surrounding whitespace is trimmed; empty pieces dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for terminator in SENTENCE_END.find_iter(text) {
        // the terminator is a single ASCII byte
        let sentence = text[start..terminator.start() + 1].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = terminator.end();
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Groups sentences into paragraphs of three, dropping to two whenever the
/// index of the paragraph's first sentence satisfies `(i + 2) % 5 == 0`.
pub fn to_paragraphs(text: &str) -> Vec<String> {
    let sentences = split_sentences(text);
    let mut paragraphs = Vec::new();
    let mut i = 0;

    while i < sentences.len() {
        let size = if (i + 2) % 5 == 0 { 2 } else { 3 };
        let end = (i + size).min(sentences.len());
        paragraphs.push(sentences[i..end].join(" "));
        i += size;
    }

    paragraphs
}

/// [`to_paragraphs`] joined with blank lines.
pub fn format_paragraphs(text: &str) -> String {
    to_paragraphs(text).join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_terminators() {
        assert_eq!(
            split_sentences("좋아요! 정말요? 네. 끝"),
            vec!["좋아요!", "정말요?", "네.", "끝"]
        );
    }

    #[test]
    fn test_decimal_points_do_not_split() {
        assert_eq!(split_sentences("용량은 2.5L 입니다. 좋네요."), vec!["용량은 2.5L 입니다.", "좋네요."]);
    }

    #[test]
    fn test_paragraph_sizes_alternate() {
        let text = (1..=10).map(|n| format!("s{}.", n)).collect::<Vec<_>>().join(" ");
        let sizes: Vec<usize> = to_paragraphs(&text)
            .iter()
            .map(|p| p.split(' ').count())
            .collect();
        // first sentences at 0, 3, 5, 8 -> sizes 3, 2, 3, 2
        assert_eq!(sizes, vec![3, 2, 3, 2]);
    }

    #[test]
    fn test_empty_input() {
        assert!(to_paragraphs("").is_empty());
        assert!(to_paragraphs("   ").is_empty());
        assert_eq!(format_paragraphs(""), "");
    }

    #[test]
    fn test_format_joins_with_blank_line() {
        assert_eq!(format_paragraphs("a. b. c. d."), "a. b. c.\n\nd.");
    }
}

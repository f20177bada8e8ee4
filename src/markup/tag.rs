use std::fmt;

/// One line of the bracketed markup grammar.
///
/// The same type renders the tokens into prompt templates and recognises them
/// in model output, so both sides always agree on the literal spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `[TEXT]`
    Text,
    /// `[QUOTE:VERTICAL]`, the post title
    QuoteVertical,
    /// `[QUOTE:UNDERLINE]`, opens the next advantage section
    QuoteUnderline,
    /// `[IMAGE:n]` or `[IMAGE:n,m]` with 1-based indices
    Image(Vec<usize>),
    /// `[LINK]`
    Link,
}

impl Tag {
    /// Recognises a trimmed markup line. Tags are case-sensitive.
    pub fn parse(line: &str) -> Option<Tag> {
        match line {
            "[TEXT]" => Some(Tag::Text),
            "[QUOTE:VERTICAL]" => Some(Tag::QuoteVertical),
            "[QUOTE:UNDERLINE]" => Some(Tag::QuoteUnderline),
            "[LINK]" => Some(Tag::Link),
            _ => line.strip_prefix("[IMAGE:").map(|rest| {
                let body = rest.strip_suffix(']').unwrap_or(rest);
                Tag::Image(parse_indices(body))
            }),
        }
    }
}

/// Comma-separated indices; anything that is not a plain number is skipped.
fn parse_indices(body: &str) -> Vec<usize> {
    body.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|n| n.parse().ok())
        .collect()
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Text => f.write_str("[TEXT]"),
            Tag::QuoteVertical => f.write_str("[QUOTE:VERTICAL]"),
            Tag::QuoteUnderline => f.write_str("[QUOTE:UNDERLINE]"),
            Tag::Link => f.write_str("[LINK]"),
            Tag::Image(indices) => {
                let joined = indices
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "[IMAGE:{}]", joined)
            }
        }
    }
}

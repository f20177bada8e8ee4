use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest product description forwarded to the prompt, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Product data scraped from the shopping page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductFacts {
    pub title: String,
    pub price: String,
    /// At most [`MAX_DESCRIPTION_CHARS`] characters
    pub description: String,
    pub image_count: usize,
}

impl ProductFacts {
    /// Builds product facts, truncating the description to 500 characters.
    pub fn new(
        title: impl Into<String>,
        price: impl Into<String>,
        description: impl AsRef<str>,
        image_count: usize,
    ) -> Self {
        ProductFacts {
            title: title.into(),
            price: price.into(),
            description: truncate_chars(description.as_ref(), MAX_DESCRIPTION_CHARS),
            image_count,
        }
    }
}

/// Document section a content element belongs to.
///
/// Serialized as `title`, `intro`, `advantage_N`, `disadvantage` or `conclusion`,
/// the same names the highlight JSON block uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Section {
    Title,
    Intro,
    /// 1-based advantage index
    Advantage(u32),
    Disadvantage,
    Conclusion,
}

impl Section {
    pub fn is_disadvantage(&self) -> bool {
        matches!(self, Section::Disadvantage)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Title => write!(f, "title"),
            Section::Intro => write!(f, "intro"),
            Section::Advantage(n) => write!(f, "advantage_{}", n),
            Section::Disadvantage => write!(f, "disadvantage"),
            Section::Conclusion => write!(f, "conclusion"),
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "title" => Ok(Section::Title),
            "intro" => Ok(Section::Intro),
            "disadvantage" => Ok(Section::Disadvantage),
            "conclusion" => Ok(Section::Conclusion),
            other => other
                .strip_prefix("advantage_")
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .map(Section::Advantage)
                .ok_or_else(|| format!("Unknown section: {}", other)),
        }
    }
}

impl TryFrom<String> for Section {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Section> for String {
    fn from(section: Section) -> Self {
        section.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// Title quote, `[QUOTE:VERTICAL]`
    Vertical,
    /// Advantage heading, `[QUOTE:UNDERLINE]`
    Underline,
}

/// One typed block of the generated post, in document order.
///
/// The shopping link is carried as a `Text` element in the conclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentElement {
    Quote {
        style: QuoteStyle,
        text: String,
        section: Section,
    },
    Text {
        text: String,
        section: Section,
    },
    Image {
        refs: Vec<String>,
        single: bool,
        section: Section,
    },
}

impl ContentElement {
    pub fn section(&self) -> Section {
        match self {
            ContentElement::Quote { section, .. }
            | ContentElement::Text { section, .. }
            | ContentElement::Image { section, .. } => *section,
        }
    }
}

/// Inline emphasis the renderer knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightStyle {
    Bold,
    Italic,
    Underline,
    FontColor,
    BgColor,
    FontSize,
    BoldFont,
    BoldBg,
}

impl HighlightStyle {
    pub const ALL: [HighlightStyle; 8] = [
        HighlightStyle::Bold,
        HighlightStyle::Italic,
        HighlightStyle::Underline,
        HighlightStyle::FontColor,
        HighlightStyle::BgColor,
        HighlightStyle::FontSize,
        HighlightStyle::BoldFont,
        HighlightStyle::BoldBg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightStyle::Bold => "bold",
            HighlightStyle::Italic => "italic",
            HighlightStyle::Underline => "underline",
            HighlightStyle::FontColor => "font_color",
            HighlightStyle::BgColor => "bg_color",
            HighlightStyle::FontSize => "font_size",
            HighlightStyle::BoldFont => "bold_font",
            HighlightStyle::BoldBg => "bold_bg",
        }
    }
}

impl FromStr for HighlightStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HighlightStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown highlight style: {}", s))
    }
}

/// A keyword the model asked to emphasise inside one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRequest {
    pub text: String,
    pub style: HighlightStyle,
    pub section: Section,
}

/// A styled byte range inside a section's formatted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    pub text: String,
    pub style: HighlightStyle,
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

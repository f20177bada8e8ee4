use log::debug;

use super::tag::Tag;
use crate::model::{ContentElement, QuoteStyle, Section};

/// Decides whether a text block belongs to the disadvantage section.
pub trait DisadvantageDetector {
    fn is_disadvantage(&self, text: &str) -> bool;
}

/// Substring match against a fixed keyword list.
#[derive(Debug, Clone)]
pub struct KeywordDetector {
    keywords: Vec<String>,
}

impl KeywordDetector {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeywordDetector {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for KeywordDetector {
    fn default() -> Self {
        KeywordDetector::new([
            "아쉬운",
            "불편",
            "단점",
            "아쉽",
            "불만",
            "unfortunately",
            "inconvenient",
            "downside",
            "drawback",
            "disappoint",
            "complaint",
        ])
    }
}

impl DisadvantageDetector for KeywordDetector {
    fn is_disadvantage(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword.as_str()))
    }
}

/// Section bookkeeping while walking the markup.
#[derive(Debug)]
struct SectionTracker {
    current: Section,
    advantage_count: u32,
    in_disadvantage: bool,
}

impl SectionTracker {
    fn new() -> Self {
        SectionTracker {
            current: Section::Intro,
            advantage_count: 0,
            in_disadvantage: false,
        }
    }

    fn open_advantage(&mut self) -> Section {
        self.advantage_count += 1;
        self.current = Section::Advantage(self.advantage_count);
        self.current
    }

    fn classify_text(&mut self, is_disadvantage: bool) -> Section {
        if is_disadvantage {
            self.in_disadvantage = true;
            Section::Disadvantage
        } else if self.in_disadvantage {
            self.in_disadvantage = false;
            self.current = Section::Conclusion;
            Section::Conclusion
        } else if self.advantage_count == 0 {
            Section::Intro
        } else {
            self.current
        }
    }
}

/// Turns the model's tagged response into content elements.
///
/// Malformed input never fails: unknown lines, tags without a body and
/// out-of-range image indices are skipped.
#[derive(Debug, Clone, Default)]
pub struct MarkupParser<D = KeywordDetector> {
    detector: D,
}

impl MarkupParser {
    pub fn new() -> Self {
        MarkupParser::default()
    }
}

impl<D: DisadvantageDetector> MarkupParser<D> {
    pub fn with_detector(detector: D) -> Self {
        MarkupParser { detector }
    }

    /// Parses `raw` in document order.
    ///
    /// `image_refs` resolves the 1-based `[IMAGE:n]` indices; `link_url` is
    /// emitted for `[LINK]` as conclusion text.
    pub fn parse(&self, raw: &str, image_refs: &[String], link_url: &str) -> Vec<ContentElement> {
        let lines: Vec<&str> = raw.lines().map(str::trim).collect();
        let mut tracker = SectionTracker::new();
        let mut elements = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            i += 1;

            let Some(tag) = Tag::parse(line) else {
                continue;
            };

            match tag {
                Tag::QuoteVertical => {
                    if let Some(text) = take_body(&lines, &mut i) {
                        elements.push(ContentElement::Quote {
                            style: QuoteStyle::Vertical,
                            text: text.to_string(),
                            section: Section::Title,
                        });
                    }
                }
                Tag::QuoteUnderline => {
                    let section = tracker.open_advantage();
                    if let Some(text) = take_body(&lines, &mut i) {
                        elements.push(ContentElement::Quote {
                            style: QuoteStyle::Underline,
                            text: text.to_string(),
                            section,
                        });
                    }
                }
                Tag::Text => {
                    if let Some(text) = take_body(&lines, &mut i) {
                        let section = tracker.classify_text(self.detector.is_disadvantage(text));
                        elements.push(ContentElement::Text {
                            text: text.to_string(),
                            section,
                        });
                    }
                }
                Tag::Image(indices) => {
                    let refs: Vec<String> = indices
                        .iter()
                        .filter(|&&n| n >= 1 && n <= image_refs.len())
                        .map(|&n| image_refs[n - 1].clone())
                        .collect();

                    if refs.len() < indices.len() {
                        debug!(
                            "Dropped {} out-of-range image indices from {}",
                            indices.len() - refs.len(),
                            line
                        );
                    }

                    if !refs.is_empty() {
                        elements.push(ContentElement::Image {
                            single: refs.len() == 1,
                            refs,
                            section: tracker.current,
                        });
                    }
                }
                Tag::Link => elements.push(ContentElement::Text {
                    text: link_url.to_string(),
                    section: Section::Conclusion,
                }),
            }
        }

        debug!("Parsed {} content elements", elements.len());
        elements
    }
}

/// The next non-blank line, unless it is itself a tag.
fn take_body<'a>(lines: &[&'a str], i: &mut usize) -> Option<&'a str> {
    while *i < lines.len() && lines[*i].is_empty() {
        *i += 1;
    }
    let line = *lines.get(*i)?;
    if Tag::parse(line).is_some() {
        return None;
    }
    *i += 1;
    Some(line)
}

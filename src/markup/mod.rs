//! The bracketed markup grammar: tags, the section-tracking parser, the
//! post-processing applied to raw model output and paragraph segmentation.

mod parser;
mod response;
mod segment;
mod tag;

pub use parser::{DisadvantageDetector, KeywordDetector, MarkupParser};
pub use response::{soft_avoid_phrases, split_response, strip_markdown, GeneratedResponse};
pub use segment::{format_paragraphs, split_sentences, to_paragraphs};
pub use tag::Tag;

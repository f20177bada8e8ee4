//! Hands parsed elements to the external renderer with their formatted text
//! and inline styling resolved.

use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

use crate::highlight::{pick_color, split_runs, HighlightAssigner, QuoteDecoration, TextRun};
use crate::markup::{format_paragraphs, strip_markdown};
use crate::model::{ContentElement, HighlightRequest, HighlightSpan, Section};

/// A highlight span together with the colour the renderer should use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderSpan {
    #[serde(flatten)]
    pub span: HighlightSpan,
    pub color: Option<&'static str>,
}

/// One element ready for the editor writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderBlock {
    pub element: ContentElement,
    /// Paragraph-formatted body for text elements
    pub formatted_text: Option<String>,
    /// Sorted, non-overlapping byte ranges of `formatted_text`
    pub spans: Vec<RenderSpan>,
    pub quote_decoration: Option<QuoteDecoration>,
}

impl RenderBlock {
    /// Plain and styled runs of the formatted text, in typing order.
    pub fn runs(&self) -> Vec<TextRun<'_>> {
        let spans: Vec<HighlightSpan> = self.spans.iter().map(|s| s.span.clone()).collect();
        self.formatted_text
            .as_deref()
            .map(|text| split_runs(text, &spans))
            .unwrap_or_default()
    }
}

/// Formats text bodies and assigns highlights, keeping document order.
///
/// The per-section highlight quota holds across every text element of the
/// section, and a request styled once is not styled again. The shopping
/// link is passed through verbatim.
pub fn layout_elements<R: Rng + ?Sized>(
    elements: Vec<ContentElement>,
    highlights: &[HighlightRequest],
    link_url: &str,
    assigner: &HighlightAssigner,
    rng: &mut R,
) -> Vec<RenderBlock> {
    let mut used: HashMap<Section, Vec<String>> = HashMap::new();

    elements
        .into_iter()
        .map(|element| match &element {
            ContentElement::Quote { .. } => RenderBlock {
                element,
                formatted_text: None,
                spans: Vec::new(),
                quote_decoration: Some(QuoteDecoration::random(rng)),
            },
            ContentElement::Image { .. } => RenderBlock {
                element,
                formatted_text: None,
                spans: Vec::new(),
                quote_decoration: None,
            },
            ContentElement::Text { text, section } => {
                if !link_url.is_empty() && text == link_url {
                    return RenderBlock {
                        formatted_text: Some(text.clone()),
                        element,
                        spans: Vec::new(),
                        quote_decoration: None,
                    };
                }

                let formatted = format_paragraphs(&strip_markdown(text));
                let taken = used.entry(*section).or_default();
                let remaining = assigner.max_per_section().saturating_sub(taken.len());

                let spans = if remaining == 0 {
                    Vec::new()
                } else {
                    let open: Vec<HighlightRequest> = highlights
                        .iter()
                        .filter(|request| !taken.contains(&request.text))
                        .cloned()
                        .collect();
                    assigner
                        .with_max_per_section(remaining)
                        .assign(&formatted, *section, &open, rng)
                };

                taken.extend(spans.iter().map(|span| span.text.clone()));
                let spans = spans
                    .into_iter()
                    .map(|span| RenderSpan {
                        color: pick_color(span.style, rng),
                        span,
                    })
                    .collect();

                RenderBlock {
                    formatted_text: Some(formatted),
                    element,
                    spans,
                    quote_decoration: None,
                }
            }
        })
        .collect()
}

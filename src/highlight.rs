//! Section-aware sampling of inline emphasis, plus the render hints the
//! editor writer needs to apply it.

use log::debug;
use rand::seq::{index, IndexedRandom};
use rand::Rng;
use serde::Serialize;

use crate::model::{HighlightRequest, HighlightSpan, HighlightStyle, Section};

/// Upper bound of styled spans per section.
pub const DEFAULT_MAX_PER_SECTION: usize = 3;

/// Picks which of the model's highlight requests actually get styled.
#[derive(Debug, Clone, Copy)]
pub struct HighlightAssigner {
    max_per_section: usize,
}

impl Default for HighlightAssigner {
    fn default() -> Self {
        HighlightAssigner {
            max_per_section: DEFAULT_MAX_PER_SECTION,
        }
    }
}

impl HighlightAssigner {
    pub fn new() -> Self {
        HighlightAssigner::default()
    }

    pub fn with_max_per_section(mut self, max_per_section: usize) -> Self {
        self.max_per_section = max_per_section.max(1);
        self
    }

    pub fn max_per_section(&self) -> usize {
        self.max_per_section
    }

    /// Every request of `section` located at its first occurrence in `text`,
    /// sorted by start offset with overlapping matches removed.
    ///
    /// When two matches overlap the one starting first wins; on equal starts
    /// the earlier request wins.
    pub fn candidates(
        &self,
        text: &str,
        section: Section,
        requests: &[HighlightRequest],
    ) -> Vec<HighlightSpan> {
        let mut matches: Vec<HighlightSpan> = requests
            .iter()
            .filter(|request| request.section == section && !request.text.is_empty())
            .filter_map(|request| {
                let start = text.find(request.text.as_str());
                if start.is_none() {
                    debug!("Highlight '{}' not found in {}", request.text, section);
                }
                start.map(|start| HighlightSpan {
                    start,
                    end: start + request.text.len(),
                    text: request.text.clone(),
                    style: request.style,
                })
            })
            .collect();

        matches.sort_by_key(|span| span.start);

        let mut resolved: Vec<HighlightSpan> = Vec::with_capacity(matches.len());
        for span in matches {
            match resolved.last() {
                Some(previous) if span.start < previous.end => {
                    debug!("Highlight '{}' overlaps '{}'", span.text, previous.text);
                }
                _ => resolved.push(span),
            }
        }
        resolved
    }

    /// Samples between one and `max_per_section` non-overlapping spans.
    ///
    /// The disadvantage section never receives highlights. The result is in
    /// left-to-right order whatever order the sampler drew it in.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        text: &str,
        section: Section,
        requests: &[HighlightRequest],
        rng: &mut R,
    ) -> Vec<HighlightSpan> {
        if section.is_disadvantage() {
            return Vec::new();
        }

        let candidates = self.candidates(text, section, requests);
        if candidates.is_empty() {
            return Vec::new();
        }

        let upper = self.max_per_section.min(candidates.len());
        let k = rng.random_range(1..=upper);

        let mut picked = index::sample(rng, candidates.len(), k).into_vec();
        picked.sort_unstable();

        let spans: Vec<HighlightSpan> = picked.into_iter().map(|i| candidates[i].clone()).collect();
        debug!("{}: styled {} of {} candidates", section, spans.len(), candidates.len());
        spans
    }
}

/// A maximal piece of text carrying one style, or none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub style: Option<HighlightStyle>,
}

/// Cuts `text` into the plain and styled runs a renderer types in sequence.
///
/// `spans` must be sorted and non-overlapping, as [`HighlightAssigner::assign`]
/// returns them; spans that violate this or fall outside `text` are skipped.
pub fn split_runs<'a>(text: &'a str, spans: &[HighlightSpan]) -> Vec<TextRun<'a>> {
    let mut runs = Vec::new();
    let mut cursor = 0;

    for span in spans {
        if span.start < cursor || text.get(span.start..span.end).is_none() {
            continue;
        }
        if span.start > cursor {
            runs.push(TextRun {
                text: &text[cursor..span.start],
                style: None,
            });
        }
        runs.push(TextRun {
            text: &text[span.start..span.end],
            style: Some(span.style),
        });
        cursor = span.end;
    }

    if cursor < text.len() {
        runs.push(TextRun {
            text: &text[cursor..],
            style: None,
        });
    }
    runs
}

/// Visual frame the editor draws around a quote block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteDecoration {
    Line,
    Underline,
    Corner,
}

impl QuoteDecoration {
    pub const ALL: [QuoteDecoration; 3] = [
        QuoteDecoration::Line,
        QuoteDecoration::Underline,
        QuoteDecoration::Corner,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> QuoteDecoration {
        *Self::ALL.choose(rng).unwrap_or(&QuoteDecoration::Line)
    }
}

/// Point size used for `font_size` highlights.
pub const LARGE_FONT_PT: u32 = 19;

// Darker tones of the editor palette, readable as text colour.
const FONT_PALETTE: &[&str] = &[
    "#ff5f45", "#ffa94f", "#ffef34", "#98d36c", "#00b976", "#00bfb5", "#00cdff", "#0095e9",
    "#bc61ab", "#ff65a8", "#ff0010", "#ff9300", "#ffd300", "#54b800", "#00a84b", "#009d91",
    "#00b3f2", "#0078cb", "#aa1f91", "#ff008c", "#ba0000", "#b85c00", "#ac9a00", "#36851e",
    "#007433", "#00756a", "#007aa6", "#004e82", "#740060", "#bb005c", "#700001", "#823f00",
    "#6a5f00", "#245b12", "#004e22", "#00554c", "#004e6a", "#003960", "#4f0041", "#830041",
    "#333333", "#555555", "#777777", "#999999",
];

// Light tones, used as a highlighter background.
const BACKGROUND_PALETTE: &[&str] = &[
    "#ffcdc0", "#ffe3c8", "#fff8b2", "#e3fdc8", "#c2f4db", "#bdfbfa", "#b0f1ff", "#9bdfff",
    "#fdd5f5", "#ffb7de", "#ffad98", "#ffd1a4", "#fff593", "#badf98", "#3fcc9c", "#15d0ca",
    "#28e1ff", "#5bc7ff", "#cd8bc0", "#ff97c1", "#f7f7f7", "#e2e2e2", "#c2c2c2", "#ffffff",
];

/// Hex colour for styles that carry one, `None` for the rest.
pub fn pick_color<R: Rng + ?Sized>(style: HighlightStyle, rng: &mut R) -> Option<&'static str> {
    let palette = match style {
        HighlightStyle::FontColor | HighlightStyle::BoldFont => FONT_PALETTE,
        HighlightStyle::BgColor | HighlightStyle::BoldBg => BACKGROUND_PALETTE,
        _ => return None,
    };
    palette.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request(text: &str, section: Section) -> HighlightRequest {
        HighlightRequest {
            text: text.to_string(),
            style: HighlightStyle::Bold,
            section,
        }
    }

    #[test]
    fn test_candidates_use_first_occurrence_and_skip_missing() {
        let text = "포근함이 좋고 포근함이 오래갑니다";
        let requests = vec![
            request("오래갑니다", Section::Intro),
            request("포근함", Section::Intro),
            request("없는 단어", Section::Intro),
            request("포근함", Section::Conclusion),
        ];
        let spans = HighlightAssigner::new().candidates(text, Section::Intro, &requests);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].start, 0);
        assert_eq!(&text[spans[1].start..spans[1].end], "오래갑니다");
    }

    #[test]
    fn test_candidates_drop_overlaps() {
        let text = "대용량 5L 물통";
        let requests = vec![
            request("용량 5L", Section::Intro),
            request("대용량", Section::Intro),
            request("물통", Section::Intro),
        ];
        let spans = HighlightAssigner::new().candidates(text, Section::Intro, &requests);
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["대용량", "물통"]);
    }

    #[test]
    fn test_disadvantage_never_styled() {
        let requests = vec![request("소음", Section::Disadvantage)];
        let mut rng = StdRng::seed_from_u64(3);
        let spans = HighlightAssigner::new().assign("소음이 큽니다", Section::Disadvantage, &requests, &mut rng);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_single_candidate_always_chosen() {
        let requests = vec![request("가볍다", Section::Advantage(1))];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let spans =
                HighlightAssigner::new().assign("정말 가볍다", Section::Advantage(1), &requests, &mut rng);
            assert_eq!(spans.len(), 1);
        }
    }

    #[test]
    fn test_split_runs_interleaves_plain_text() {
        let text = "아주 조용하고 가볍다";
        let spans = vec![
            HighlightSpan {
                start: text.find("조용").unwrap(),
                end: text.find("조용").unwrap() + "조용".len(),
                text: "조용".to_string(),
                style: HighlightStyle::Italic,
            },
            HighlightSpan {
                start: text.find("가볍다").unwrap(),
                end: text.len(),
                text: "가볍다".to_string(),
                style: HighlightStyle::Bold,
            },
        ];
        let runs = split_runs(text, &spans);
        assert_eq!(
            runs,
            vec![
                TextRun { text: "아주 ", style: None },
                TextRun { text: "조용", style: Some(HighlightStyle::Italic) },
                TextRun { text: "하고 ", style: None },
                TextRun { text: "가볍다", style: Some(HighlightStyle::Bold) },
            ]
        );
    }

    #[test]
    fn test_pick_color_palettes() {
        let mut rng = StdRng::seed_from_u64(11);
        let font = pick_color(HighlightStyle::BoldFont, &mut rng).unwrap();
        assert!(FONT_PALETTE.contains(&font));
        let bg = pick_color(HighlightStyle::BgColor, &mut rng).unwrap();
        assert!(BACKGROUND_PALETTE.contains(&bg));
        assert_eq!(pick_color(HighlightStyle::Italic, &mut rng), None);
    }

    #[test]
    fn test_quote_decoration_covers_all_variants() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(format!("{:?}", QuoteDecoration::random(&mut rng)));
        }
        assert_eq!(seen.len(), 3);
    }
}

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use rand::Rng;
use regex::{Captures, Regex};
use serde::Deserialize;
use serde_json::Value;

use crate::model::{HighlightRequest, HighlightStyle, Section};

const MIN_HIGHLIGHT_CHARS: usize = 2;
const MAX_HIGHLIGHT_CHARS: usize = 15;

static JSON_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid regex"));
static ANY_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json.*?```").expect("valid regex"));

/// Model output split into the markup body and the highlight requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedResponse {
    pub body: String,
    pub highlights: Vec<HighlightRequest>,
}

#[derive(Deserialize)]
struct HighlightBlock {
    #[serde(default)]
    highlights: Vec<Value>,
}

#[derive(Deserialize)]
struct RawHighlight {
    text: String,
    #[serde(default)]
    style: Option<String>,
    section: String,
}

/// Separates the fenced highlight JSON from the markup body.
///
/// A missing or malformed block yields no highlights; items with an unknown
/// section or style, or text outside 2-15 characters, are dropped one by one.
pub fn split_response(raw: &str) -> GeneratedResponse {
    let highlights = match JSON_BLOCK.captures(raw).and_then(|caps| caps.get(1)) {
        Some(block) => match serde_json::from_str::<HighlightBlock>(block.as_str()) {
            Ok(parsed) => {
                let requests: Vec<HighlightRequest> =
                    parsed.highlights.into_iter().filter_map(to_request).collect();
                info!("Extracted {} highlight requests", requests.len());
                requests
            }
            Err(e) => {
                warn!("Failed to parse highlight JSON: {}", e);
                Vec::new()
            }
        },
        None => {
            warn!("No highlight JSON block found in response");
            Vec::new()
        }
    };

    let body = ANY_JSON_FENCE.replace_all(raw, "").trim().to_string();

    GeneratedResponse { body, highlights }
}

fn to_request(item: Value) -> Option<HighlightRequest> {
    let raw: RawHighlight = serde_json::from_value(item).ok()?;

    let section: Section = raw.section.parse().ok()?;
    let style = match raw.style.as_deref() {
        None => HighlightStyle::Bold,
        Some(style) => match style.parse() {
            Ok(style) => style,
            Err(e) => {
                debug!("{}", e);
                return None;
            }
        },
    };

    let length = raw.text.chars().count();
    if !(MIN_HIGHLIGHT_CHARS..=MAX_HIGHLIGHT_CHARS).contains(&length) {
        debug!("Dropping highlight '{}' ({} chars)", raw.text, length);
        return None;
    }

    Some(HighlightRequest {
        text: raw.text,
        style,
        section,
    })
}

struct PhraseGroup {
    pattern: Regex,
    alternatives: &'static [&'static str],
}

fn phrase_group(targets: &[&str], alternatives: &'static [&'static str]) -> PhraseGroup {
    let alternation = targets
        .iter()
        .map(|target| regex::escape(target))
        .collect::<Vec<_>>()
        .join("|");
    PhraseGroup {
        pattern: Regex::new(&alternation).expect("escaped literals form a valid regex"),
        alternatives,
    }
}

static CLICHE_GROUPS: Lazy<Vec<PhraseGroup>> = Lazy::new(|| {
    vec![
        phrase_group(
            &[
                "안녕하세요!",
                "안녕하세요.",
                "안녕하세요",
                "요즘 필요한 제품을 찾다가",
                "여러 제품을 비교해본 결과",
            ],
            &[
                "첫 느낌부터",
                "처음 보고 느낀 건",
                "필요가 생겨 제품을 찾아보던 중",
                "사용 배경부터",
            ],
        ),
        phrase_group(
            &["정말 만족스러웠어요", "만족스러웠어요", "정말 만족스럽습니다"],
            &["쓸 만했습니다", "기대치엔 부합했습니다", "체감 성능은 무난했습니다"],
        ),
        phrase_group(
            &["가성비가 좋아요", "가격 대비 이 정도면 충분해요", "가격 대비 괜찮아요"],
            &[
                "가격 대비 포지션은 명확합니다",
                "동급 대비 조건은 나쁘지 않습니다",
                "예산 대비 선택지는 됩니다",
            ],
        ),
        phrase_group(
            &["추천드립니다", "추천합니다", "강추합니다"],
            &[
                "선택지로 고려해볼 만합니다",
                "이런 용도라면 맞을 수 있습니다",
                "상황에 따라 유효한 대안이 됩니다",
            ],
        ),
        phrase_group(
            &["물론 완벽한 제품은 없듯이", "아쉬운 부분도 있었어요"],
            &["완벽하진 않아서", "쓰다 보니 보완할 지점도 있습니다"],
        ),
    ]
});

/// Thins out stock phrases.
///
/// Per phrase group, the first occurrence survives with `keep_probability`
/// and is otherwise swapped for a random alternative; every later occurrence
/// is always swapped. Markup tags contain none of the targets and stay intact.
pub fn soft_avoid_phrases<R: Rng + ?Sized>(text: &str, rng: &mut R, keep_probability: f64) -> String {
    let keep_probability = if keep_probability.is_nan() {
        0.5
    } else {
        keep_probability.clamp(0.0, 1.0)
    };

    let mut current = text.to_string();
    for group in CLICHE_GROUPS.iter() {
        let mut seen = 0usize;
        let replaced = group.pattern.replace_all(&current, |caps: &Captures| {
            seen += 1;
            if seen == 1 && rng.random_bool(keep_probability) {
                caps[0].to_string()
            } else {
                group
                    .alternatives
                    .choose(rng)
                    .map(|alt| alt.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            }
        });
        current = replaced.into_owned();
    }
    current
}

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").expect("valid regex"));
static UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_(.+?)_").expect("valid regex"));

/// Removes `**bold**`, `*italic*` and `_emphasis_` markers, keeping the text.
pub fn strip_markdown(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    UNDERSCORE.replace_all(&text, "$1").into_owned()
}

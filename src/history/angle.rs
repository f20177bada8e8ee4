use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Category, HistoryEntry};
use crate::model::truncate_chars;

/// How many angles a suggestion carries.
const SUGGESTED_ANGLES: usize = 3;
const MAX_KEY_POINTS: usize = 5;
const MAX_KEY_POINT_CHARS: usize = 30;

/// Rhetorical framing of a review, used to keep successive posts in one
/// category from reading alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum ApproachAngle {
    MaterialTexture,
    SizeCapacity,
    FunctionPerformance,
    DesignColor,
    PriceValue,
    ConvenienceMaintenance,
    Safety,
    UsageExperience,
}

impl ApproachAngle {
    /// Canonical order; suggestions and tie-breaks follow it.
    pub const ALL: [ApproachAngle; 8] = [
        ApproachAngle::MaterialTexture,
        ApproachAngle::SizeCapacity,
        ApproachAngle::FunctionPerformance,
        ApproachAngle::DesignColor,
        ApproachAngle::PriceValue,
        ApproachAngle::ConvenienceMaintenance,
        ApproachAngle::Safety,
        ApproachAngle::UsageExperience,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ApproachAngle::MaterialTexture => "소재/촉감",
            ApproachAngle::SizeCapacity => "크기/용량",
            ApproachAngle::FunctionPerformance => "기능/성능",
            ApproachAngle::DesignColor => "디자인/색상",
            ApproachAngle::PriceValue => "가성비/가격",
            ApproachAngle::ConvenienceMaintenance => "편의성/관리",
            ApproachAngle::Safety => "안전성",
            ApproachAngle::UsageExperience => "사용감/경험",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ApproachAngle::MaterialTexture => &[
                "소재", "촉감", "재질", "원단", "질감", "부드러운", "거친", "매끄러운",
            ],
            ApproachAngle::SizeCapacity => &[
                "크기", "용량", "치수", "사이즈", "넓은", "큰", "작은", "ml", "cm",
            ],
            ApproachAngle::FunctionPerformance => {
                &["기능", "성능", "속도", "효율", "파워", "작동", "자동"]
            }
            ApproachAngle::DesignColor => &[
                "디자인", "색상", "색깔", "예쁜", "멋진", "스타일", "모던", "깔끔",
            ],
            ApproachAngle::PriceValue => &["가격", "가성비", "저렴", "합리적", "경제적", "만원", "원"],
            ApproachAngle::ConvenienceMaintenance => {
                &["편리", "관리", "세탁", "청소", "간편", "쉬운", "보관"]
            }
            ApproachAngle::Safety => &["안전", "인증", "보증", "무해", "친환경", "검증"],
            ApproachAngle::UsageExperience => &["사용", "경험", "느낌", "만족", "실제", "후기"],
        }
    }

    pub fn from_label(label: &str) -> Option<ApproachAngle> {
        ApproachAngle::ALL
            .into_iter()
            .find(|angle| angle.label() == label)
    }
}

impl fmt::Display for ApproachAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<ApproachAngle> for &'static str {
    fn from(angle: ApproachAngle) -> Self {
        angle.label()
    }
}

impl TryFrom<String> for ApproachAngle {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ApproachAngle::from_label(&value).ok_or_else(|| format!("Unknown approach angle: {}", value))
    }
}

/// Differentiation advice for the next post in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AngleSuggestion {
    pub category: Category,
    /// Distinct angles of the recent entries, in order of first appearance
    pub recent_angles: Vec<String>,
    /// Up to three angles, unused ones first
    pub suggested: Vec<ApproachAngle>,
    pub tip: String,
    pub recent_count: usize,
}

impl AngleSuggestion {
    /// The angle the next post should be written around.
    pub fn primary(&self) -> ApproachAngle {
        self.suggested
            .first()
            .copied()
            .unwrap_or(ApproachAngle::ALL[0])
    }
}

/// Proposes approach angles that recent posts in a category have not used.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngleSelector;

impl AngleSelector {
    pub fn suggest(&self, category: Category, recent_entries: &[HistoryEntry]) -> AngleSuggestion {
        let mut recent_angles: Vec<String> = Vec::new();
        for entry in recent_entries {
            let angle = entry.approach_angle.trim();
            if !angle.is_empty() && !recent_angles.iter().any(|seen| seen == angle) {
                recent_angles.push(angle.to_string());
            }
        }

        let unused: Vec<ApproachAngle> = ApproachAngle::ALL
            .into_iter()
            .filter(|angle| !recent_angles.iter().any(|seen| seen == angle.label()))
            .collect();

        // Once every angle has been used the suggestion degrades to the first
        // three canonical angles.
        let suggested: Vec<ApproachAngle> = if unused.is_empty() {
            ApproachAngle::ALL[..SUGGESTED_ANGLES].to_vec()
        } else {
            unused.into_iter().take(SUGGESTED_ANGLES).collect()
        };

        let lead = suggested[0];
        let tip = if recent_entries.is_empty() {
            format!(
                "{} 카테고리 첫 리뷰입니다. {}을 중심으로 작성하세요.",
                category, lead
            )
        } else {
            let recent_summary = recent_angles
                .iter()
                .take(2)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "최근 {}개의 {} 리뷰에서 {} 위주로 작성되었습니다. 이번에는 {}을 중심으로 작성하면 차별화됩니다.",
                recent_entries.len(),
                category,
                recent_summary,
                lead
            )
        };

        AngleSuggestion {
            category,
            recent_angles,
            suggested,
            tip,
            recent_count: recent_entries.len(),
        }
    }
}

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?:TEXT|LINK|QUOTE:[A-Z]+|IMAGE:[^\]]*)\]").expect("valid regex")
});

/// Scores each angle by keyword occurrences in the text outside markup tags
/// and returns the top three with a non-zero score, best first.
pub fn detect_approach_angles(content: &str) -> Vec<ApproachAngle> {
    if content.is_empty() {
        return Vec::new();
    }

    let lowered = MARKUP_TAG.replace_all(content, " ").to_lowercase();
    let mut scored: Vec<(ApproachAngle, usize)> = ApproachAngle::ALL
        .into_iter()
        .map(|angle| {
            let score = angle
                .keywords()
                .iter()
                .map(|keyword| lowered.matches(keyword).count())
                .sum();
            (angle, score)
        })
        .collect();

    // stable: equal scores keep canonical order
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .take(SUGGESTED_ANGLES)
        .filter(|(_, score)| *score > 0)
        .map(|(angle, _)| angle)
        .collect()
}

static ADVANTAGE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[QUOTE:UNDERLINE\]\s*([^\[]+)").expect("valid regex"));

/// Pulls the advantage headings out of a generated post.
pub fn extract_key_points(content: &str) -> Vec<String> {
    ADVANTAGE_HEADING
        .captures_iter(content)
        .take(MAX_KEY_POINTS)
        .filter_map(|caps| caps.get(1))
        .map(|heading| heading.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|heading| heading.chars().count() > 2)
        .map(|heading| truncate_chars(&heading, MAX_KEY_POINT_CHARS))
        .collect()
}

//! Builds the instruction text sent to the generation provider.

mod layout;
mod style;

pub use layout::{LayoutPlan, MAX_TEMPLATE_IMAGES};
pub use style::WritingStyle;

use crate::history::{AngleSuggestion, ApproachAngle};
use crate::model::ProductFacts;

/// The review prompt template.
///
/// Loaded from `review_prompt.txt` at compile time. Contains `{{TITLE}}`,
/// `{{PRICE}}`, `{{DESCRIPTION}}`, `{{IMAGE_GUIDE}}`, `{{DIFFERENTIATION}}`,
/// `{{WRITING_STYLE}}`, `{{FOCUS_ANGLE}}`, `{{BANNED_PHRASES}}`,
/// `{{STRUCTURE}}` and `{{HIGHLIGHT_QUOTAS}}` placeholders.
pub const REVIEW_PROMPT: &str = include_str!("review_prompt.txt");

#[derive(Debug, Clone)]
pub struct PromptComposer {
    template: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        PromptComposer {
            template: REVIEW_PROMPT.to_string(),
        }
    }
}

impl PromptComposer {
    pub fn new() -> Self {
        PromptComposer::default()
    }

    /// Uses a custom template with the same placeholders as [`REVIEW_PROMPT`].
    pub fn with_template(template: impl Into<String>) -> Self {
        PromptComposer {
            template: template.into(),
        }
    }

    /// Fills the template for one post. Product facts are injected last.
    pub fn compose(
        &self,
        facts: &ProductFacts,
        differentiation: &AngleSuggestion,
        focus: ApproachAngle,
        style: WritingStyle,
        banned_phrases: &[String],
    ) -> String {
        let plan = LayoutPlan::for_image_count(facts.image_count);

        self.template
            .replace("{{STRUCTURE}}", &plan.render(&facts.title))
            .replace("{{HIGHLIGHT_QUOTAS}}", &plan.highlight_quotas())
            .replace("{{IMAGE_GUIDE}}", &image_guide(facts.image_count))
            .replace("{{DIFFERENTIATION}}", &differentiation_guide(differentiation))
            .replace("{{WRITING_STYLE}}", style.instruction())
            .replace("{{FOCUS_ANGLE}}", focus.label())
            .replace("{{BANNED_PHRASES}}", &banned_phrases.join(" / "))
            .replace("{{TITLE}}", &facts.title)
            .replace("{{PRICE}}", &facts.price)
            .replace("{{DESCRIPTION}}", &facts.description)
    }
}

fn image_guide(image_count: usize) -> String {
    if image_count == 0 {
        return "첨부된 이미지가 없습니다. 제품 설명에 있는 사실만으로 작성하세요.".to_string();
    }
    format!(
        "첨부된 상품 이미지 {}장을 살펴보고 외관, 색상, 소재, 크기, 구성품처럼 이미지에서 확인되는 내용을 후기에 반영하세요.",
        image_count.min(MAX_TEMPLATE_IMAGES)
    )
}

fn differentiation_guide(suggestion: &AngleSuggestion) -> String {
    let recent = if suggestion.recent_angles.is_empty() {
        "없음".to_string()
    } else {
        suggestion.recent_angles.join(", ")
    };
    let suggested = suggestion
        .suggested
        .iter()
        .take(2)
        .map(|angle| angle.label())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}\n최근 사용된 관점: {}\n이번에 추천하는 관점: {}\n같은 카테고리라도 매번 다른 관점으로 써야 합니다.",
        suggestion.tip, recent, suggested
    )
}

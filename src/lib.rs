pub mod builder;
pub mod config;
pub mod error;
pub mod highlight;
pub mod history;
pub mod markup;
pub mod model;
pub mod prompt;
pub mod providers;
pub mod render;
pub mod tags;

// Re-export commonly used types
pub use builder::{ComposedReview, ReviewComposer, ReviewComposerBuilder};
pub use config::AppConfig;
pub use error::{HistoryError, ReviewError};
pub use highlight::HighlightAssigner;
pub use history::{AngleSuggestion, ApproachAngle, Category, HistoryEntry, HistoryStore};
pub use markup::MarkupParser;
pub use model::{
    ContentElement, HighlightRequest, HighlightSpan, HighlightStyle, ProductFacts, QuoteStyle,
    Section,
};
pub use prompt::{PromptComposer, WritingStyle};
pub use providers::{ImageData, LlmProvider};
pub use render::RenderBlock;

use log::debug;
use rand::Rng;

/// Composes a review with the configuration from `config.toml` and the
/// environment.
///
/// # Example
/// ```no_run
/// use review_forge::{generate_review, ProductFacts};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let facts = ProductFacts::new("스마트 멀티탭 4구", "19,900원", "개별 스위치", 0);
///     let review = generate_review(facts, "https://link.example/p/1").await?;
///     println!("{}", review.title);
///     Ok(())
/// }
/// ```
pub async fn generate_review(
    facts: ProductFacts,
    link_url: &str,
) -> Result<ComposedReview, ReviewError> {
    ReviewComposer::builder()
        .product(facts)
        .link(link_url)
        .build()
        .await
}

/// Builds the prompt a generation would send, consulting `history` for the
/// angle.
pub fn compose_prompt<R: Rng + ?Sized>(
    facts: &ProductFacts,
    history: &HistoryStore,
    config: &AppConfig,
    rng: &mut R,
) -> String {
    let suggestion = history.suggest(&facts.title, config.history.recent_limit);
    let style = WritingStyle::random(rng);
    debug!("Prompt for {} uses style {:?}", suggestion.category, style);
    PromptComposer::new().compose(
        facts,
        &suggestion,
        suggestion.primary(),
        style,
        &config.content.banned_phrases,
    )
}

/// Parses an already generated response and lays it out, without touching
/// the history or any provider.
pub fn layout_response<R: Rng + ?Sized>(
    raw: &str,
    image_refs: &[String],
    link_url: &str,
    rng: &mut R,
) -> Vec<RenderBlock> {
    let response = markup::split_response(raw);
    let elements = MarkupParser::new().parse(&response.body, image_refs, link_url);
    render::layout_elements(
        elements,
        &response.highlights,
        link_url,
        &HighlightAssigner::new(),
        rng,
    )
}

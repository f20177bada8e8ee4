use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::error::ReviewError;
use crate::highlight::HighlightAssigner;
use crate::history::{ApproachAngle, Category, HistoryEntry, HistoryStore};
use crate::markup::{soft_avoid_phrases, split_response, MarkupParser};
use crate::model::{ContentElement, HighlightRequest, ProductFacts, Section};
use crate::prompt::{PromptComposer, WritingStyle};
use crate::providers::{FallbackProvider, ImageData, LlmProvider};
use crate::render::{layout_elements, RenderBlock};
use crate::tags::generate_tags;

/// A generated post, laid out for the editor writer
#[derive(Debug, Clone, Serialize)]
pub struct ComposedReview {
    /// Text of the title quote, or the product title when the model gave none
    pub title: String,
    pub category: Category,
    /// Angle the post was written around and recorded under
    pub angle: ApproachAngle,
    pub writing_style: WritingStyle,
    pub elements: Vec<RenderBlock>,
    pub tags: Vec<String>,
    /// Every valid highlight request the model returned
    pub highlight_requests: Vec<HighlightRequest>,
}

/// Entry point for composing a review post
pub struct ReviewComposer;

impl ReviewComposer {
    pub fn builder() -> ReviewComposerBuilder {
        ReviewComposerBuilder::default()
    }
}

/// Builder for configuring and running one review composition
#[derive(Default)]
pub struct ReviewComposerBuilder {
    product: Option<ProductFacts>,
    images: Vec<ImageData>,
    image_paths: Vec<PathBuf>,
    image_refs: Option<Vec<String>>,
    link: String,
    provider: Option<Box<dyn LlmProvider>>,
    config: Option<AppConfig>,
    history: Option<HistoryStore>,
    seed: Option<u64>,
}

impl ReviewComposerBuilder {
    /// Set the scraped product data
    ///
    /// # Example
    /// ```
    /// use review_forge::{ProductFacts, ReviewComposer};
    ///
    /// let builder = ReviewComposer::builder()
    ///     .product(ProductFacts::new("극세사 이불", "39,000원", "부드러운 원단", 3));
    /// ```
    pub fn product(mut self, product: ProductFacts) -> Self {
        self.product = Some(product);
        self
    }

    /// Attach images already in memory
    pub fn images(mut self, images: Vec<ImageData>) -> Self {
        self.images = images;
        self
    }

    /// Attach image files, read when the builder runs
    pub fn image_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.image_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// References the renderer uses for `[IMAGE:n]`, 1-based in this order
    ///
    /// Defaults to `image_1`, `image_2`, ... for in-memory images followed by
    /// the image file paths, the same order the images are sent in.
    pub fn image_refs(mut self, refs: Vec<String>) -> Self {
        self.image_refs = Some(refs);
        self
    }

    /// Shopping link emitted for `[LINK]`
    pub fn link(mut self, url: impl Into<String>) -> Self {
        self.link = url.into();
        self
    }

    /// Use this provider instead of the configured ones
    pub fn provider(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use this configuration instead of loading `config.toml` and the environment
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this history store instead of the configured one
    pub fn history(mut self, history: HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    /// Seed every random choice of the run
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Compose the prompt, generate, parse and lay out the post
    ///
    /// The history is consulted before generation and the new entry is
    /// recorded afterwards; neither step can fail the run.
    ///
    /// # Errors
    /// Returns `ReviewError` if:
    /// - No product was specified
    /// - An image file cannot be read
    /// - The provider fails or returns an empty body (`GenerationFailed`)
    /// - The response holds no parseable markup (`NoContent`)
    ///
    /// # Example
    /// ```no_run
    /// # use review_forge::{ProductFacts, ReviewComposer};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let review = ReviewComposer::builder()
    ///     .product(ProductFacts::new("극세사 이불", "39,000원", "부드러운 원단", 0))
    ///     .link("https://link.example/p/1")
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<ComposedReview, ReviewError> {
        let mut facts = self.product.ok_or_else(|| {
            ReviewError::BuilderError("No product specified. Use .product()".to_string())
        })?;
        if facts.title.trim().is_empty() {
            return Err(ReviewError::BuilderError("Product title is empty".to_string()));
        }

        let config = match self.config {
            Some(config) => config,
            None if self.provider.is_some() => AppConfig::default(),
            None => AppConfig::load()?,
        };

        let in_memory = self.images.len();
        let mut images = self.images;
        for path in &self.image_paths {
            images.push(ImageData::from_path(path).await?);
        }
        images.truncate(config.content.max_images);
        if facts.image_count == 0 {
            facts.image_count = images.len();
        }

        let image_refs = self.image_refs.unwrap_or_else(|| {
            default_image_refs(in_memory, &self.image_paths, images.len(), facts.image_count)
        });

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let history = self
            .history
            .unwrap_or_else(|| HistoryStore::from_config(&config.history));

        let suggestion = {
            let history = history.clone();
            let title = facts.title.clone();
            let limit = config.history.recent_limit;
            tokio::task::spawn_blocking(move || history.suggest(&title, limit))
                .await
                .map_err(|e| ReviewError::BuilderError(format!("History task failed: {}", e)))?
        };
        let angle = suggestion.primary();
        info!("Category: {}, angle: {}", suggestion.category, angle);
        debug!("{}", suggestion.tip);

        let writing_style = WritingStyle::random(&mut rng);
        let prompt = PromptComposer::new().compose(
            &facts,
            &suggestion,
            angle,
            writing_style,
            &config.content.banned_phrases,
        );

        let provider = match self.provider {
            Some(provider) => provider,
            None => Box::new(
                FallbackProvider::new(&config)
                    .map_err(|e| ReviewError::BuilderError(e.to_string()))?,
            ),
        };

        info!(
            "Generating with {} ({} images)",
            provider.provider_name(),
            images.len()
        );
        let raw = provider
            .generate(&prompt, &images)
            .await
            .map_err(|e| ReviewError::GenerationFailed(e.to_string()))?;
        if raw.trim().is_empty() {
            return Err(ReviewError::GenerationFailed(
                "provider returned an empty response".to_string(),
            ));
        }

        let response = split_response(&raw);
        let body = soft_avoid_phrases(
            &response.body,
            &mut rng,
            config.content.soft_avoid_keep_probability,
        );

        let elements = MarkupParser::new().parse(&body, &image_refs, &self.link);
        if elements.is_empty() {
            return Err(ReviewError::NoContent);
        }

        let title = elements
            .iter()
            .find_map(|element| match element {
                ContentElement::Quote {
                    text,
                    section: Section::Title,
                    ..
                } => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_else(|| facts.title.clone());

        let blocks = layout_elements(
            elements,
            &response.highlights,
            &self.link,
            &HighlightAssigner::new(),
            &mut rng,
        );

        let entry = HistoryEntry::from_content(&facts.title, &body, Some(angle.label()));
        if let Err(e) = tokio::task::spawn_blocking(move || history.append(entry)).await {
            warn!("History task failed: {}", e);
        }

        Ok(ComposedReview {
            title,
            category: suggestion.category,
            angle,
            writing_style,
            elements: blocks,
            tags: generate_tags(&facts.title, &facts.description),
            highlight_requests: response.highlights,
        })
    }
}

/// `[IMAGE:n]` references in the order images are sent: in-memory images
/// first, then files. Without any image, `image_count` placeholders.
fn default_image_refs(
    in_memory: usize,
    paths: &[PathBuf],
    sent: usize,
    image_count: usize,
) -> Vec<String> {
    let mut refs: Vec<String> = (1..=in_memory).map(|n| format!("image_{}", n)).collect();
    refs.extend(paths.iter().map(|path| path.display().to_string()));
    if refs.is_empty() {
        return (1..=image_count).map(|n| format!("image_{}", n)).collect();
    }
    refs.truncate(sent);
    refs
}

//! Bounded log of published posts, used to steer each new post away from
//! the framing of the previous ones in the same category.

mod angle;
mod category;
mod lock;
mod store;

pub use angle::{
    detect_approach_angles, extract_key_points, AngleSelector, AngleSuggestion, ApproachAngle,
};
pub use category::Category;
pub use store::{HistoryLog, HistoryStore, DEFAULT_MAX_ENTRIES};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::model::truncate_chars;

const MAX_TITLE_CHARS: usize = 100;
/// Angle recorded when neither the caller nor keyword detection supplies one.
pub const FALLBACK_ANGLE: &str = "일반";

/// One completed post. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub product_title: String,
    pub category: Category,
    pub approach_angle: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

impl HistoryEntry {
    /// Builds the entry for a freshly generated post.
    ///
    /// The angle falls back to the strongest keyword-detected angle, then to
    /// [`FALLBACK_ANGLE`].
    pub fn from_content(product_title: &str, content: &str, approach_angle: Option<&str>) -> Self {
        let approach_angle = approach_angle
            .map(str::to_string)
            .or_else(|| {
                detect_approach_angles(content)
                    .first()
                    .map(|angle| angle.label().to_string())
            })
            .unwrap_or_else(|| FALLBACK_ANGLE.to_string());

        HistoryEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            product_title: truncate_chars(product_title, MAX_TITLE_CHARS),
            category: Category::classify(product_title),
            approach_angle,
            key_points: extract_key_points(content),
        }
    }
}

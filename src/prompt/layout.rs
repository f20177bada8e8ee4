use crate::markup::Tag;

/// Images referenced by the structural template; extra images are ignored.
pub const MAX_TEMPLATE_IMAGES: usize = 6;

/// Post structure chosen from the number of product images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutPlan {
    /// Intro, one body block and a conclusion, with at most one image block
    /// (a single image or a two-image collage) before the body.
    FreeForm { images: Vec<usize> },
    /// One advantage section per image group, in order.
    Advantages(Vec<Vec<usize>>),
}

impl LayoutPlan {
    pub fn for_image_count(image_count: usize) -> LayoutPlan {
        match image_count {
            0 => LayoutPlan::FreeForm { images: vec![] },
            1 => LayoutPlan::FreeForm { images: vec![1] },
            2 => LayoutPlan::FreeForm { images: vec![1, 2] },
            3 => LayoutPlan::Advantages(vec![vec![1], vec![2], vec![3]]),
            4 => LayoutPlan::Advantages(vec![vec![1, 2], vec![3, 4]]),
            5 => LayoutPlan::Advantages(vec![vec![1, 2], vec![3, 4], vec![5]]),
            _ => LayoutPlan::Advantages(vec![vec![1, 2], vec![3, 4], vec![5, 6]]),
        }
    }

    /// Number of `[QUOTE:UNDERLINE]` sections the template asks for.
    pub fn advantage_count(&self) -> usize {
        match self {
            LayoutPlan::FreeForm { .. } => 0,
            LayoutPlan::Advantages(groups) => groups.len(),
        }
    }

    /// Advantage section names the highlight block may target.
    ///
    /// Free-form posts have no advantage headings, so their body text is
    /// `intro` and no advantage section exists.
    pub fn highlight_sections(&self) -> Vec<String> {
        match self {
            LayoutPlan::FreeForm { .. } => Vec::new(),
            LayoutPlan::Advantages(groups) => (1..=groups.len())
                .map(|n| format!("advantage_{}", n))
                .collect(),
        }
    }

    /// Per-section highlight counts for the intro and body sections.
    pub fn highlight_quotas(&self) -> String {
        match self {
            LayoutPlan::FreeForm { .. } => {
                "- intro: 2~4개 (소제목이 없는 글이므로 본문 강조도 모두 \"intro\"로 지정)".to_string()
            }
            LayoutPlan::Advantages(_) => format!(
                "- intro: 0~2개\n- 장점 섹션({}): 섹션마다 2~4개",
                self.highlight_sections().join(", ")
            ),
        }
    }

    /// Renders the tagged skeleton the model has to fill in.
    pub fn render(&self, title: &str) -> String {
        let mut blocks: Vec<String> = vec![
            format!("{}\n{} 솔직 후기", Tag::QuoteVertical, title),
            format!(
                "{}\n(상투적인 인사 없이, 이 제품을 고르게 된 상황과 첫인상을 3~4문장으로. 수치나 비교 표현을 하나 이상 포함)",
                Tag::Text
            ),
        ];

        match self {
            LayoutPlan::FreeForm { images } => {
                if !images.is_empty() {
                    blocks.push(Tag::Image(images.clone()).to_string());
                }
                blocks.push(format!(
                    "{}\n(직접 써 보며 느낀 장점을 중심 관점에 맞춰 자유롭게 400~600자)",
                    Tag::Text
                ));
            }
            LayoutPlan::Advantages(groups) => {
                for (i, group) in groups.iter().enumerate() {
                    let n = i + 1;
                    blocks.push(format!(
                        "{}\n(장점 {} 소제목: 제품 설명에 근거한 구체적인 장점 한 줄)",
                        Tag::QuoteUnderline,
                        n
                    ));
                    blocks.push(Tag::Image(group.clone()).to_string());
                    blocks.push(format!(
                        "{}\n(장점 {}에 대한 실제 사용 경험 250~350자)",
                        Tag::Text,
                        n
                    ));
                }
            }
        }

        blocks.push(format!(
            "{}\n(\"아쉬운 점\"이라는 말로 시작해, 실제로 불편했던 점 1~2가지를 상황과 빈도까지 구체적으로)",
            Tag::Text
        ));
        blocks.push(format!(
            "{}\n(총평 3~4문장: 누구에게 맞는지, 구매 전 확인할 점 하나, 가격이나 보증 같은 실용 정보 한 문장)",
            Tag::Text
        ));
        blocks.push(Tag::Link.to_string());

        blocks.join("\n\n")
    }
}

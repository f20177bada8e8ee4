use serde::{Deserialize, Serialize};
use std::fmt;

/// Product category used to group history entries.
///
/// Persisted by its Korean label so history files stay readable by the
/// existing tooling that writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Category {
    Bedding,
    PowerStrips,
    WaterPurifiers,
    Appliances,
    Kitchenware,
    Furniture,
    Cosmetics,
    Food,
    Apparel,
    Footwear,
    Electronics,
    HouseholdGoods,
    Other,
}

/// Category keyword table, matched in this order.
static CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Bedding,
        &["이불", "침구", "베개", "담요", "쿠션", "매트리스", "패드"],
    ),
    (
        Category::PowerStrips,
        &["멀티탭", "콘센트", "전선", "파워", "어댑터"],
    ),
    (
        Category::WaterPurifiers,
        &["정수기", "필터", "정수", "생수", "물"],
    ),
    (
        Category::Appliances,
        &["세탁기", "냉장고", "에어컨", "청소기", "건조기", "공기청정기"],
    ),
    (
        Category::Kitchenware,
        &["냄비", "프라이팬", "그릇", "칼", "도마", "주방"],
    ),
    (
        Category::Furniture,
        &["책상", "의자", "침대", "소파", "수납장", "선반"],
    ),
    (
        Category::Cosmetics,
        &["스킨", "로션", "크림", "에센스", "마스크팩", "화장품"],
    ),
    (
        Category::Food,
        &["과자", "음료", "건강식품", "영양제", "커피", "차"],
    ),
    (
        Category::Apparel,
        &["옷", "바지", "셔츠", "티셔츠", "자켓", "코트"],
    ),
    (
        Category::Footwear,
        &["신발", "운동화", "슬리퍼", "샌들", "구두"],
    ),
    (
        Category::Electronics,
        &["스마트폰", "노트북", "태블릿", "이어폰", "마우스", "키보드"],
    ),
    (
        Category::HouseholdGoods,
        &["휴지", "세제", "샴푸", "비누", "치약", "칫솔"],
    ),
];

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Bedding => "이불",
            Category::PowerStrips => "멀티탭",
            Category::WaterPurifiers => "정수기",
            Category::Appliances => "가전제품",
            Category::Kitchenware => "주방용품",
            Category::Furniture => "가구",
            Category::Cosmetics => "화장품",
            Category::Food => "식품",
            Category::Apparel => "의류",
            Category::Footwear => "신발",
            Category::Electronics => "전자기기",
            Category::HouseholdGoods => "생활용품",
            Category::Other => "기타",
        }
    }

    /// Maps a product title to its category.
    ///
    /// Returns the first category (in table order) with a keyword contained in
    /// the title, or [`Category::Other`].
    pub fn classify(title: &str) -> Category {
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| title.contains(keyword)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        CATEGORY_KEYWORDS
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, keywords)| *keywords)
            .unwrap_or(&[])
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        CATEGORY_KEYWORDS
            .iter()
            .map(|(category, _)| *category)
            .find(|category| category.label() == label)
            .unwrap_or(Category::Other)
    }
}

impl From<Category> for &'static str {
    fn from(category: Category) -> Self {
        category.label()
    }
}

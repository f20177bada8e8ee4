use mockito::{Matcher, Server, ServerGuard};
use rand::rngs::StdRng;
use rand::SeedableRng;
use review_forge::providers::OpenAIProvider;
use review_forge::{
    layout_response, AppConfig, ApproachAngle, Category, ContentElement, HistoryStore, ImageData,
    ProductFacts, ReviewComposer, ReviewError, Section,
};
use serde_json::json;
use std::collections::HashMap;
use tempfile::TempDir;

const GENERATED: &str = "[QUOTE:VERTICAL]
극세사 차렵이불 한 달 사용기
[TEXT]
겨울 준비로 이불을 바꾸려고 이것저것 보다가 골랐습니다. 무게는 2.1kg이라 덮었을 때 눌리는 느낌이 적었어요.
[QUOTE:UNDERLINE]
촉감이 확실히 다릅니다
[IMAGE:1]
[TEXT]
**극세사 원단**이라 손에 닿는 느낌이 매끄럽고 정전기도 덜했습니다. 밤에 뒤척여도 바스락거리는 소리가 없었어요.
[QUOTE:UNDERLINE]
퀸 사이즈라 둘이 써도 넉넉해요
[IMAGE:2]
[TEXT]
퀸 사이즈 기준 200x230cm라 둘이 덮어도 이불 뺏기가 없었습니다. 침대 옆으로 자연스럽게 내려옵니다.
[QUOTE:UNDERLINE]
세탁이 생각보다 편합니다
[IMAGE:3]
[TEXT]
세탁기 울코스로 돌려도 형태가 그대로였어요. 건조는 반나절이면 충분했습니다.
[TEXT]
아쉬운 점은 처음 꺼냈을 때 먼지가 조금 날렸다는 것입니다. 한 번 세탁한 뒤로는 괜찮았어요.
[TEXT]
가볍고 따뜻한 이불을 찾는 분께 맞습니다. 구매 전 침대 크기는 꼭 확인해 보세요.
[LINK]
";

const HIGHLIGHTS: &str = r#"```json
{"highlights": [
  {"text": "2.1kg", "style": "font_size", "section": "intro"},
  {"text": "극세사 원단", "style": "bold_bg", "section": "advantage_1"},
  {"text": "정전기도 덜했습니다", "style": "bold", "section": "advantage_1"},
  {"text": "200x230cm", "style": "font_size", "section": "advantage_2"},
  {"text": "울코스", "style": "bg_color", "section": "advantage_3"},
  {"text": "먼지가 조금", "style": "bold", "section": "disadvantage"},
  {"text": "침대 크기", "style": "bold_font", "section": "conclusion"}
]}
```"#;

const LINK: &str = "https://link.example/p/123";

fn chat_body(content: &str) -> String {
    json!({"choices": [{"message": {"content": content}}]}).to_string()
}

async fn mock_chat(server: &mut ServerGuard, content: &str) -> mockito::Mock {
    server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({"model": "gpt-4.1-mini"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_body(content))
        .create_async()
        .await
}

fn provider(server: &ServerGuard) -> Box<OpenAIProvider> {
    Box::new(OpenAIProvider::with_base_url(
        "fake_api_key".to_string(),
        server.url(),
        "gpt-4.1-mini".to_string(),
    ))
}

fn facts() -> ProductFacts {
    ProductFacts::new(
        "극세사 차렵이불 퀸",
        "39,000원",
        "포근한 극세사 원단, 사계절 사용",
        3,
    )
}

fn refs() -> Vec<String> {
    ["a.jpg", "b.jpg", "c.jpg"].iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_generate_end_to_end() {
    let mut server = Server::new_async().await;
    let mock = mock_chat(&mut server, &format!("{}\n{}", GENERATED, HIGHLIGHTS)).await;
    let dir = TempDir::new().unwrap();
    let history_path = dir.path().join("history.json");

    let review = ReviewComposer::builder()
        .product(facts())
        .image_refs(refs())
        .link(LINK)
        .provider(provider(&server))
        .config(AppConfig::default())
        .history(HistoryStore::new(&history_path))
        .seed(42)
        .build()
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(review.title, "극세사 차렵이불 한 달 사용기");
    assert_eq!(review.category, Category::Bedding);
    assert_eq!(review.angle, ApproachAngle::MaterialTexture);
    assert_eq!(review.highlight_requests.len(), 7);
    assert_eq!(review.tags, vec!["극세사", "차렵이불", "퀸", "포근한", "원단"]);

    let sections: Vec<Section> = review.elements.iter().map(|b| b.element.section()).collect();
    for section in [
        Section::Title,
        Section::Intro,
        Section::Advantage(1),
        Section::Advantage(2),
        Section::Advantage(3),
        Section::Disadvantage,
        Section::Conclusion,
    ] {
        assert!(sections.contains(&section), "missing {}", section);
    }

    let mut per_section: HashMap<Section, usize> = HashMap::new();
    for block in &review.elements {
        if block.element.section().is_disadvantage() {
            assert!(block.spans.is_empty());
        }
        *per_section.entry(block.element.section()).or_default() += block.spans.len();

        if let Some(text) = &block.formatted_text {
            assert!(!text.contains("**"));
            for pair in block.spans.windows(2) {
                assert!(pair[0].span.end <= pair[1].span.start);
            }
            for span in &block.spans {
                assert_eq!(&text[span.span.start..span.span.end], span.span.text);
            }
        }
        if matches!(block.element, ContentElement::Quote { .. }) {
            assert!(block.quote_decoration.is_some());
        }
    }
    assert!(per_section.values().all(|count| *count <= 3));
    // every highlighted section except the disadvantage has one matching request at least
    for section in [Section::Intro, Section::Advantage(1), Section::Advantage(2), Section::Advantage(3), Section::Conclusion] {
        assert!(per_section.get(&section).copied().unwrap_or(0) >= 1, "{} unstyled", section);
    }

    let images: Vec<&ContentElement> = review
        .elements
        .iter()
        .map(|b| &b.element)
        .filter(|e| matches!(e, ContentElement::Image { .. }))
        .collect();
    assert_eq!(images.len(), 3);

    let last = review.elements.last().unwrap();
    assert_eq!(last.formatted_text.as_deref(), Some(LINK));
    assert!(last.spans.is_empty());

    let log = HistoryStore::new(&history_path).load();
    assert_eq!(log.entries.len(), 1);
    assert_eq!(log.entries[0].product_title, "극세사 차렵이불 퀸");
    assert_eq!(log.entries[0].category, Category::Bedding);
    assert_eq!(log.entries[0].approach_angle, "소재/촉감");
}

#[tokio::test]
async fn test_second_run_takes_a_new_angle() {
    let mut server = Server::new_async().await;
    let _mock = mock_chat(&mut server, GENERATED).await;
    let dir = TempDir::new().unwrap();
    let history = HistoryStore::new(dir.path().join("history.json"));

    let mut angles = Vec::new();
    for seed in 0..2 {
        let review = ReviewComposer::builder()
            .product(facts())
            .image_refs(refs())
            .link(LINK)
            .provider(provider(&server))
            .config(AppConfig::default())
            .history(history.clone())
            .seed(seed)
            .build()
            .await
            .unwrap();
        angles.push(review.angle);
    }

    assert_eq!(angles, vec![ApproachAngle::MaterialTexture, ApproachAngle::SizeCapacity]);
    assert_eq!(history.load().entries.len(), 2);
}

#[tokio::test]
async fn test_empty_response_is_generation_failure() {
    let mut server = Server::new_async().await;
    let _mock = mock_chat(&mut server, "   ").await;
    let dir = TempDir::new().unwrap();
    let history_path = dir.path().join("history.json");

    let result = ReviewComposer::builder()
        .product(facts())
        .provider(provider(&server))
        .config(AppConfig::default())
        .history(HistoryStore::new(&history_path))
        .seed(1)
        .build()
        .await;

    assert!(matches!(result, Err(ReviewError::GenerationFailed(_))));
    assert!(!history_path.exists());
}

#[tokio::test]
async fn test_provider_error_is_generation_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();

    let result = ReviewComposer::builder()
        .product(facts())
        .provider(provider(&server))
        .config(AppConfig::default())
        .history(HistoryStore::new(dir.path().join("history.json")))
        .build()
        .await;

    assert!(matches!(result, Err(ReviewError::GenerationFailed(_))));
}

#[tokio::test]
async fn test_untagged_response_has_no_content() {
    let mut server = Server::new_async().await;
    let _mock = mock_chat(&mut server, "죄송하지만 요청하신 후기를 작성할 수 없습니다.").await;
    let dir = TempDir::new().unwrap();
    let history_path = dir.path().join("history.json");

    let result = ReviewComposer::builder()
        .product(facts())
        .provider(provider(&server))
        .config(AppConfig::default())
        .history(HistoryStore::new(&history_path))
        .seed(1)
        .build()
        .await;

    assert!(matches!(result, Err(ReviewError::NoContent)));
    assert!(!history_path.exists());
}

#[test]
fn test_layout_response_without_provider() {
    let raw = format!("{}\n{}", GENERATED, HIGHLIGHTS);
    let mut rng = StdRng::seed_from_u64(9);
    let blocks = layout_response(&raw, &refs(), LINK, &mut rng);

    assert_eq!(blocks.len(), 14);
    assert!(blocks
        .iter()
        .filter_map(|b| b.formatted_text.as_deref())
        .all(|text| !text.contains("highlights")));
    match &blocks[3].element {
        ContentElement::Image { refs, single, section } => {
            assert_eq!(refs, &vec!["a.jpg".to_string()]);
            assert!(*single);
            assert_eq!(*section, Section::Advantage(1));
        }
        other => panic!("expected image, got {:?}", other),
    }
}

const FREE_FORM: &str = "[QUOTE:VERTICAL]
포근한 이불 후기
[TEXT]
날이 추워져서 새 이불을 들였습니다.
[IMAGE:1]
[TEXT]
포근한 촉감이 오래가고 무게도 가볍습니다.
[TEXT]
아쉬운 점은 보풀이 조금 생긴다는 것입니다.
[TEXT]
겨울 이불로 무난합니다.
[LINK]
```json
{\"highlights\": [{\"text\": \"포근한 촉감\", \"style\": \"bg_color\", \"section\": \"intro\"}]}
```";

#[test]
fn test_free_form_body_receives_intro_highlights() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let blocks = layout_response(FREE_FORM, &refs(), LINK, &mut rng);

        let body = &blocks[3];
        assert_eq!(body.element.section(), Section::Intro);
        assert_eq!(body.spans.len(), 1, "seed {}", seed);
        assert_eq!(body.spans[0].span.text, "포근한 촉감");
    }
}

#[tokio::test]
async fn test_default_image_refs_match_sending_order() {
    let mut server = Server::new_async().await;
    let _mock = mock_chat(&mut server, "[IMAGE:1]\n[IMAGE:2]\n[TEXT]\n본문입니다.").await;
    let dir = TempDir::new().unwrap();
    let photo = dir.path().join("photo.png");
    std::fs::write(&photo, [1u8, 2, 3]).unwrap();

    let review = ReviewComposer::builder()
        .product(ProductFacts::new("극세사 차렵이불", "39,000원", "", 0))
        .images(vec![ImageData::new("image/jpeg", vec![0])])
        .image_paths([&photo])
        .provider(provider(&server))
        .config(AppConfig::default())
        .history(HistoryStore::new(dir.path().join("history.json")))
        .seed(5)
        .build()
        .await
        .unwrap();

    let image_refs: Vec<Vec<String>> = review
        .elements
        .iter()
        .filter_map(|block| match &block.element {
            ContentElement::Image { refs, .. } => Some(refs.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        image_refs,
        vec![
            vec!["image_1".to_string()],
            vec![photo.display().to_string()]
        ]
    );
}

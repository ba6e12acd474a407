use serde::{Deserialize, Serialize};

/// A layout block of a client case page. `order` drives display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub order: i32,
    #[serde(flatten)]
    pub kind: BlockKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BlockKind {
    TextOnly(TextBlock),
    TextImageLeft(TextImageBlock),
    TextImageRight(TextImageBlock),
    Stats(StatsBlock),
    Cards(CardsBlock),
    Video(VideoBlock),
    Testimonial(TestimonialBlock),
    ContactForm(ContactFormBlock),
    Cta(CtaBlock),
    /// Any block type this renderer does not know about. The raw object,
    /// `type` included, is kept so it survives a save untouched.
    #[serde(untagged)]
    Unknown(serde_json::Map<String, serde_json::Value>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Image {
    pub url: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextBlock {
    pub title: Option<String>,
    /// Trusted HTML authored in the CMS.
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextImageBlock {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsBlock {
    pub title: Option<String>,
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Card {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardsBlock {
    pub title: Option<String>,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoBlock {
    pub title: Option<String>,
    pub video_url: Option<String>,
    pub poster: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestimonialBlock {
    pub quote: Option<String>,
    pub author: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFormBlock {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CtaBlock {
    pub title: Option<String>,
    pub description: Option<String>,
    pub button_text: Option<String>,
    pub button_link: Option<String>,
}

/// Stable ascending sort by `order`; blocks with equal order keep their
/// relative position.
pub fn sort_blocks(blocks: &mut [ContentBlock]) {
    blocks.sort_by_key(|block| block.order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tagged_blocks() {
        let blocks: Vec<ContentBlock> = serde_json::from_value(json!([
            { "type": "text-only", "order": 2, "title": "Contexte", "content": "<p>Hi</p>" },
            { "type": "stats", "order": 1, "stats": [{ "value": "40%", "label": "gain" }] },
            { "type": "text-image-right", "order": 3, "image": { "url": "/a.png" } },
            { "type": "cta", "buttonText": "Parlons-en", "buttonLink": "/contact" }
        ]))
        .unwrap();

        assert_eq!(blocks.len(), 4);
        assert!(matches!(blocks[0].kind, BlockKind::TextOnly(ref b) if b.title.as_deref() == Some("Contexte")));
        assert!(matches!(blocks[1].kind, BlockKind::Stats(ref b) if b.stats.len() == 1));
        assert!(matches!(blocks[2].kind, BlockKind::TextImageRight(ref b) if b.image.is_some()));
        assert_eq!(blocks[3].order, 0);
        assert!(matches!(blocks[3].kind, BlockKind::Cta(ref b) if b.button_link.as_deref() == Some("/contact")));
    }

    #[test]
    fn unknown_block_survives_a_save_unchanged() {
        let raw = json!({
            "type": "carousel",
            "order": 4,
            "slides": [{ "url": "/a.png" }, { "url": "/b.png" }],
            "autoplay": true
        });
        let block: ContentBlock = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(block.order, 4);
        assert!(matches!(block.kind, BlockKind::Unknown(ref fields) if fields["type"] == "carousel"));

        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn known_blocks_do_not_fall_back_to_unknown() {
        let block: ContentBlock =
            serde_json::from_value(json!({ "type": "video", "videoUrl": "/v.mp4" })).unwrap();
        assert!(matches!(block.kind, BlockKind::Video(ref v) if v.video_url.as_deref() == Some("/v.mp4")));
    }

    #[test]
    fn sort_is_stable() {
        let mut blocks: Vec<ContentBlock> = serde_json::from_value(json!([
            { "type": "text-only", "order": 2, "title": "b" },
            { "type": "text-only", "order": 1, "title": "a1" },
            { "type": "text-only", "order": 2, "title": "c" },
            { "type": "text-only", "order": 1, "title": "a2" }
        ]))
        .unwrap();
        sort_blocks(&mut blocks);

        let titles: Vec<_> = blocks
            .iter()
            .map(|b| match &b.kind {
                BlockKind::TextOnly(t) => t.title.clone().unwrap_or_default(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(titles, vec!["a1", "a2", "b", "c"]);
    }
}

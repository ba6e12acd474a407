//! HTML rendering of client case blocks.
//!
//! Each block variant maps to one fixed template. Plain text is escaped;
//! `content` fields hold CMS-authored HTML and are emitted as is. Missing
//! optional fields simply drop their element, and unknown blocks produce
//! nothing.

use std::fmt::Write;

use super::blocks::{
    sort_blocks, BlockKind, CardsBlock, ContactFormBlock, ContentBlock, CtaBlock, StatsBlock,
    TestimonialBlock, TextBlock, TextImageBlock, VideoBlock,
};

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn heading(out: &mut String, tag: &str, title: Option<&str>) {
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        let _ = write!(out, "<{tag}>{}</{tag}>", escape_html(title));
    }
}

fn paragraph(out: &mut String, class: &str, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        let _ = write!(out, "<p class=\"{class}\">{}</p>", escape_html(text));
    }
}

fn body(out: &mut String, content: Option<&str>) {
    if let Some(content) = content {
        let _ = write!(out, "<div class=\"block-body\">{content}</div>");
    }
}

fn text_only(out: &mut String, block: &TextBlock) {
    out.push_str("<section class=\"block block-text\">");
    heading(out, "h2", block.title.as_deref());
    body(out, block.content.as_deref());
    out.push_str("</section>");
}

fn text_image(out: &mut String, block: &TextImageBlock, side: &str) {
    let _ = write!(out, "<section class=\"block block-text-image image-{side}\">");
    let figure = block.image.as_ref().filter(|i| !i.url.is_empty()).map(|image| {
        format!(
            "<figure><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></figure>",
            escape_html(&image.url),
            escape_html(image.alt.as_deref().unwrap_or_default())
        )
    });
    if side == "left" {
        if let Some(figure) = &figure {
            out.push_str(figure);
        }
    }
    out.push_str("<div class=\"block-text-column\">");
    heading(out, "h2", block.title.as_deref());
    body(out, block.content.as_deref());
    out.push_str("</div>");
    if side == "right" {
        if let Some(figure) = &figure {
            out.push_str(figure);
        }
    }
    out.push_str("</section>");
}

fn stats(out: &mut String, block: &StatsBlock) {
    out.push_str("<section class=\"block block-stats\">");
    heading(out, "h2", block.title.as_deref());
    if !block.stats.is_empty() {
        out.push_str("<ul class=\"stats\">");
        for stat in &block.stats {
            let _ = write!(
                out,
                "<li><strong>{}</strong><span>{}</span></li>",
                escape_html(&stat.value),
                escape_html(&stat.label)
            );
        }
        out.push_str("</ul>");
    }
    out.push_str("</section>");
}

fn cards(out: &mut String, block: &CardsBlock) {
    out.push_str("<section class=\"block block-cards\">");
    heading(out, "h2", block.title.as_deref());
    if !block.cards.is_empty() {
        out.push_str("<div class=\"cards\">");
        for card in &block.cards {
            out.push_str("<article class=\"card\">");
            if let Some(icon) = card.icon.as_deref() {
                let _ = write!(out, "<span class=\"card-icon\">{}</span>", escape_html(icon));
            }
            heading(out, "h3", Some(card.title.as_str()));
            paragraph(out, "card-description", card.description.as_deref());
            out.push_str("</article>");
        }
        out.push_str("</div>");
    }
    out.push_str("</section>");
}

fn video(out: &mut String, block: &VideoBlock) {
    let Some(url) = block.video_url.as_deref().filter(|u| !u.is_empty()) else {
        return;
    };
    out.push_str("<section class=\"block block-video\">");
    heading(out, "h2", block.title.as_deref());
    let _ = write!(out, "<video controls src=\"{}\"", escape_html(url));
    if let Some(poster) = block.poster.as_deref() {
        let _ = write!(out, " poster=\"{}\"", escape_html(poster));
    }
    out.push_str("></video></section>");
}

fn testimonial(out: &mut String, block: &TestimonialBlock) {
    let Some(quote) = block.quote.as_deref().filter(|q| !q.trim().is_empty()) else {
        return;
    };
    out.push_str("<section class=\"block block-testimonial\"><blockquote>");
    let _ = write!(out, "<p>{}</p>", escape_html(quote));
    if block.author.is_some() || block.role.is_some() || block.company.is_some() {
        out.push_str("<footer>");
        if let Some(avatar) = block.avatar.as_deref() {
            let _ = write!(out, "<img class=\"avatar\" src=\"{}\" alt=\"\">", escape_html(avatar));
        }
        if let Some(author) = block.author.as_deref() {
            let _ = write!(out, "<cite>{}</cite>", escape_html(author));
        }
        let role: Vec<&str> = [block.role.as_deref(), block.company.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !role.is_empty() {
            let _ = write!(out, "<span class=\"role\">{}</span>", escape_html(&role.join(", ")));
        }
        out.push_str("</footer>");
    }
    out.push_str("</blockquote></section>");
}

fn contact_form(out: &mut String, block: &ContactFormBlock) {
    out.push_str("<section class=\"block block-contact-form\">");
    heading(out, "h2", block.title.as_deref());
    paragraph(out, "block-description", block.description.as_deref());
    out.push_str("<div data-contact-form></div></section>");
}

fn cta(out: &mut String, block: &CtaBlock) {
    out.push_str("<section class=\"block block-cta\">");
    heading(out, "h2", block.title.as_deref());
    paragraph(out, "block-description", block.description.as_deref());
    if let (Some(text), Some(link)) = (block.button_text.as_deref(), block.button_link.as_deref()) {
        let _ = write!(
            out,
            "<a class=\"button\" href=\"{}\">{}</a>",
            escape_html(link),
            escape_html(text)
        );
    }
    out.push_str("</section>");
}

pub fn render_block(out: &mut String, block: &ContentBlock) {
    match &block.kind {
        BlockKind::TextOnly(b) => text_only(out, b),
        BlockKind::TextImageLeft(b) => text_image(out, b, "left"),
        BlockKind::TextImageRight(b) => text_image(out, b, "right"),
        BlockKind::Stats(b) => stats(out, b),
        BlockKind::Cards(b) => cards(out, b),
        BlockKind::Video(b) => video(out, b),
        BlockKind::Testimonial(b) => testimonial(out, b),
        BlockKind::ContactForm(b) => contact_form(out, b),
        BlockKind::Cta(b) => cta(out, b),
        BlockKind::Unknown(_) => {}
    }
}

/// Render blocks in ascending `order`.
pub fn render_blocks(blocks: &[ContentBlock]) -> String {
    let mut sorted = blocks.to_vec();
    sort_blocks(&mut sorted);

    let mut out = String::new();
    for block in &sorted {
        render_block(&mut out, block);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blocks(value: serde_json::Value) -> Vec<ContentBlock> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn renders_in_ascending_order() {
        let html = render_blocks(&blocks(json!([
            { "type": "text-only", "order": 3, "title": "Third" },
            { "type": "text-only", "order": 1, "title": "First" },
            { "type": "text-only", "order": 2, "title": "Second" }
        ])));

        let first = html.find("First").unwrap();
        let second = html.find("Second").unwrap();
        let third = html.find("Third").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn unknown_blocks_render_nothing() {
        let html = render_blocks(&blocks(json!([
            { "type": "hero-carousel", "order": 1, "slides": [1, 2] }
        ])));
        assert!(html.is_empty());
    }

    #[test]
    fn escapes_text_but_keeps_body_html() {
        let html = render_blocks(&blocks(json!([
            { "type": "text-only", "title": "<Odoo & co>", "content": "<p><b>ERP</b></p>" }
        ])));
        assert!(html.contains("<h2>&lt;Odoo &amp; co&gt;</h2>"));
        assert!(html.contains("<p><b>ERP</b></p>"));
    }

    #[test]
    fn image_side_follows_variant() {
        let left = render_blocks(&blocks(json!([
            { "type": "text-image-left", "title": "T", "image": { "url": "/l.png", "alt": "logo" } }
        ])));
        assert!(left.find("<figure>").unwrap() < left.find("<h2>").unwrap());
        assert!(left.contains("alt=\"logo\""));

        let right = render_blocks(&blocks(json!([
            { "type": "text-image-right", "title": "T", "image": { "url": "/r.png" } }
        ])));
        assert!(right.find("<figure>").unwrap() > right.find("<h2>").unwrap());
    }

    #[test]
    fn optional_fields_are_guarded() {
        let html = render_blocks(&blocks(json!([
            { "type": "video", "title": "Démo" },
            { "type": "testimonial", "author": "Karim" },
            { "type": "cta", "title": "On en parle ?", "buttonText": "Contact" }
        ])));
        assert!(!html.contains("<video"));
        assert!(!html.contains("blockquote"));
        assert!(html.contains("On en parle ?"));
        assert!(!html.contains("<a "));
    }

    #[test]
    fn renders_stats_cards_and_testimonial() {
        let html = render_blocks(&blocks(json!([
            { "type": "stats", "order": 1, "stats": [{ "value": "-30%", "label": "délais" }] },
            { "type": "cards", "order": 2, "cards": [{ "title": "CRM", "description": "Pipeline" }] },
            { "type": "testimonial", "order": 3, "quote": "Top", "author": "Salma", "role": "DAF", "company": "Atlas" },
            { "type": "contact-form", "order": 4, "title": "Écrivez-nous" }
        ])));
        assert!(html.contains("<strong>-30%</strong><span>délais</span>"));
        assert!(html.contains("<h3>CRM</h3>"));
        assert!(html.contains("<cite>Salma</cite>"));
        assert!(html.contains("DAF, Atlas"));
        assert!(html.contains("data-contact-form"));
    }
}

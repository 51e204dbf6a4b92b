//! Plain-text rendering of the HTML Odoo stores in description fields,
//! following the rules of Odoo's `html2plaintext`: bold and `<h3>` become
//! `*text*`, `<h1>`/`<h2>` become `**text**`, `<em>` becomes `/text/`, links
//! become `text [n]` with the urls listed at the end.

use std::sync::OnceLock;
use html_escape::decode_html_entities;
use regex::{Captures, Regex};

struct Patterns {
    body: Regex,
    link: Regex,
    bold: Regex,
    heading: Regex,
    emphasis: Regex,
    row: Regex,
    paragraph_end: Regex,
    line_break: Regex,
    tag: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        body: Regex::new(r"(?is)<body[^>]*>(.*)</body\s*>").unwrap(),
        link: Regex::new(
            r#"(?is)<a\s[^>]*?\bhref\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s>]+))[^>]*>(?P<inner>.*?)</a\s*>"#,
        )
        .unwrap(),
        bold: Regex::new(r"(?i)</?(?:strong|b|h3)>").unwrap(),
        heading: Regex::new(r"(?i)</?h[12]>").unwrap(),
        emphasis: Regex::new(r"(?i)</?em>").unwrap(),
        row: Regex::new(r"(?i)<tr>").unwrap(),
        paragraph_end: Regex::new(r"(?i)</p>").unwrap(),
        line_break: Regex::new(r"(?i)<br\s*/?>").unwrap(),
        tag: Regex::new(r"(?s)<.*?>").unwrap(),
    })
}

pub fn html_to_plaintext(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let p = patterns();
    let html = p
        .body
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map_or(html, |body| body.as_str());

    let mut urls: Vec<String> = Vec::new();
    let text = p.link.replace_all(html, |caps: &Captures| {
        let url = caps
            .name("dq")
            .or_else(|| caps.name("sq"))
            .or_else(|| caps.name("bare"))
            .map_or("", |url| url.as_str());
        if url.is_empty() {
            return caps[0].to_string();
        }
        urls.push(decode_html_entities(url).into_owned());
        // the reference follows the link's leading text, before any child element
        let inner = &caps["inner"];
        let (lead, rest) = inner.split_at(inner.find('<').unwrap_or(inner.len()));
        format!("<span>{} [{}]{}</span>", lead, urls.len(), rest)
    });

    let text = text.replace('\r', "");
    let text = p.bold.replace_all(&text, "*");
    let text = p.heading.replace_all(&text, "**");
    let text = p.emphasis.replace_all(&text, "/");
    let text = p.row.replace_all(&text, "\n");
    let text = p.paragraph_end.replace_all(&text, "\n");
    let text = p.line_break.replace_all(&text, "\n");
    let text = p.tag.replace_all(&text, " ");
    let text = text.replace("  ", " ");
    let text = decode_html_entities(&text).replace('\r', "");

    let mut text = text
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .replace("\n\n", "\n");

    if !urls.is_empty() {
        text.push_str("\n\n");
        for (index, url) in urls.iter().enumerate() {
            text.push_str(&format!("[{}] {}\n", index + 1, url));
        }
    }
    text.trim().to_string()
}

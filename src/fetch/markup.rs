//! A tag scanner for the handful of elements the calendar scrape needs.
//!
//! This walks start and end tags with regular expressions and keeps byte
//! offsets so callers can look inside an element. It does not build a tree.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(/?)([a-zA-Z][a-zA-Z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#).expect("invalid regex")
});

static ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z_:@][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("invalid regex")
});

static NUMERIC_ENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));").expect("invalid regex"));

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid regex"));

const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr"];

/// One start or end tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    /// Lowercased element name
    pub name: String,
    /// Attributes in source order, values entity-decoded
    pub attrs: Vec<(String, String)>,
    /// `</name>`
    pub closing: bool,
    /// `<name/>` or a void element
    pub self_closing: bool,
    /// Byte offset of `<`
    pub start: usize,
    /// Byte offset just past `>`
    pub end: usize,
}

impl Tag {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// Iterate over every tag in `html`, in order.
pub fn tags(html: &str) -> impl Iterator<Item = Tag> + '_ {
    TAG_REGEX.captures_iter(html).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps[2].to_ascii_lowercase();
        let raw_attrs = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        let closing = !caps[1].is_empty();
        let self_closing = raw_attrs.trim_end().ends_with('/') || VOID_ELEMENTS.contains(&name.as_str());

        Some(Tag {
            attrs: if closing { Vec::new() } else { parse_attrs(raw_attrs) },
            name,
            closing,
            self_closing,
            start: whole.start(),
            end: whole.end(),
        })
    })
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR_REGEX
        .captures_iter(raw)
        .map(|caps| {
            let key = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (key, value)
        })
        .collect()
}

/// Byte offset of the end tag matching `open`, or the end of input.
pub fn element_end(html: &str, open: &Tag) -> usize {
    if open.self_closing {
        return open.end;
    }

    let mut depth = 0usize;
    for tag in tags(&html[open.end..]) {
        if tag.name != open.name {
            continue;
        }
        if tag.closing {
            if depth == 0 {
                return open.end + tag.start;
            }
            depth -= 1;
        } else if !tag.self_closing {
            depth += 1;
        }
    }
    html.len()
}

/// Tags nested inside `open`.
pub fn descendants<'a>(html: &'a str, open: &Tag) -> impl Iterator<Item = Tag> + 'a {
    let start = open.end;
    let end = element_end(html, open);
    tags(&html[start..end]).map(move |mut tag| {
        tag.start += start;
        tag.end += start;
        tag
    })
}

/// Text content of `open`, tags stripped, entities decoded and whitespace collapsed.
pub fn inner_text(html: &str, open: &Tag) -> String {
    let end = element_end(html, open);
    let inner = &html[open.end..end.max(open.end)];
    let stripped = TAG_REGEX.replace_all(inner, " ");
    collapse_whitespace(&decode_entities(&stripped))
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

/// Decode the character references GitHub emits in attributes and text.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let numeric = NUMERIC_ENTITY_REGEX.replace_all(text, |caps: &regex::Captures<'_>| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attributes_are_parsed_and_decoded() {
        let html = r#"<a id="year-link-2023" class="js-year-link filter-item" href="/octocat?tab=overview&amp;from=2023-12-01" data-x=plain hidden>2023</a>"#;
        let tag = tags(html).next().unwrap();

        assert_eq!(tag.name, "a");
        assert_eq!(tag.attr("id"), Some("year-link-2023"));
        assert_eq!(tag.attr("href"), Some("/octocat?tab=overview&from=2023-12-01"));
        assert_eq!(tag.attr("data-x"), Some("plain"));
        assert_eq!(tag.attr("hidden"), Some(""));
        assert!(tag.has_class("js-year-link"));
        assert!(!tag.has_class("js-year"));
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let html = r#"<td aria-label="a > b" data-level="2"></td>"#;
        let tag = tags(html).next().unwrap();
        assert_eq!(tag.attr("aria-label"), Some("a > b"));
        assert_eq!(tag.attr("data-level"), Some("2"));
    }

    #[test]
    fn test_nested_element_end() {
        let html = "<div><div>inner</div><span>x</span></div><p>after</p>";
        let outer = tags(html).next().unwrap();
        let end = element_end(html, &outer);
        assert_eq!(&html[end..end + 6], "</div>");
        assert_eq!(&html[end + 6..end + 9], "<p>");
    }

    #[test]
    fn test_inner_text() {
        let html = "<h2 id=\"t\">\n   1,234\n   contributions <span>in&nbsp;2023</span>\n</h2>";
        let tag = tags(html).next().unwrap();
        assert_eq!(inner_text(html, &tag), "1,234 contributions in 2023");
    }

    #[test]
    fn test_descendants_stay_inside_element() {
        let html = r#"<td id="c"><span data-date="2024-01-01"></span></td><span data-date="2024-01-02"></span>"#;
        let td = tags(html).next().unwrap();
        let dates: Vec<_> = descendants(html, &td)
            .filter_map(|t| t.attr("data-date").map(str::to_string))
            .collect();
        assert_eq!(dates, vec!["2024-01-01"]);
    }

    #[test]
    fn test_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry&#39;s &#x263A; &lt;3"), "Tom & Jerry's \u{263A} <3");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("plain"), "plain");
    }

    #[test]
    fn test_void_elements_are_self_closing() {
        let html = "<img src=x><br/><td></td>";
        let all: Vec<_> = tags(html).collect();
        assert!(all[0].self_closing);
        assert!(all[1].self_closing);
        assert!(!all[2].self_closing);
        assert!(all[3].closing);
    }
}

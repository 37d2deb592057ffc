//! Page content preparation before it is sent to the model.
//!
//! Raw catalog HTML is mostly markup, scripts and styles. The model only needs
//! the visible text, so pages are reduced to lightweight markdown first.

use std::sync::LazyLock;

use regex::Regex;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("static pattern compiles")
}

static SCRIPT: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<script[^>]*>.*?</script>"));
static STYLE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<style[^>]*>.*?</style>"));
static NOSCRIPT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<noscript[^>]*>.*?</noscript>"));
static COMMENT: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?s)<!--.*?-->"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<title[^>]*>(.*?)</title>"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]>"));
static PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<p[^>]*>(.*?)</p>"));
static BREAK: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<br\s*/?>"));
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<li[^>]*>(.*?)</li>"));
static CELL_END: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</t[dh]>"));
static ROW_END: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</tr>"));
static TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"<[^>]+>"));
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| pattern(r"\n[ \t]*(\n[ \t]*){2,}"));
static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| pattern(r"[ \t]{2,}"));

/// Convert HTML to markdown-ish text.
///
/// Table cells are separated with ` | ` and rows end a line, which keeps
/// specification tables readable as key/value pairs.
pub fn html_to_markdown(html: &str) -> String {
    let mut text = SCRIPT.replace_all(html, "").into_owned();
    text = STYLE.replace_all(&text, "").into_owned();
    text = NOSCRIPT.replace_all(&text, "").into_owned();
    text = COMMENT.replace_all(&text, "").into_owned();

    text = HEADING
        .replace_all(&text, |caps: &regex::Captures| {
            let level: usize = caps[1].parse().unwrap_or(1);
            format!("\n{} {}\n", "#".repeat(level), caps[2].trim())
        })
        .into_owned();
    text = PARAGRAPH.replace_all(&text, "$1\n\n").into_owned();
    text = BREAK.replace_all(&text, "\n").into_owned();
    text = LIST_ITEM.replace_all(&text, "- $1\n").into_owned();
    text = CELL_END.replace_all(&text, " | ").into_owned();
    text = ROW_END.replace_all(&text, "\n").into_owned();
    text = TAG.replace_all(&text, "").into_owned();

    text = decode_entities(&text);
    text = SPACE_RUNS.replace_all(&text, " ").into_owned();
    text = BLANK_RUNS.replace_all(&text, "\n\n").into_owned();

    text.trim().to_string()
}

/// Extract the document title.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|t| !t.is_empty())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&reg;", "®")
        .replace("&trade;", "™")
        .replace("&amp;", "&")
}

/// True when the body looks like HTML rather than plain text.
pub fn looks_like_html(body: &str) -> bool {
    let head =
        openai_client::truncate_to_char_boundary(body.trim_start(), 1024).to_ascii_lowercase();
    head.starts_with("<!doctype") || head.contains("<html") || head.contains("<body")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_styles() {
        let html = r#"<html><head><style>.x{color:red}</style>
            <script type="text/javascript">var secret = 1;</script></head>
            <body><p>Visible</p></body></html>"#;
        let md = html_to_markdown(html);
        assert!(md.contains("Visible"));
        assert!(!md.contains("secret"));
        assert!(!md.contains("color:red"));
    }

    #[test]
    fn test_headings_lists_and_tables() {
        let html = r#"
            <h1>Gauze Sponge</h1>
            <h3>Specifications</h3>
            <ul><li>Sterile</li><li>Cotton</li></ul>
            <table><tr><th>McKesson #</th><td>123456</td></tr>
            <tr><th>Country of Origin</th><td>China</td></tr></table>
        "#;
        let md = html_to_markdown(html);
        assert!(md.contains("# Gauze Sponge"));
        assert!(md.contains("### Specifications"));
        assert!(md.contains("- Sterile"));
        assert!(md.contains("McKesson # | 123456 |"));
        assert!(md.contains("Country of Origin | China |"));
    }

    #[test]
    fn test_entities_decoded_once() {
        let md = html_to_markdown("<p>Johnson &amp; Johnson&reg; &amp;lt;</p>");
        assert_eq!(md, "Johnson & Johnson® &lt;");
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("<html><head><title> Gauze | McKesson </title></head></html>"),
            Some("Gauze | McKesson".to_string())
        );
        assert_eq!(extract_title("<html><body>No title</body></html>"), None);
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("  <!DOCTYPE html><html></html>"));
        assert!(looks_like_html("<body>x</body>"));
        assert!(!looks_like_html("Product name: Gauze"));
    }
}

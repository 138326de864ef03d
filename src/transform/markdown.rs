//! Markdown rendering

use pulldown_cmark::{html, Event, Options, Parser, Tag};

const STYLESHEET: &str = "\
body{margin:0;background:#fff}\
.markdown-body{box-sizing:border-box;max-width:980px;margin:0 auto;padding:45px;\
font-family:-apple-system,BlinkMacSystemFont,\"Segoe UI\",Helvetica,Arial,sans-serif;\
font-size:16px;line-height:1.5;color:#24292e;word-wrap:break-word}\
.markdown-body h1,.markdown-body h2{padding-bottom:.3em;border-bottom:1px solid #eaecef}\
.markdown-body h1,.markdown-body h2,.markdown-body h3,.markdown-body h4{margin-top:24px;margin-bottom:16px;font-weight:600;line-height:1.25}\
.markdown-body a{color:#0366d6;text-decoration:none}\
.markdown-body code{padding:.2em .4em;font-size:85%;background:rgba(27,31,35,.05);border-radius:3px}\
.markdown-body pre{padding:16px;overflow:auto;font-size:85%;line-height:1.45;background:#f6f8fa;border-radius:3px}\
.markdown-body pre code{padding:0;background:transparent}\
.markdown-body blockquote{margin:0;padding:0 1em;color:#6a737d;border-left:.25em solid #dfe2e5}\
.markdown-body table{border-collapse:collapse}\
.markdown-body td,.markdown-body th{padding:6px 13px;border:1px solid #dfe2e5}\
.markdown-body img{max-width:100%}\
@media (max-width:767px){.markdown-body{padding:15px}}";

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Render Markdown to an HTML fragment
pub fn render_fragment(text: &str) -> String {
    let mut body = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut body, Parser::new_ext(text, options()));
    body
}

/// Render Markdown to a standalone, GitHub-styled HTML document
///
/// The document title is the text of the first heading, or `fallback_title`
/// when there is none.
pub fn render_document(text: &str, fallback_title: &str) -> String {
    let title = first_heading(text).unwrap_or_else(|| fallback_title.to_string());
    let body = render_fragment(text);

    let mut document = String::with_capacity(body.len() + STYLESHEET.len() + 256);
    document.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    document.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    document.push_str("<title>");
    document.push_str(&escape_text(&title));
    document.push_str("</title>\n<style>");
    document.push_str(STYLESHEET);
    document.push_str("</style>\n</head>\n<body>\n<article class=\"markdown-body\">\n");
    document.push_str(&body);
    document.push_str("</article>\n</body>\n</html>\n");
    document
}

fn first_heading(text: &str) -> Option<String> {
    let mut in_heading = false;
    let mut heading = String::new();

    for event in Parser::new_ext(text, options()) {
        match event {
            Event::Start(Tag::Heading(..)) => in_heading = true,
            Event::End(Tag::Heading(..)) => {
                let trimmed = heading.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
                in_heading = false;
            }
            Event::Text(t) | Event::Code(t) if in_heading => heading.push_str(&t),
            _ => {}
        }
    }

    None
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

//! Markup and stylesheet minification

use minify_html::{minify, Cfg};

/// Minifier settings shared by the markup and stylesheet steps
fn minifier_config() -> Cfg {
    let mut cfg = Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg
}

/// Minify an HTML document
///
/// Collapses whitespace between tags, drops comments and minifies inline
/// `<style>` and `<script>` blocks. Input that is not UTF-8 or is visibly
/// truncated (open comment or tag at end of input) is rejected.
pub fn minify_markup(source: &[u8]) -> Result<Vec<u8>, String> {
    let text = std::str::from_utf8(source).map_err(|e| format!("not valid UTF-8: {}", e))?;
    check_markup(text)?;
    Ok(minify(text.as_bytes(), &minifier_config()))
}

/// Minify a stylesheet with the markup minifier
///
/// The stylesheet is minified as the body of a `<style>` element and the
/// wrapper is stripped again afterwards.
pub fn minify_stylesheet(source: &[u8]) -> Result<Vec<u8>, String> {
    let text = std::str::from_utf8(source).map_err(|e| format!("not valid UTF-8: {}", e))?;
    if text.to_ascii_lowercase().contains("</style") {
        return Err("stylesheet contains a closing </style> tag".to_string());
    }

    let wrapped = format!("<style>{}</style>", text);
    let minified = minify(wrapped.as_bytes(), &minifier_config());

    minified
        .strip_prefix(b"<style>".as_slice())
        .and_then(|rest| rest.strip_suffix(b"</style>".as_slice()))
        .map(<[u8]>::to_vec)
        .ok_or_else(|| "minifier did not preserve the <style> wrapper".to_string())
}

/// Reject markup that ends inside a comment or a tag
///
/// A tag must reach its `>` before another `<` outside a quoted attribute
/// value. The bodies of `<script>` and `<style>` are skipped.
fn check_markup(text: &str) -> Result<(), String> {
    let bytes = text.as_bytes();
    let lower = text.to_ascii_lowercase();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('<') {
        let start = pos + offset;
        let rest = &text[start..];

        if rest.starts_with("<!--") {
            match rest[4..].find("-->") {
                Some(end) => {
                    pos = start + 4 + end + 3;
                    continue;
                }
                None => return Err(format!("unterminated comment at byte {}", start)),
            }
        }

        let opens_tag = bytes
            .get(start + 1)
            .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'/' || *b == b'!');
        if !opens_tag {
            pos = start + 1;
            continue;
        }

        let end = tag_end(bytes, start).ok_or_else(|| format!("unclosed tag at byte {}", start))?;
        pos = end + 1;

        for raw in ["script", "style"] {
            if is_open_tag(&lower[start..], raw) {
                let closing = format!("</{}", raw);
                match lower[pos..].find(&closing) {
                    Some(body) => pos += body,
                    None => return Err(format!("unclosed <{}> at byte {}", raw, start)),
                }
            }
        }
    }

    Ok(())
}

/// Index of the `>` closing the tag opened at `start`
fn tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(start + 1) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(i),
                b'<' => return None,
                _ => {}
            },
        }
    }
    None
}

fn is_open_tag(tag: &str, name: &str) -> bool {
    tag.strip_prefix('<')
        .and_then(|t| t.strip_prefix(name))
        .and_then(|t| t.bytes().next())
        .is_some_and(|b| b == b'>' || b == b'/' || b.is_ascii_whitespace())
}

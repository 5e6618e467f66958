//! Markdown rendering for markdown fields and template marker containers.

use pulldown_cmark::{Event, Options, Parser, TagEnd, html};

/// Opening tag of the container the template `markdown` filter emits.
pub const MARKER_OPEN: &str = r#"<div data-markdown="true">"#;
const MARKER_CLOSE: &str = "</div>";

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

pub fn render_html(source: &str) -> String {
    let parser = Parser::new_ext(source, options());
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Text content only, one line per block. Used for terminal output.
pub fn render_plain(source: &str) -> String {
    let mut out = String::new();
    for event in Parser::new_ext(source, options()) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::TaskListMarker(done) => out.push_str(if done { "[x] " } else { "[ ] " }),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
    out.trim_end().to_string()
}

/// Wrap raw markdown in a marker container. The content is HTML-escaped so
/// it survives as inert text until [`expand_markers`] runs.
pub fn wrap_marker(source: &str) -> String {
    format!("{MARKER_OPEN}{}{MARKER_CLOSE}", escape_html(source))
}

/// Second pass over rendered template output: replace every marker
/// container with the HTML of its markdown content.
pub fn expand_markers(rendered: &str) -> String {
    let mut out = String::with_capacity(rendered.len());
    let mut rest = rendered;

    while let Some(start) = rest.find(MARKER_OPEN) {
        let body_start = start + MARKER_OPEN.len();
        let Some(body_len) = rest[body_start..].find(MARKER_CLOSE) else {
            break;
        };
        out.push_str(&rest[..start]);
        let body = unescape_html(&rest[body_start..body_start + body_len]);
        out.push_str(r#"<div class="markdown">"#);
        out.push_str(&render_html(&body));
        out.push_str(MARKER_CLOSE);
        rest = &rest[body_start + body_len + MARKER_CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_html(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&#x2f;", "/")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_html() {
        let html = render_html("# Title\n\nSome **bold** text");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_plain() {
        assert_eq!(
            render_plain("# Title\n\nSome **bold**\ntext\n\n- one\n- two"),
            "Title\nSome bold text\none\ntwo"
        );
    }

    #[test]
    fn test_markers_round_trip_through_expansion() {
        let wrapped = wrap_marker("a <b> & **c**");
        assert!(!wrapped[MARKER_OPEN.len()..].contains("<b>"));

        let page = format!("<p>before</p>{wrapped}<p>after</p>");
        let expanded = expand_markers(&page);
        assert!(expanded.starts_with("<p>before</p><div class=\"markdown\">"));
        assert!(expanded.contains("<strong>c</strong>"));
        assert!(expanded.ends_with("<p>after</p>"));
        assert!(!expanded.contains("data-markdown"));
    }

    #[test]
    fn test_unterminated_marker_is_left_alone() {
        let broken = format!("{MARKER_OPEN}text");
        assert_eq!(expand_markers(&broken), broken);
    }
}

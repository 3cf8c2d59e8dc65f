//! Note Markdown
//!
//! Extends pulldown-cmark with:
//! - Custom color syntax: %r%red%r%
//! - Math passthrough: $E=mc^2$ and $$...$$ stay intact for KaTeX
//! - Syntax highlighting (syntect)
//! - Images from the storage buckets, resolved against the API base

use std::sync::OnceLock;

use pulldown_cmark::{html::push_html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> Option<&'static Theme> {
    THEME_SET
        .get_or_init(ThemeSet::load_defaults)
        .themes
        .get("InspiredGitHub")
}

/// Color codes and their hex values
const COLORS: &[(&str, &str)] = &[
    ("r", "#e74c3c"), // red
    ("g", "#27ae60"), // green
    ("b", "#3498db"), // blue
    ("y", "#f1c40f"), // yellow
    ("o", "#e67e22"), // orange
    ("p", "#9b59b6"), // purple
];

/// Render note content to HTML
pub fn render_note(text: &str) -> String {
    render_note_with_base(text, "")
}

/// Render note content; `/storage/...` image paths are prefixed with `base`
pub fn render_note_with_base(text: &str, base: &str) -> String {
    let parser = Parser::new_ext(text, options());
    let events = transform_events(parser, base.trim_end_matches('/'));
    let mut html = String::new();
    push_html(&mut html, events.into_iter());
    html
}

/// Plain-text preview for list rows, cut at `max` characters
pub fn excerpt(text: &str, max: usize) -> String {
    let mut plain = String::new();
    for event in Parser::new_ext(text, options()) {
        match event {
            Event::Text(t) | Event::Code(t) => plain.push_str(&t),
            Event::SoftBreak
            | Event::HardBreak
            | Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => {
                plain.push(' ')
            }
            _ => {}
        }
    }
    let plain = strip_color_markers(&plain);
    let plain = plain.split_whitespace().collect::<Vec<_>>().join(" ");

    if plain.chars().count() <= max {
        return plain;
    }
    let mut cut: String = plain.chars().take(max).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

fn options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS
}

fn strip_color_markers(text: &str) -> String {
    COLORS
        .iter()
        .fold(text.to_string(), |acc, (code, _)| acc.replace(&format!("%{}%", code), ""))
}

enum State {
    Normal,
    InCodeBlock { lang: Option<String>, content: String },
    /// Alt text of an image already emitted as HTML
    InImage { depth: usize },
}

fn transform_events<'a>(parser: Parser<'a>, base: &str) -> Vec<Event<'a>> {
    let mut events = Vec::new();
    let mut state = State::Normal;

    for event in parser {
        match state {
            State::Normal => match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(l) if !l.is_empty() => Some(l.to_string()),
                        _ => None,
                    };
                    state = State::InCodeBlock { lang, content: String::new() };
                }

                Event::Start(Tag::Image { dest_url, .. }) => {
                    let html = format!(
                        r#"<img src="{}" style="max-width: 100%; max-height: 400px; display: block; border-radius: 4px;" />"#,
                        escape_html(&resolve_url(&dest_url, base))
                    );
                    events.push(Event::Html(CowStr::from(html)));
                    state = State::InImage { depth: 0 };
                }

                Event::Text(text) => {
                    if contains_special_syntax(&text) {
                        events.extend(process_text_events(&text));
                    } else {
                        events.push(Event::Text(text));
                    }
                }

                other => events.push(other),
            },

            State::InCodeBlock { ref lang, ref mut content } => match event {
                Event::Text(t) => content.push_str(&t),
                Event::End(TagEnd::CodeBlock) => {
                    let html = highlight_code(content, lang.as_deref());
                    events.push(Event::Html(CowStr::from(html)));
                    state = State::Normal;
                }
                _ => {}
            },

            State::InImage { ref mut depth } => match event {
                Event::Start(_) => *depth += 1,
                Event::End(_) => {
                    if *depth == 0 {
                        state = State::Normal;
                    } else {
                        *depth -= 1;
                    }
                }
                _ => {}
            },
        }
    }

    events
}

fn resolve_url(url: &str, base: &str) -> String {
    if url.starts_with("/storage/") && !base.is_empty() {
        format!("{}{}", base, url)
    } else {
        url.to_string()
    }
}

fn highlight_code(code: &str, lang: Option<&str>) -> String {
    let plain = || format!("<pre><code>{}</code></pre>", escape_html(code));
    let Some(theme) = theme() else {
        return plain();
    };
    let ss = syntax_set();
    let syntax = lang
        .and_then(|l| ss.find_syntax_by_token(l))
        .unwrap_or_else(|| ss.find_syntax_plain_text());

    highlighted_html_for_string(code, ss, syntax, theme).unwrap_or_else(|_| plain())
}

fn contains_special_syntax(text: &str) -> bool {
    text.contains('$') || COLORS.iter().any(|(code, _)| text.contains(&format!("%{}%", code)))
}

enum Marker {
    DisplayMath,
    InlineMath,
    Color { hex: &'static str, pattern: String },
}

impl Marker {
    fn pattern(&self) -> &str {
        match self {
            Marker::DisplayMath => "$$",
            Marker::InlineMath => "$",
            Marker::Color { pattern, .. } => pattern,
        }
    }
}

/// Earliest math or color marker in `text`
fn next_marker(text: &str) -> Option<(usize, Marker)> {
    let mut best: Option<(usize, Marker)> = None;
    let mut consider = |pos: usize, marker: Marker| {
        if best.as_ref().map_or(true, |(p, _)| pos < *p) {
            best = Some((pos, marker));
        }
    };

    if let Some(pos) = text.find('$') {
        if text[pos..].starts_with("$$") {
            consider(pos, Marker::DisplayMath);
        } else {
            consider(pos, Marker::InlineMath);
        }
    }
    for &(code, hex) in COLORS {
        let pattern = format!("%{}%", code);
        if let Some(pos) = text.find(&pattern) {
            consider(pos, Marker::Color { hex, pattern });
        }
    }
    best
}

fn process_text_events(text: &str) -> Vec<Event<'static>> {
    let mut events = Vec::new();
    let mut remaining = text;

    while let Some((pos, marker)) = next_marker(remaining) {
        if pos > 0 {
            events.push(Event::Text(CowStr::from(remaining[..pos].to_string())));
        }
        let pattern = marker.pattern();
        let body = &remaining[pos + pattern.len()..];

        let Some(end) = body.find(pattern) else {
            // Unclosed marker is literal text
            events.push(Event::Text(CowStr::from(pattern.to_string())));
            remaining = body;
            continue;
        };
        let inner = &body[..end];

        match &marker {
            Marker::DisplayMath | Marker::InlineMath => {
                // Raw so KaTeX sees the source, escaped so it stays text
                let html = format!("{}{}{}", pattern, escape_html(inner), pattern);
                events.push(Event::Html(CowStr::from(html)));
            }
            Marker::Color { hex, .. } => {
                events.push(Event::Html(CowStr::from(format!(
                    "<span style=\"color: {}\">",
                    hex
                ))));
                if !inner.is_empty() {
                    events.push(Event::Text(CowStr::from(inner.to_string())));
                }
                events.push(Event::Html(CowStr::from("</span>")));
            }
        }
        remaining = &body[end + pattern.len()..];
    }

    if !remaining.is_empty() {
        events.push(Event::Text(CowStr::from(remaining.to_string())));
    }
    events
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

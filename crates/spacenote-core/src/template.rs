//! Per-space note templates.
//!
//! Templates are Liquid. Filters are strict: the parser rejects any filter
//! that is not registered. Variables are lenient: every variable path the
//! template mentions is seeded with `nil` when the note has no value for it,
//! so unknown variables render as empty output. The context is
//! `{ note, space }`.
//!
//! The `markdown` filter emits an escaped marker container which is expanded
//! into HTML after rendering, see [`crate::markdown::expand_markers`].

use liquid::{Parser, ParserBuilder};
use liquid_core::model::{Object, to_value};
use liquid_core::{
    Display_filter, Expression, Filter, FilterParameters, FilterReflection, FromFilterParameters,
    ParseFilter, Runtime, Value, ValueView,
};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use spacenote_models::{Note, Space};
use std::fmt;
use std::sync::Arc;
use tracing::error;

use crate::error::{ClientError, Result};
use crate::fields;
use crate::markdown;

const DEFAULT_TRUNCATE_LENGTH: usize = 50;
const DEFAULT_TRUNCATE_SUFFIX: &str = "...";

/// Words inside tags and output blocks that are never variable lookups.
const KEYWORDS: &[&str] = &[
    "and", "or", "contains", "in", "with", "as", "reversed", "true", "false", "nil", "null",
    "empty", "blank", "else",
];

/// Outcome of a parse-only template check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TemplateValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Liquid parser with the standard filters plus `date`, `markdown`,
/// `truncate` and `default` overridden for note rendering.
#[derive(Clone)]
pub struct TemplateRenderer {
    parser: Arc<Parser>,
}

impl fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let parser = ParserBuilder::with_stdlib()
            .filter(Date)
            .filter(Markdown)
            .filter(Truncate)
            .filter(Fallback)
            .build()
            .map_err(|e| ClientError::Template(describe(&e)))?;
        Ok(Self {
            parser: Arc::new(parser),
        })
    }

    /// Check syntax and filter names without rendering. Empty is valid.
    pub fn validate(&self, template: &str) -> TemplateValidation {
        if template.trim().is_empty() {
            return TemplateValidation::ok();
        }
        match self.parser.parse(template) {
            Ok(_) => TemplateValidation::ok(),
            Err(e) => TemplateValidation::invalid(describe(&e)),
        }
    }

    /// Render a template against a note. An empty template renders nothing.
    pub fn render(&self, template: &str, space: &Space, note: &Note) -> Result<String> {
        if template.trim().is_empty() {
            return Ok(String::new());
        }

        let parsed = self
            .parser
            .parse(template)
            .map_err(|e| ClientError::Template(describe(&e)))?;
        let globals = globals(template, space, note)?;
        let rendered = parsed
            .render(&globals)
            .map_err(|e| ClientError::Template(describe(&e)))?;
        Ok(markdown::expand_markers(&rendered))
    }

    /// The space's detail template rendered for `note`. `None` means the
    /// caller should use the default view: no template is set or it failed.
    pub fn render_note_detail(&self, space: &Space, note: &Note) -> Option<String> {
        self.render_optional(space.note_detail_template.as_deref(), space, note)
    }

    /// Same as [`render_note_detail`](Self::render_note_detail) for the list
    /// item template.
    pub fn render_note_list_item(&self, space: &Space, note: &Note) -> Option<String> {
        self.render_optional(space.note_list_template.as_deref(), space, note)
    }

    fn render_optional(
        &self,
        template: Option<&str>,
        space: &Space,
        note: &Note,
    ) -> Option<String> {
        let template = template.filter(|t| !t.trim().is_empty())?;
        match self.render(template, space, note) {
            Ok(html) => Some(html),
            Err(e) => {
                error!(
                    space_id = %space.id,
                    note_id = note.id,
                    error = %e,
                    "Template rendering failed, using default view"
                );
                None
            }
        }
    }
}

/// One-line message without the list of everything that was available.
fn describe(err: &liquid_core::Error) -> String {
    let text = err.to_string();
    let parts: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "with:" && !line.starts_with("available"))
        .collect();
    parts.join("; ").trim_start_matches("liquid: ").to_string()
}

fn globals(template: &str, space: &Space, note: &Note) -> Result<Object> {
    let mut context = Map::new();
    context.insert("note".to_string(), serde_json::to_value(note)?);
    context.insert("space".to_string(), serde_json::to_value(space)?);
    for path in variable_paths(template) {
        seed_path(&mut context, &path);
    }

    match to_value(&context).map_err(|e| ClientError::Template(describe(&e)))? {
        Value::Object(object) => Ok(object),
        _ => Err(ClientError::Template(
            "Template context is not an object".to_string(),
        )),
    }
}

/// Insert `nil` at `path` unless something is already there. Stops at the
/// first segment that is not an object; `size`, `first` and `last` are left
/// to Liquid's own lookup.
fn seed_path(root: &mut Map<String, JsonValue>, path: &[String]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    if matches!(last.as_str(), "size" | "first" | "last") {
        return;
    }

    let mut current = root;
    for segment in parents {
        match current
            .entry(segment.clone())
            .or_insert_with(|| JsonValue::Object(Map::new()))
        {
            JsonValue::Object(map) => current = map,
            _ => return,
        }
    }
    current.entry(last.clone()).or_insert(JsonValue::Null);
}

#[derive(Debug, PartialEq)]
enum Token {
    Path(Vec<String>),
    Pipe,
    Colon,
    Other,
}

/// Dotted variable paths read by `{{ }}` and `{% %}` blocks. Tag names,
/// filter names, named arguments and keywords are skipped.
fn variable_paths(template: &str) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    for (is_tag, code) in blocks(template) {
        let tokens = tokenize(&strip_string_literals(code));
        for (idx, token) in tokens.iter().enumerate() {
            let Token::Path(path) = token else {
                continue;
            };
            let tag_name = is_tag && idx == 0;
            let filter_name = idx > 0 && tokens[idx - 1] == Token::Pipe;
            let named_arg = tokens.get(idx + 1) == Some(&Token::Colon);
            let keyword = path.len() == 1 && KEYWORDS.contains(&path[0].as_str());
            if !(tag_name || filter_name || named_arg || keyword || paths.contains(path)) {
                paths.push(path.clone());
            }
        }
    }
    paths
}

/// Bodies of `{{ }}` (false) and `{% %}` (true) blocks, in order.
fn blocks(template: &str) -> Vec<(bool, &str)> {
    let mut found = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (close, is_tag) = match rest[open + 1..].chars().next() {
            Some('{') => ("}}", false),
            Some('%') => ("%}", true),
            _ => {
                rest = &rest[open + 1..];
                continue;
            }
        };
        let body_start = open + 2;
        let Some(len) = rest[body_start..].find(close) else {
            break;
        };
        found.push((is_tag, &rest[body_start..body_start + len]));
        rest = &rest[body_start + len + close.len()..];
    }
    found
}

fn tokenize(code: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = code.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_alphabetic() || ch == '_' {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '?') {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            let segments = word
                .trim_end_matches('-')
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            tokens.push(Token::Path(segments));
        } else if ch.is_ascii_digit() {
            while chars
                .peek()
                .is_some_and(|c| c.is_alphanumeric() || *c == '.')
            {
                chars.next();
            }
            tokens.push(Token::Other);
        } else {
            chars.next();
            match ch {
                '|' => tokens.push(Token::Pipe),
                ':' => tokens.push(Token::Colon),
                c if c.is_whitespace() => {}
                _ => tokens.push(Token::Other),
            }
        }
    }
    tokens
}

/// Blank out quoted strings so their content is not read as code.
fn strip_string_literals(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut quote: Option<char> = None;

    for ch in code.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                    out.push(ch);
                }
            }
            None => {
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                }
                out.push(ch);
            }
        }
    }
    out
}

fn is_nil(value: &dyn ValueView) -> bool {
    matches!(value.to_value(), Value::Nil)
}

// ── Filters ──────────────────────────────────────────────────────────

#[derive(Debug, FilterParameters)]
struct DateArgs {
    #[parameter(description = "\"date_only\" drops the time of day.", arg_type = "str")]
    format: Option<Expression>,
}

#[derive(Clone, ParseFilter, FilterReflection)]
#[filter(
    name = "date",
    description = "Formats an ISO datetime in local time.",
    parameters(DateArgs),
    parsed(DateFilter)
)]
struct Date;

#[derive(Debug, FromFilterParameters, Display_filter)]
#[name = "date"]
struct DateFilter {
    #[parameters]
    args: DateArgs,
}

impl Filter for DateFilter {
    fn evaluate(&self, input: &dyn ValueView, runtime: &dyn Runtime) -> liquid_core::Result<Value> {
        let args = self.args.evaluate(runtime)?;
        if is_nil(input) {
            return Ok(Value::Nil);
        }
        let raw = input.to_kstr();
        if raw.is_empty() {
            return Ok(Value::Nil);
        }
        let date_only = args.format.as_ref().map(|f| f.as_str()) == Some("date_only");
        match fields::format_datetime(raw.as_str(), date_only) {
            Some(formatted) => Ok(Value::scalar(formatted)),
            None => Err(liquid_core::Error::with_msg(format!(
                "invalid datetime: {raw}"
            ))),
        }
    }
}

#[derive(Clone, ParseFilter, FilterReflection)]
#[filter(
    name = "markdown",
    description = "Marks the input for markdown rendering after the template runs.",
    parsed(MarkdownFilter)
)]
struct Markdown;

#[derive(Debug, Default, Display_filter)]
#[name = "markdown"]
struct MarkdownFilter;

impl Filter for MarkdownFilter {
    fn evaluate(&self, input: &dyn ValueView, _runtime: &dyn Runtime) -> liquid_core::Result<Value> {
        if is_nil(input) {
            return Ok(Value::Nil);
        }
        let source = input.to_kstr();
        if source.is_empty() {
            return Ok(Value::Nil);
        }
        Ok(Value::scalar(markdown::wrap_marker(source.as_str())))
    }
}

#[derive(Debug, FilterParameters)]
struct TruncateArgs {
    #[parameter(description = "Number of characters kept.", arg_type = "integer")]
    length: Option<Expression>,
    #[parameter(description = "Text appended when the input is cut.", arg_type = "str")]
    suffix: Option<Expression>,
}

#[derive(Clone, ParseFilter, FilterReflection)]
#[filter(
    name = "truncate",
    description = "Cuts the input to a number of characters and appends a suffix.",
    parameters(TruncateArgs),
    parsed(TruncateFilter)
)]
struct Truncate;

#[derive(Debug, FromFilterParameters, Display_filter)]
#[name = "truncate"]
struct TruncateFilter {
    #[parameters]
    args: TruncateArgs,
}

impl Filter for TruncateFilter {
    fn evaluate(&self, input: &dyn ValueView, runtime: &dyn Runtime) -> liquid_core::Result<Value> {
        let args = self.args.evaluate(runtime)?;
        if is_nil(input) {
            return Ok(input.to_value());
        }
        let text = input.to_kstr();
        let length = args
            .length
            .map_or(DEFAULT_TRUNCATE_LENGTH, |n| n.max(0) as usize);
        if text.chars().count() <= length {
            return Ok(input.to_value());
        }

        let mut cut: String = text.chars().take(length).collect();
        cut.push_str(
            args.suffix
                .as_ref()
                .map_or(DEFAULT_TRUNCATE_SUFFIX, |s| s.as_str()),
        );
        Ok(Value::scalar(cut))
    }
}

#[derive(Debug, FilterParameters)]
struct FallbackArgs {
    #[parameter(description = "Value used when the input is nil.")]
    value: Option<Expression>,
}

#[derive(Clone, ParseFilter, FilterReflection)]
#[filter(
    name = "default",
    description = "Replaces a nil input with the given value.",
    parameters(FallbackArgs),
    parsed(FallbackFilter)
)]
struct Fallback;

#[derive(Debug, FromFilterParameters, Display_filter)]
#[name = "default"]
struct FallbackFilter {
    #[parameters]
    args: FallbackArgs,
}

impl Filter for FallbackFilter {
    fn evaluate(&self, input: &dyn ValueView, runtime: &dyn Runtime) -> liquid_core::Result<Value> {
        let args = self.args.evaluate(runtime)?;
        if is_nil(input) {
            Ok(args.value.map_or(Value::Nil, |value| value.to_value()))
        } else {
            Ok(input.to_value())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spacenote_models::{FieldType, SpaceField};

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new().unwrap()
    }

    fn space() -> Space {
        let mut space = Space::new("journal", "Journal");
        space.fields = vec![
            SpaceField::new("title", FieldType::String),
            SpaceField::new("body", FieldType::Markdown),
        ];
        space
    }

    fn note() -> Note {
        serde_json::from_value(json!({
            "id": 7,
            "author": "alice",
            "created_at": "2025-02-03T04:05:06",
            "fields": {
                "title": "A fairly long title for a note",
                "body": "Some *emphasis*",
                "tags": ["home", "urgent"],
                "empty": null
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_template_is_valid() {
        let renderer = renderer();
        assert!(renderer.validate("").valid);
        assert!(renderer.validate("   \n").valid);
        assert_eq!(renderer.render("", &space(), &note()).unwrap(), "");
    }

    #[test]
    fn test_liquid_filter_arguments_are_valid() {
        let renderer = renderer();
        for template in [
            r#"{{ note.created_at | date: "date_only" }}"#,
            "{{ note.fields.title | truncate: 6 }}",
            r#"{{ note.fields.title | truncate: 6, "~" }}"#,
            r#"{{ note.fields.missing | default: "none" }}"#,
            "{% if note.fields.title %}{{ note.fields.title | upcase }}{% endif %}",
        ] {
            let result = renderer.validate(template);
            assert!(result.valid, "{template}: {:?}", result.error);
        }
    }

    #[test]
    fn test_unknown_filter_is_invalid() {
        let renderer = renderer();
        let result = renderer.validate("{{ note.author | shout }}");
        assert!(!result.valid);
        assert!(result.error.unwrap().to_lowercase().contains("filter"));

        assert!(renderer.render("{{ note.id | shout }}", &space(), &note()).is_err());
    }

    #[test]
    fn test_syntax_error_is_invalid() {
        let result = renderer().validate("{% if note.id %}unclosed");
        assert!(!result.valid);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_pipe_inside_string_literal_is_not_a_filter() {
        assert!(renderer().validate(r#"{{ "a | b" | upcase }}"#).valid);
    }

    #[test]
    fn test_unknown_variables_render_empty() {
        let out = renderer()
            .render(
                "[{{ note.fields.nope.deeper }}][{{ missing }}][{{ note.fields.empty }}]",
                &space(),
                &note(),
            )
            .unwrap();
        assert_eq!(out, "[][][]");
    }

    #[test]
    fn test_custom_filters() {
        let out = renderer()
            .render(
                r#"{{ note.created_at | date: "date_only" }}|{{ note.created_at | date }}|{{ note.fields.title | truncate: 6 }}|{{ note.fields.title | truncate: 6, "~" }}|{{ note.author | truncate }}|{{ note.fields.empty | default: "n/a" }}|{{ note.fields.gone | default: "none" }}"#,
                &space(),
                &note(),
            )
            .unwrap();
        assert_eq!(
            out,
            "2025-02-03|2025-02-03 04:05:06|A fair...|A fair~|alice|n/a|none"
        );
    }

    #[test]
    fn test_loops_and_standard_filters() {
        let out = renderer()
            .render(
                r#"{% for tag in note.fields.tags %}<{{ tag }}>{% endfor %} {{ note.fields.tags | join: ", " }} {{ space.name | downcase }}"#,
                &space(),
                &note(),
            )
            .unwrap();
        assert_eq!(out, "<home><urgent> home, urgent journal");
    }

    #[test]
    fn test_markdown_filter_expands_after_render() {
        let out = renderer()
            .render(
                "<h1>{{ note.fields.title }}</h1>{{ note.fields.body | markdown }}",
                &space(),
                &note(),
            )
            .unwrap();
        assert!(out.contains("<div class=\"markdown\"><p>Some <em>emphasis</em></p>"));
        assert!(!out.contains("data-markdown"));
    }

    #[test]
    fn test_failed_render_falls_back() {
        let renderer = renderer();
        let mut space = space();

        assert_eq!(renderer.render_note_detail(&space, &note()), None);

        space.note_detail_template = Some("{{ note.author | date }}".into());
        assert_eq!(renderer.render_note_detail(&space, &note()), None);

        space.note_list_template = Some("#{{ note.id }} by {{ note.author | upcase }}".into());
        assert_eq!(
            renderer.render_note_list_item(&space, &note()).as_deref(),
            Some("#7 by ALICE")
        );
    }

    #[test]
    fn test_variable_paths_skip_filters_and_keywords() {
        let paths = variable_paths(
            r#"{% for tag in note.fields.tags limit: 2 %}{{ tag | default: fallback }}{% endfor %}{{ "x.y" }}"#,
        );
        let expected: Vec<Vec<String>> = vec![
            vec!["tag".into()],
            vec!["note".into(), "fields".into(), "tags".into()],
            vec!["fallback".into()],
        ];
        assert_eq!(paths, expected);
    }
}

//! Templates: plain text interleaved with `{{ expression }}` blocks.
//!
//! A [`Template`] is parsed once from source and can be rendered many times
//! against different contexts, similarly to how [`crate::maybe::MaybeExpression`]
//! caches a single expression's AST. [`MaybeTemplate`] extends that pattern to
//! a whole template: source that may or may not contain any `{{ }}` blocks at
//! all, auto-detected the same way `MaybeExpression` detects a single one.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::context::EvaluationContext;
use crate::engine::ExpressionEngine;
use crate::error::{ExpressionError, ExpressionResult};

/// A 1-based line/column location in a template's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl Position {
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Walk `source` up to byte offset `offset`, counting lines and columns.
    #[must_use]
    fn from_offset(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for ch in source[..offset.min(source.len())].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One segment of a parsed template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// A run of literal text, copied through unchanged.
    Static {
        content: String,
        position: Position,
    },
    /// An expression between `{{` and `}}`.
    Expression {
        /// The trimmed expression source, without the delimiters.
        content: String,
        /// Where the `{{` begins.
        position: Position,
        /// Byte length of the whole `{{ ... }}` block, delimiters included.
        length: usize,
        /// Whether the content had leading whitespace stripped.
        strip_left: bool,
        /// Whether the content had trailing whitespace stripped.
        strip_right: bool,
    },
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Text with zero or more embedded `{{ expression }}` blocks, parsed once
/// and rendered as many times as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    parts: Vec<TemplatePart>,
}

impl Template {
    /// Parse `source` into static and expression parts.
    ///
    /// Returns [`ExpressionError::SyntaxError`] if a `{{` is never closed.
    pub fn new(source: impl AsRef<str>) -> ExpressionResult<Self> {
        let source = source.as_ref().to_string();
        let mut parts = Vec::new();
        let mut cursor = 0usize;

        while let Some(rel_start) = source[cursor..].find(OPEN) {
            let start = cursor + rel_start;
            if start > cursor {
                parts.push(TemplatePart::Static {
                    content: source[cursor..start].to_string(),
                    position: Position::from_offset(&source, cursor),
                });
            }

            let body_start = start + OPEN.len();
            let Some(rel_end) = source[body_start..].find(CLOSE) else {
                let position = Position::from_offset(&source, start);
                return Err(ExpressionError::syntax_error(format!(
                    "unclosed expression starting at {position}"
                )));
            };
            let body_end = body_start + rel_end;
            let raw = &source[body_start..body_end];
            let strip_left = raw.starts_with(char::is_whitespace);
            let strip_right = raw.ends_with(char::is_whitespace);
            let content = raw.trim().to_string();
            let end = body_end + CLOSE.len();

            parts.push(TemplatePart::Expression {
                content,
                position: Position::from_offset(&source, start),
                length: end - start,
                strip_left,
                strip_right,
            });

            cursor = end;
        }

        if cursor < source.len() {
            parts.push(TemplatePart::Static {
                content: source[cursor..].to_string(),
                position: Position::from_offset(&source, cursor),
            });
        }

        Ok(Self { source, parts })
    }

    /// The original, unparsed source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed parts, in source order.
    #[must_use]
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Number of `{{ }}` blocks in this template.
    #[must_use]
    pub fn expression_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, TemplatePart::Expression { .. }))
            .count()
    }

    /// The expression source of every `{{ }}` block, in order.
    #[must_use]
    pub fn expressions(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                TemplatePart::Expression { content, .. } => Some(content.as_str()),
                TemplatePart::Static { .. } => None,
            })
            .collect()
    }

    /// True if the template has no `{{ }}` blocks at all.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.expression_count() == 0
    }

    /// Evaluate every expression against `context` and splice the results
    /// back into the surrounding text.
    pub fn render(
        &self,
        engine: &ExpressionEngine,
        context: &EvaluationContext,
    ) -> ExpressionResult<String> {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                TemplatePart::Static { content, .. } => out.push_str(content),
                TemplatePart::Expression { content, position, .. } => {
                    let value = engine.evaluate(content, context).map_err(|e| {
                        ExpressionError::eval_error(format!("at {position}: {e}"))
                    })?;
                    out.push_str(&value.to_string());
                }
            }
        }
        Ok(out)
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.source.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Template::new(source).map_err(serde::de::Error::custom)
    }
}

/// A value that is either a concrete string or a [`Template`] to render.
///
/// Mirrors [`crate::maybe::MaybeExpression`] but for whole templates:
/// `{{`/`}}` anywhere in the source marks it dynamic, otherwise the string
/// is returned as-is without ever touching the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum MaybeTemplate {
    /// Plain text with no `{{ }}` blocks.
    Static(String),
    /// Text containing one or more `{{ }}` blocks.
    Dynamic(Template),
}

impl MaybeTemplate {
    /// Build from a raw string, auto-detecting whether it needs rendering.
    #[must_use]
    pub fn from_string(source: impl Into<String>) -> Self {
        let source = source.into();
        if is_template(&source) {
            match Template::new(source.clone()) {
                Ok(template) => MaybeTemplate::Dynamic(template),
                Err(_) => MaybeTemplate::Static(source),
            }
        } else {
            MaybeTemplate::Static(source)
        }
    }

    /// True if this holds a template with at least one `{{ }}` block.
    #[must_use]
    pub fn is_template(&self) -> bool {
        matches!(self, MaybeTemplate::Dynamic(_))
    }

    /// The raw source, whichever variant this is.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            MaybeTemplate::Static(s) => s,
            MaybeTemplate::Dynamic(t) => t.source(),
        }
    }

    /// Render against `context`, evaluating embedded expressions if any.
    pub fn resolve(
        &self,
        engine: &ExpressionEngine,
        context: &EvaluationContext,
    ) -> ExpressionResult<String> {
        match self {
            MaybeTemplate::Static(s) => Ok(s.clone()),
            MaybeTemplate::Dynamic(t) => t.render(engine, context),
        }
    }
}

fn is_template(source: &str) -> bool {
    source.contains(OPEN) && source.contains(CLOSE)
}

impl Serialize for MaybeTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.source().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MaybeTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Ok(MaybeTemplate::from_string(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn plain_text_has_no_expressions() {
        let t = Template::new("just text").unwrap();
        assert_eq!(t.expression_count(), 0);
        assert!(t.is_static());
    }

    #[test]
    fn single_expression_parses() {
        let t = Template::new("Hello {{ $input }}!").unwrap();
        assert_eq!(t.expression_count(), 1);
        assert_eq!(t.expressions(), vec!["$input"]);
    }

    #[test]
    fn multiple_expressions_parse_in_order() {
        let t = Template::new("{{ a }} and {{ b }}").unwrap();
        assert_eq!(t.expressions(), vec!["a", "b"]);
    }

    #[test]
    fn unclosed_expression_is_a_syntax_error() {
        let err = Template::new("Hello {{ $input").unwrap_err();
        assert!(matches!(err, ExpressionError::SyntaxError { .. }));
    }

    #[test]
    fn render_splices_evaluated_expressions() {
        let engine = ExpressionEngine::new();
        let mut ctx = EvaluationContext::new();
        ctx.set_input(Value::text("Alice"));
        ctx.set_execution_var("count", Value::integer(5));

        let t = Template::new("Hello {{ $input }}, you have {{ $execution.count }} messages!")
            .unwrap();
        let rendered = t.render(&engine, &ctx).unwrap();
        assert_eq!(rendered, "Hello Alice, you have 5 messages!");
    }

    #[test]
    fn render_with_no_expressions_returns_source_unchanged() {
        let engine = ExpressionEngine::new();
        let ctx = EvaluationContext::new();
        let t = Template::new("no expressions here").unwrap();
        assert_eq!(t.render(&engine, &ctx).unwrap(), "no expressions here");
    }

    #[test]
    fn maybe_template_detects_dynamic_source() {
        let dynamic = MaybeTemplate::from_string("Hello {{ $input }}!");
        let static_text = MaybeTemplate::from_string("Hello World!");
        assert!(dynamic.is_template());
        assert!(!static_text.is_template());
    }

    #[test]
    fn maybe_template_resolves_static_without_engine_work() {
        let engine = ExpressionEngine::new();
        let ctx = EvaluationContext::new();
        let m = MaybeTemplate::from_string("plain");
        assert_eq!(m.resolve(&engine, &ctx).unwrap(), "plain");
    }

    #[test]
    fn position_tracks_lines_and_columns() {
        let t = Template::new("line1\n{{ expr }}").unwrap();
        let expr_part = t
            .parts()
            .iter()
            .find(|p| matches!(p, TemplatePart::Expression { .. }))
            .unwrap();
        if let TemplatePart::Expression { position, .. } = expr_part {
            assert_eq!(position.line, 2);
            assert_eq!(position.column, 1);
        }
    }

    #[test]
    fn maybe_template_serde_roundtrips_through_source_string() {
        let m = MaybeTemplate::from_string("Hello {{ $input }}!");
        let json = serde_json::to_string(&m).unwrap();
        let back: MaybeTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source(), m.source());
        assert!(back.is_template());
    }
}

//! Pretty-printing for expression/template errors with source context.

use crate::error::ExpressionError;
use crate::template::Position;

/// Render `error` with a caret pointing at `position` in `source`, the way
/// a caller surfacing a bad node config to a user would want it.
///
/// ```
/// use gridflow_expression::error::ExpressionError;
/// use gridflow_expression::error_formatter::format_with_context;
/// use gridflow_expression::Template;
///
/// let err = Template::new("Hello {{ $input").unwrap_err();
/// let rendered = format_with_context(&err, "Hello {{ $input", None);
/// assert!(rendered.contains("unclosed expression"));
/// ```
#[must_use]
pub fn format_with_context(error: &ExpressionError, source: &str, position: Option<Position>) -> String {
    let Some(position) = position else {
        return error.to_string();
    };

    let line = source.lines().nth(position.line.saturating_sub(1)).unwrap_or("");
    let caret_col = position.column.saturating_sub(1);
    let caret = format!("{}^", " ".repeat(caret_col));

    format!(
        "{error} ({}:{})\n{line}\n{caret}",
        position.line, position.column
    )
}

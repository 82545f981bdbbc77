//! Pretty-printing for [`ParseError`], in the teacher's `DiagnosticsPrinter`
//! style: rendering is entirely separate from the error's programmatic
//! `{offset, line, column, message}` fields, and lives behind
//! `annotate-snippets` so embedding applications can opt in to colored,
//! source-annotated output without the core parser ever touching a
//! terminal.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

use crate::error::ParseError;

/// Render a [`ParseError`] against `source` as a human-readable, optionally
/// colored report.
pub fn render(error: &ParseError, source: &str, colored: bool) -> String {
    let start = error.offset as usize;
    let end = (start + 1).min(source.len().max(start));
    let renderer = if colored {
        Renderer::styled()
    } else {
        Renderer::plain()
    };

    let snippet = Snippet::source(source)
        .line_start(1)
        .annotation(AnnotationKind::Primary.span(start..end).label(&error.message));

    let group = Level::ERROR.primary_title(&error.message).element(snippet);
    renderer.render(&[group])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn renders_without_panicking() {
        let err = ParseError::new(4, Position::new(1, 4), "unexpected token");
        let out = render(&err, "let x =", false);
        assert!(out.contains("unexpected token"));
    }
}

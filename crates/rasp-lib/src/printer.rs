//! Builder-pattern printer for rendering parse errors against their source.

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use rasp_core::ParseError;

/// Renders a [`ParseError`] as an annotated source snippet.
///
/// Falls back to the compact `file:row:col: error: ...` form when no source
/// text is supplied.
pub struct ErrorPrinter<'e, 's> {
    error: &'e ParseError,
    source: Option<&'s str>,
    colored: bool,
}

impl<'e, 's> ErrorPrinter<'e, 's> {
    pub fn new(error: &'e ParseError) -> Self {
        Self {
            error,
            source: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let Some(source) = self.source else {
            return self.error.to_string();
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let message = self.error.message();
        let span = annotation_span(self.error.state.pos, source.len());

        let snippet = Snippet::source(source)
            .line_start(1)
            .path(&self.error.filename)
            .annotation(AnnotationKind::Primary.span(span).label(&message));

        let report: Vec<Group> = vec![Level::ERROR.primary_title(&message).element(snippet)];
        renderer.render(&report).to_string()
    }
}

fn annotation_span(pos: usize, limit: usize) -> std::ops::Range<usize> {
    let start = pos.min(limit);
    let end = (start + 1).min(limit);
    start..end
}

#[cfg(test)]
mod tests {
    use super::ErrorPrinter;
    use crate::graph::Parsers;

    #[test]
    fn renders_snippet_with_position_and_message() {
        let mut ps = Parsers::new();
        let d = ps.digit();
        let source = "abc";
        let err = ps.parse("input.txt", source, d).unwrap_err();

        let out = ErrorPrinter::new(&err).source(source).render();
        assert!(out.contains("expected digit at 'a'"), "got: {out}");
        assert!(out.contains("input.txt"), "got: {out}");
        assert!(out.contains("abc"), "got: {out}");
    }

    #[test]
    fn falls_back_to_compact_form_without_source() {
        let mut ps = Parsers::new();
        let d = ps.digit();
        let err = ps.parse("input.txt", "abc", d).unwrap_err();
        assert_eq!(
            ErrorPrinter::new(&err).render(),
            "input.txt:1:1: error: expected digit at 'a'"
        );
    }
}

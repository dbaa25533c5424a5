//! Capture-template rendering.
//!
//! User-authored templates are rendered against a fixed variable set before
//! the result is appended into the graph. Templates are handlebars, so
//! conditionals and loops work; escaping of HTML is disabled because the
//! output is Logseq markdown, not HTML. Captured web content is escaped so it
//! cannot form a cross-reference, macro, or block-reference token.

pub mod datefmt;

use chrono::NaiveDateTime;
use handlebars::{Handlebars, RenderError};
use serde::Serialize;

pub use datefmt::format_logseq_date;

/// What the user captured, as handed over by the host shell.
#[derive(Debug, Clone, Default)]
pub struct CaptureInput {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: String,
}

/// The variable set every template renders against.
#[derive(Debug, Serialize)]
struct TemplateVars<'a> {
    date: String,
    time: String,
    title: Option<&'a str>,
    url: Option<&'a str>,
    content: String,
    /// Raw timestamp for advanced templates
    dt: String,
}

/// Prefix every opening bracket, brace, and paren with a backslash.
///
/// This is what keeps captured text from accidentally forming `[[page]]`,
/// `{{macro}}`, or `((block-ref))` tokens once inserted into the graph.
pub fn logseq_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '[' | '{' | '(') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Renders capture templates. Owns its own engine instance so tests (and
/// concurrent captures) run in isolation.
pub struct CaptureRenderer {
    registry: Handlebars<'static>,
}

impl CaptureRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    /// Render `template` with the standard variable set at time `at`.
    ///
    /// `date` honors the user's configured date-format string; `time` is
    /// fixed 24-hour `HH:mm`. The result is trimmed before use.
    pub fn render(
        &self,
        template: &str,
        input: &CaptureInput,
        at: &NaiveDateTime,
        date_format: &str,
    ) -> Result<String, RenderError> {
        let vars = TemplateVars {
            date: format_logseq_date(at, date_format),
            time: at.format("%H:%M").to_string(),
            title: input.title.as_deref(),
            url: input.url.as_deref(),
            content: logseq_escape(&input.content),
            dt: at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        };
        let rendered = self.registry.render_template(template, &vars)?;
        Ok(rendered.trim().to_string())
    }
}

impl Default for CaptureRenderer {
    fn default() -> Self {
        Self::new()
    }
}

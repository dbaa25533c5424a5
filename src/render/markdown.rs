//! Markdown rendering with Logseq cross-references and query highlighting.
//!
//! The engine is stock CommonMark plus raw-HTML passthrough (the sanitizer
//! emits `<em>` for search highlights) and a custom inline rule that turns
//! `[[Page Name]]` — optionally written `#[[Page Name]]` — into an anchor
//! into the graph instead of literal text.

use markdown_it::parser::inline::{InlineRule, InlineState, Text};
use markdown_it::{MarkdownIt, Node, NodeValue, Renderer};

/// Inline cross-reference to another page in the same graph.
///
/// `graph` and `query` are stamped onto the node after parsing; the rule
/// itself only captures the reference.
#[derive(Debug)]
pub struct PageRefNode {
    pub name: String,
    /// Written with a leading `#` (tag-style reference)
    pub tag: bool,
    pub graph: String,
    pub query: Option<String>,
}

impl NodeValue for PageRefNode {
    fn render(&self, _node: &Node, fmt: &mut dyn Renderer) {
        let href = format!("logseq://graph/{}?page={}", self.graph, self.name);
        fmt.open(
            "a",
            &[("href", href), ("class", "logseq-page-ref".to_string())],
        );
        let display = if self.tag {
            format!("#{}", self.name)
        } else {
            self.name.clone()
        };
        // Cross-reference text participates in highlighting on its own, so a
        // hit inside a link is not lost to the link rendering.
        match self
            .query
            .as_deref()
            .and_then(|q| split_at_match(&display, q))
        {
            Some((pre, hit, post)) => emit_highlighted(fmt, &pre, &hit, &post),
            None => fmt.text(&display),
        }
        fmt.close("a");
    }
}

/// A text token with the first query occurrence wrapped in `<mark>`.
#[derive(Debug)]
struct HighlightedText {
    pre: String,
    hit: String,
    post: String,
}

impl NodeValue for HighlightedText {
    fn render(&self, _node: &Node, fmt: &mut dyn Renderer) {
        emit_highlighted(fmt, &self.pre, &self.hit, &self.post);
    }
}

fn emit_highlighted(fmt: &mut dyn Renderer, pre: &str, hit: &str, post: &str) {
    if !pre.is_empty() {
        fmt.text(pre);
    }
    fmt.open("mark", &[]);
    fmt.text(hit);
    fmt.close("mark");
    if !post.is_empty() {
        fmt.text(post);
    }
}

/// First case-sensitive occurrence of `query`, split into (pre, hit, post).
fn split_at_match(text: &str, query: &str) -> Option<(String, String, String)> {
    if query.is_empty() {
        return None;
    }
    let start = text.find(query)?;
    let end = start + query.len();
    Some((
        text[..start].to_string(),
        text[start..end].to_string(),
        text[end..].to_string(),
    ))
}

/// Parse `[[Name]]` at the start of `input`; returns the name and the number
/// of source characters consumed.
fn scan_page_ref(input: &str) -> Option<(String, usize)> {
    let inner = input.strip_prefix("[[")?;
    let end = inner.find("]]")?;
    let name = &inner[..end];
    if name.is_empty() || name.contains('\n') || name.contains("[[") {
        return None;
    }
    Some((name.to_string(), end + 4))
}

/// Scanner for `[[Page Name]]`.
struct PageRefScanner;

impl InlineRule for PageRefScanner {
    const MARKER: char = '[';

    fn run(state: &mut InlineState) -> Option<(Node, usize)> {
        let input = &state.src[state.pos..state.pos_max];
        let (name, consumed) = scan_page_ref(input)?;
        let node = Node::new(PageRefNode {
            name,
            tag: false,
            graph: String::new(),
            query: None,
        });
        Some((node, consumed))
    }
}

/// Scanner for the tag-style `#[[Page Name]]` form.
struct TaggedPageRefScanner;

impl InlineRule for TaggedPageRefScanner {
    const MARKER: char = '#';

    fn run(state: &mut InlineState) -> Option<(Node, usize)> {
        let input = &state.src[state.pos..state.pos_max];
        let rest = input.strip_prefix('#')?;
        let (name, consumed) = scan_page_ref(rest)?;
        let node = Node::new(PageRefNode {
            name,
            tag: true,
            graph: String::new(),
            query: None,
        });
        Some((node, consumed + 1))
    }
}

/// Markdown renderer for sanitized block content.
pub struct ContentRenderer {
    md: MarkdownIt,
}

impl ContentRenderer {
    pub fn new() -> Self {
        let mut md = MarkdownIt::new();
        markdown_it::plugins::cmark::add(&mut md);
        markdown_it::plugins::html::add(&mut md);
        md.inline.add_rule::<PageRefScanner>();
        md.inline.add_rule::<TaggedPageRefScanner>();
        Self { md }
    }

    /// Render sanitized block text to HTML.
    ///
    /// Cross-references become `logseq://graph/{graph}?page={name}` anchors.
    /// When `query` is given, the first case-sensitive occurrence in each
    /// text token outside code gets wrapped in `<mark>`; code blocks, code
    /// spans, and reference targets are left alone.
    pub fn render(&self, text: &str, graph: &str, query: Option<&str>) -> String {
        let mut ast = self.md.parse(text);
        decorate(&mut ast, graph, query);
        ast.render()
    }
}

impl Default for ContentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Stamp the graph (and highlight query) onto cross-reference nodes and wrap
/// query hits in plain text tokens. Code content never appears as a text
/// token, so it is excluded without a special case.
fn decorate(node: &mut Node, graph: &str, query: Option<&str>) {
    if let Some(page_ref) = node.cast_mut::<PageRefNode>() {
        page_ref.graph = graph.to_string();
        page_ref.query = query.map(str::to_string);
        return;
    }
    if let Some(q) = query {
        let hit = node
            .cast::<Text>()
            .and_then(|text| split_at_match(&text.content, q));
        if let Some((pre, hit, post)) = hit {
            node.replace(HighlightedText { pre, hit, post });
            return;
        }
    }
    for child in node.children.iter_mut() {
        decorate(child, graph, query);
    }
}

//! Content rendering: sanitize raw block text, then render it to HTML.
//!
//! Stage one strips Logseq structural noise (markers, properties, logbooks,
//! macros); stage two runs a markdown engine extended with a `[[Page]]`
//! cross-reference rule and optional query highlighting. Both stages are pure
//! functions of their inputs.

pub mod markdown;
pub mod sanitize;

pub use markdown::ContentRenderer;
pub use sanitize::clean_block_content;

//! File-pattern engine (C4), Markdown/frontmatter adapter (C5), and template
//! renderer (C6) for the beads system's `.todo/*.md` surface.

pub mod error;
pub mod issue_doc;
pub mod markdown;
pub mod pattern;
pub mod render;

pub use error::{ErrorKind, Result, TemplateError};
pub use issue_doc::{edges_from_document, issue_from_document, present_fields, FrontmatterEdges};
pub use markdown::{Document, YamlValue};
pub use pattern::{Pattern, Variable, DEFAULT_PATTERN};
pub use render::{render, render_outputs, RenderContext, RenderedOutput};

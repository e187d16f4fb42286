//! README generation for code example corpora
//!
//! This crate turns a loaded [`DocGen`](docgen_parser::DocGen) into
//! per-language, per-service README pages and collects the rendered pages
//! into a root summary.
//!
//! - [`Scanner`] indexes examples and picks the ones shown on a page.
//! - [`ReadmeRenderer`] renders and writes one page per [`ReadmeTarget`].
//! - [`gather_data`] and [`write_super_summary`] build the root README.

mod renderer;
pub mod scanner;
mod summarizer;
mod templates;

pub use renderer::{ReadmeRenderer, ReadmeTarget, WriteOutcome};
pub use scanner::{Buckets, Scanner};
pub use summarizer::{
    gather_data, render_super_summary, write_super_summary, ReadmeSummary, SUMMARY_END,
};

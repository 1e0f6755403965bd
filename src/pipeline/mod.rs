//! Pipeline stages for document-to-pages conversion.
//!
//! Each submodule implements one step and talks to the outside world only
//! through [`exec::ToolCommand`], so every stage can be tested against a
//! stand-in binary.
//!
//! ## Data Flow
//!
//! ```text
//! route ──▶ to_pdf ──▶ count ──▶ render ──▶ postprocess
//! (ext)   (soffice /  (mutool /  (mutool /   (convert / svgo /
//!          calibre /   pdfium /   inkscape)    gzip)
//!          copy)       scan)
//! ```
//!
//! 1. [`route`]  picks the to-PDF strategy from the source extension
//! 2. [`to_pdf`] writes the intermediate PDF into the workspace
//! 3. [`count`]  finds the page count, with two fallbacks
//! 4. [`render`] writes one PNG or SVG per page, falling back to inkscape
//! 5. [`postprocess`] re-encodes rasters and minifies/compresses vectors
//!
//! [`probe`] answers "is this tool installed?" without running anything.

pub mod count;
pub mod exec;
pub mod postprocess;
pub mod probe;
pub mod render;
pub mod route;
pub mod to_pdf;

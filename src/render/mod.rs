//! Rendering module
//!
//! This module contains:
//! - Geometry and constants shared by every painter
//! - Backdrop composition (blur + dim)
//! - Per-kind annotation painting using tiny-skia
//! - Glyph outlines and text layout
//! - Pointer glyphs for the drawing tools
//! - Whole-frame composition for preview and locked modes

pub mod backdrop;
pub mod composite;
pub mod cursor;
pub mod geometry;
pub mod image;
pub mod text;

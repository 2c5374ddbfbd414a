//! Annotation document and its editing
//!
//! This module provides:
//! - The annotation store with whole-document undo/redo
//! - Hit testing for selection and drag handles
//! - Per-tool gesture handlers

pub mod handlers;
pub mod store;

//! Focus-and-annotate engine for screen captures
//!
//! A [`session::Session`] takes a capture, lets the user narrow attention to
//! a focus window, annotate it with vector marks and export the composite.

pub mod annotations;
pub mod config;
pub mod domain;
pub mod export;
pub mod focus;
pub mod render;
pub mod session;
pub mod text_edit;

//! Core functionality: the page document, configuration, media references and audio

pub mod audio;
pub mod config;
pub mod document;
pub mod file_ref;

//! UI components for LinkBio Studio

pub mod editor;
pub mod link_card;
pub mod media;
pub mod preview;
pub mod preview_model;

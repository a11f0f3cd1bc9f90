//! Image sources for media references
//!
//! URLs and paths are handed to egui's loaders as-is. Embedded `data:` URLs
//! are decoded once and registered with the context under a `bytes://` URI.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use egui::ImageSource;

use crate::core::document::MediaRef;
use crate::core::file_ref::{decode_data_url, extension_for_mime};

/// Cache of decoded embedded images
#[derive(Default)]
pub struct MediaCache {
    /// `bytes://` URI per embedded reference already registered with egui
    registered: HashMap<MediaRef, String>,
    /// Embedded references that failed to decode
    broken: HashSet<MediaRef>,
}

impl MediaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Image source for `media`, or `None` if it cannot be shown
    pub fn image_source(&mut self, ctx: &egui::Context, media: &MediaRef) -> Option<ImageSource<'static>> {
        if media.as_str().is_empty() {
            return None;
        }
        if !media.is_embedded() {
            return Some(ImageSource::Uri(media.as_str().to_string().into()));
        }
        if self.broken.contains(media) {
            return None;
        }
        if let Some(uri) = self.registered.get(media) {
            return Some(ImageSource::Uri(uri.clone().into()));
        }

        match decode_data_url(media.as_str()) {
            Ok((mime, bytes)) => {
                let mut hasher = DefaultHasher::new();
                media.hash(&mut hasher);
                let uri = format!("bytes://media-{:016x}.{}", hasher.finish(), extension_for_mime(&mime));
                ctx.include_bytes(uri.clone(), bytes);
                self.registered.insert(media.clone(), uri.clone());
                Some(ImageSource::Uri(uri.into()))
            }
            Err(e) => {
                tracing::warn!("Cannot display embedded image: {}", e);
                self.broken.insert(media.clone());
                None
            }
        }
    }
}

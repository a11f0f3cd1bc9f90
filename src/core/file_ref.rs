//! Turning picked files into media references
//!
//! Files are read off the UI thread and embedded as base64 `data:` URLs, the
//! same form a browser produces, so the document never points at paths that
//! may disappear.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::core::document::{MediaRef, ProfileEdit};

/// Errors that can occur while producing or reading a media reference
#[derive(Error, Debug)]
pub enum FileRefError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: '{0}'")]
    UnsupportedType(PathBuf),

    #[error("Not a base64 data URL")]
    NotDataUrl,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Profile field a picked file is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileTarget {
    AvatarImage,
    BackgroundImage,
    BackgroundAudio,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "oga", "m4a", "aac", "flac"];

impl FileTarget {
    /// Name of the file dialog filter
    pub fn filter_name(self) -> &'static str {
        match self {
            FileTarget::AvatarImage | FileTarget::BackgroundImage => "Images",
            FileTarget::BackgroundAudio => "Audio",
        }
    }

    /// Extensions accepted by the file dialog
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileTarget::AvatarImage | FileTarget::BackgroundImage => IMAGE_EXTENSIONS,
            FileTarget::BackgroundAudio => AUDIO_EXTENSIONS,
        }
    }

    /// Profile edit that stores `reference` in this field
    pub fn into_edit(self, reference: MediaRef) -> ProfileEdit {
        match self {
            FileTarget::AvatarImage => ProfileEdit::AvatarImage(reference),
            FileTarget::BackgroundImage => ProfileEdit::BackgroundImage(reference),
            FileTarget::BackgroundAudio => ProfileEdit::BackgroundAudio(Some(reference)),
        }
    }
}

/// Guess a MIME type from the file extension
pub fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "m4a" | "aac" => "audio/aac",
        "flac" => "audio/flac",
        _ => return None,
    };
    Some(mime)
}

/// File extension matching a MIME type, for materialising embedded media
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "image/svg+xml" => "svg",
        "audio/mpeg" => "mp3",
        "audio/wav" => "wav",
        "audio/ogg" => "ogg",
        "audio/aac" => "m4a",
        "audio/flac" => "flac",
        _ => "bin",
    }
}

/// Encode bytes as a base64 `data:` URL
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its MIME type and decoded bytes
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), FileRefError> {
    let rest = url.strip_prefix("data:").ok_or(FileRefError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(FileRefError::NotDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(FileRefError::NotDataUrl)?;
    let bytes = STANDARD.decode(payload.trim())?;
    Ok((mime.to_string(), bytes))
}

/// Read a file and embed it as a `data:` URL
pub async fn read_as_data_url(path: &Path) -> Result<String, FileRefError> {
    let mime = guess_mime(path).ok_or_else(|| FileRefError::UnsupportedType(path.to_path_buf()))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| FileRefError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(encode_data_url(mime, &bytes))
}

/// A finished resolution, ready to be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFile {
    pub target: FileTarget,
    pub reference: MediaRef,
}

/// Resolves picked files in the background and hands results back to the UI
pub struct FileResolver {
    runtime: Handle,
    sender: mpsc::UnboundedSender<ResolvedFile>,
    receiver: mpsc::UnboundedReceiver<ResolvedFile>,
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl FileResolver {
    /// Create a resolver; `notify` runs after every finished job, successful or not
    pub fn new(runtime: Handle, notify: impl Fn() + Send + Sync + 'static) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            runtime,
            sender,
            receiver,
            notify: Arc::new(notify),
        }
    }

    /// Start resolving `path` for `target`
    ///
    /// Failures are logged and dropped; the field simply stays as it was.
    pub fn request(&self, target: FileTarget, path: PathBuf) {
        let sender = self.sender.clone();
        let notify = Arc::clone(&self.notify);
        tracing::debug!("Resolving {} for {:?}", path.display(), target);

        self.runtime.spawn(async move {
            match read_as_data_url(&path).await {
                Ok(url) => {
                    let resolved = ResolvedFile {
                        target,
                        reference: MediaRef::from(url),
                    };
                    if sender.send(resolved).is_err() {
                        tracing::debug!("File resolver closed before {} finished", path.display());
                    }
                }
                Err(e) => tracing::warn!("Failed to load {:?} file: {}", target, e),
            }
            notify();
        });
    }

    /// Drain every resolution that has finished since the last poll
    pub fn poll(&mut self) -> Vec<ResolvedFile> {
        let mut done = Vec::new();
        while let Ok(resolved) = self.receiver.try_recv() {
            done.push(resolved);
        }
        done
    }
}

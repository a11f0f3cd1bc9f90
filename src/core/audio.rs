//! Ambient background audio
//!
//! Playback is best effort: a start attempt that the backend refuses arms a
//! single retry, which fires on the next user interaction and then disarms
//! whatever the outcome. None of this feeds back into the rendered page.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::core::document::MediaRef;
use crate::core::file_ref::{decode_data_url, extension_for_mime, FileRefError};

/// Errors that can occur while starting playback
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to prepare audio source: {0}")]
    Source(#[from] FileRefError),

    #[error("Failed to write audio cache file '{path}': {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start player '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Player '{command}' exited with {status}")]
    Exited { command: String, status: ExitStatus },

    #[error("No audio player command configured")]
    NoPlayer,
}

/// Something that can loop an audio source in the background
pub trait AudioBackend {
    /// Start looping `source`, replacing whatever was playing
    fn play(&mut self, source: &MediaRef) -> Result<(), AudioError>;
    /// Stop playback; stopping when idle is fine
    fn stop(&mut self);
    /// A failure of the current start that surfaced after `play` returned
    fn take_failure(&mut self) -> Option<AudioError> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackState {
    Idle,
    Playing,
    /// Start was refused; retry once on the next interaction
    RetryArmed,
}

/// Keeps the backend in step with the profile's background audio
pub struct AmbientAudio<B: AudioBackend> {
    backend: B,
    current: Option<MediaRef>,
    state: PlaybackState,
    /// The one retry for `current` has been used
    retry_spent: bool,
}

impl<B: AudioBackend> AmbientAudio<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
            state: PlaybackState::Idle,
            retry_spent: false,
        }
    }

    /// Follow the current audio reference; only a change triggers work
    pub fn sync(&mut self, source: Option<&MediaRef>) {
        if self.current.as_ref() == source {
            return;
        }

        self.backend.stop();
        self.current = source.cloned();
        self.state = PlaybackState::Idle;
        self.retry_spent = false;

        if let Some(source) = source {
            self.state = match self.backend.play(source) {
                Ok(()) => {
                    tracing::info!("Background audio started");
                    PlaybackState::Playing
                }
                Err(e) => {
                    tracing::info!("Background audio deferred until next interaction: {}", e);
                    PlaybackState::RetryArmed
                }
            };
        }
    }

    /// Called on any user interaction; fires the armed retry exactly once
    pub fn on_user_interaction(&mut self) {
        if self.state != PlaybackState::RetryArmed {
            return;
        }
        self.retry_spent = true;
        let Some(source) = self.current.as_ref() else {
            self.state = PlaybackState::Idle;
            return;
        };

        self.state = match self.backend.play(source) {
            Ok(()) => {
                tracing::info!("Background audio started after interaction");
                PlaybackState::Playing
            }
            Err(e) => {
                tracing::warn!("Background audio still blocked: {}", e);
                PlaybackState::Idle
            }
        };
    }

    /// Pick up a start that failed in the background
    ///
    /// A first failure arms the retry just like a refused `play`; a failure
    /// after the retry leaves playback idle.
    pub fn poll(&mut self) {
        let Some(e) = self.backend.take_failure() else {
            return;
        };
        if self.state != PlaybackState::Playing {
            return;
        }

        if self.retry_spent {
            tracing::warn!("Background audio still blocked: {}", e);
            self.state = PlaybackState::Idle;
        } else {
            tracing::info!("Background audio deferred until next interaction: {}", e);
            self.state = PlaybackState::RetryArmed;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_retry_armed(&self) -> bool {
        self.state == PlaybackState::RetryArmed
    }
}

impl<B: AudioBackend> Drop for AmbientAudio<B> {
    fn drop(&mut self) {
        self.backend.stop();
    }
}

/// Plays audio by running an external player process
///
/// Preparing the source and running the player both happen on the tokio
/// runtime, so a large embedded file never blocks a frame.
pub struct ProcessPlayer {
    /// Program followed by its arguments; the source is appended last
    command: Vec<String>,
    /// Where embedded audio is written so the player can open it
    cache_dir: PathBuf,
    runtime: Handle,
    task: Option<JoinHandle<()>>,
    failure: Option<oneshot::Receiver<AudioError>>,
}

impl ProcessPlayer {
    pub fn new(command: Vec<String>, cache_dir: PathBuf, runtime: Handle) -> Self {
        Self {
            command,
            cache_dir,
            runtime,
            task: None,
            failure: None,
        }
    }
}

/// Path or URL the player should open for `source`
async fn materialise(source: &MediaRef, cache_dir: &Path) -> Result<String, AudioError> {
    if !source.is_embedded() {
        return Ok(source.as_str().to_string());
    }

    let (mime, bytes) = decode_data_url(source.as_str())?;
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    let path = cache_dir.join(format!("ambient-{:016x}.{}", hasher.finish(), extension_for_mime(&mime)));

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        let cache_err = |source| AudioError::Cache {
            path: path.clone(),
            source,
        };
        tokio::fs::create_dir_all(cache_dir).await.map_err(cache_err)?;
        tokio::fs::write(&path, &bytes).await.map_err(cache_err)?;
    }
    Ok(path.to_string_lossy().into_owned())
}

/// Run the player until it exits; aborting the task kills it
async fn run_player(command: Vec<String>, cache_dir: PathBuf, source: MediaRef) -> Result<(), AudioError> {
    let (program, args) = command.split_first().ok_or(AudioError::NoPlayer)?;
    let target = materialise(&source, &cache_dir).await?;

    let mut child = Command::new(program)
        .args(args)
        .arg(&target)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| AudioError::Spawn {
            command: program.clone(),
            source,
        })?;

    let status = child.wait().await.map_err(|source| AudioError::Spawn {
        command: program.clone(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(AudioError::Exited {
            command: program.clone(),
            status,
        })
    }
}

impl AudioBackend for ProcessPlayer {
    fn play(&mut self, source: &MediaRef) -> Result<(), AudioError> {
        self.stop();
        if self.command.is_empty() {
            return Err(AudioError::NoPlayer);
        }

        let (tx, rx) = oneshot::channel();
        let command = self.command.clone();
        let cache_dir = self.cache_dir.clone();
        let source = source.clone();
        self.task = Some(self.runtime.spawn(async move {
            if let Err(e) = run_player(command, cache_dir, source).await {
                let _ = tx.send(e);
            }
        }));
        self.failure = Some(rx);
        Ok(())
    }

    fn stop(&mut self) {
        self.failure = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn take_failure(&mut self) -> Option<AudioError> {
        let error = self.failure.as_mut()?.try_recv().ok()?;
        self.failure = None;
        Some(error)
    }
}

impl Drop for ProcessPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Backend that records calls and fails the first `failures` plays
    #[derive(Clone, Default)]
    struct FakeBackend {
        log: Rc<RefCell<Vec<String>>>,
        failures: Rc<RefCell<usize>>,
        late_failure: Rc<RefCell<Option<AudioError>>>,
    }

    impl FakeBackend {
        fn failing(n: usize) -> Self {
            let backend = Self::default();
            *backend.failures.borrow_mut() = n;
            backend
        }

        fn plays(&self) -> usize {
            self.log.borrow().iter().filter(|e| e.starts_with("play")).count()
        }
    }

    impl AudioBackend for FakeBackend {
        fn play(&mut self, source: &MediaRef) -> Result<(), AudioError> {
            self.log.borrow_mut().push(format!("play {}", source.as_str()));
            let mut failures = self.failures.borrow_mut();
            if *failures > 0 {
                *failures -= 1;
                return Err(AudioError::NoPlayer);
            }
            Ok(())
        }

        fn stop(&mut self) {
            self.log.borrow_mut().push("stop".to_string());
        }

        fn take_failure(&mut self) -> Option<AudioError> {
            self.late_failure.borrow_mut().take()
        }
    }

    #[test]
    fn test_starts_once_per_reference() {
        let backend = FakeBackend::default();
        let mut audio = AmbientAudio::new(backend.clone());
        let song = MediaRef::from("song.mp3");

        audio.sync(Some(&song));
        audio.sync(Some(&song));
        assert!(audio.is_playing());
        assert_eq!(backend.plays(), 1);

        audio.sync(None);
        assert!(!audio.is_playing());
        assert_eq!(backend.log.borrow().last().map(String::as_str), Some("stop"));
    }

    #[test]
    fn test_blocked_start_retries_once_on_interaction() {
        let backend = FakeBackend::failing(1);
        let mut audio = AmbientAudio::new(backend.clone());

        audio.sync(Some(&"song.mp3".into()));
        assert!(audio.is_retry_armed());
        assert_eq!(backend.plays(), 1);

        audio.on_user_interaction();
        assert!(audio.is_playing());
        assert!(!audio.is_retry_armed());
        assert_eq!(backend.plays(), 2);

        audio.on_user_interaction();
        assert_eq!(backend.plays(), 2);
    }

    #[test]
    fn test_retry_disarms_even_when_it_fails() {
        let backend = FakeBackend::failing(5);
        let mut audio = AmbientAudio::new(backend.clone());

        audio.sync(Some(&"song.mp3".into()));
        audio.on_user_interaction();
        audio.on_user_interaction();
        audio.on_user_interaction();

        assert_eq!(backend.plays(), 2);
        assert!(!audio.is_playing());
        assert!(!audio.is_retry_armed());
    }

    #[test]
    fn test_interaction_without_audio_does_nothing() {
        let backend = FakeBackend::default();
        let mut audio = AmbientAudio::new(backend.clone());
        audio.on_user_interaction();
        assert_eq!(backend.plays(), 0);
    }

    #[test]
    fn test_new_reference_replaces_armed_retry() {
        let backend = FakeBackend::failing(1);
        let mut audio = AmbientAudio::new(backend.clone());

        audio.sync(Some(&"first.mp3".into()));
        assert!(audio.is_retry_armed());
        audio.sync(Some(&"second.mp3".into()));
        assert!(audio.is_playing());
        assert_eq!(backend.log.borrow().last().map(String::as_str), Some("play second.mp3"));
    }

    #[test]
    fn test_background_failure_arms_the_retry_once() {
        let backend = FakeBackend::default();
        let mut audio = AmbientAudio::new(backend.clone());

        audio.sync(Some(&"song.mp3".into()));
        audio.poll();
        assert!(audio.is_playing());

        *backend.late_failure.borrow_mut() = Some(AudioError::NoPlayer);
        audio.poll();
        assert!(audio.is_retry_armed());

        audio.on_user_interaction();
        assert!(audio.is_playing());
        assert_eq!(backend.plays(), 2);

        *backend.late_failure.borrow_mut() = Some(AudioError::NoPlayer);
        audio.poll();
        assert!(!audio.is_playing());
        assert!(!audio.is_retry_armed());

        audio.on_user_interaction();
        assert_eq!(backend.plays(), 2);
    }

    #[test]
    fn test_new_reference_gets_a_fresh_retry() {
        let backend = FakeBackend::failing(2);
        let mut audio = AmbientAudio::new(backend.clone());

        audio.sync(Some(&"first.mp3".into()));
        audio.on_user_interaction();
        assert!(!audio.is_retry_armed());

        audio.sync(Some(&"second.mp3".into()));
        *backend.late_failure.borrow_mut() = Some(AudioError::NoPlayer);
        audio.poll();
        assert!(audio.is_retry_armed());
    }

    #[tokio::test]
    async fn test_materialise_writes_embedded_audio() {
        let dir = tempfile::tempdir().unwrap();

        let url = materialise(&"https://example.com/a.mp3".into(), dir.path())
            .await
            .unwrap();
        assert_eq!(url, "https://example.com/a.mp3");

        let embedded = MediaRef::from(crate::core::file_ref::encode_data_url("audio/mpeg", b"ID3"));
        let path = materialise(&embedded, &dir.path().join("cache")).await.unwrap();
        assert!(path.ends_with(".mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3");

        // a second call reuses the cached file
        assert_eq!(materialise(&embedded, &dir.path().join("cache")).await.unwrap(), path);
    }

    #[tokio::test]
    async fn test_process_player_without_command_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut player = ProcessPlayer::new(Vec::new(), dir.path().to_path_buf(), Handle::current());
        assert!(matches!(player.play(&"a.mp3".into()), Err(AudioError::NoPlayer)));
    }

    #[tokio::test]
    async fn test_missing_player_is_reported_after_play() {
        let dir = tempfile::tempdir().unwrap();
        let command = vec!["linkbio-studio-no-such-player".to_string()];
        let mut player = ProcessPlayer::new(command, dir.path().to_path_buf(), Handle::current());

        assert!(player.play(&"a.mp3".into()).is_ok());

        let mut failure = None;
        for _ in 0..100 {
            failure = player.take_failure();
            if failure.is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(matches!(failure, Some(AudioError::Spawn { .. })));
        assert!(player.take_failure().is_none());
    }

    #[tokio::test]
    async fn test_stop_discards_pending_failure() {
        let dir = tempfile::tempdir().unwrap();
        let command = vec!["linkbio-studio-no-such-player".to_string()];
        let mut player = ProcessPlayer::new(command, dir.path().to_path_buf(), Handle::current());

        player.play(&"a.mp3".into()).unwrap();
        player.stop();
        tokio::task::yield_now().await;
        assert!(player.take_failure().is_none());
    }
}

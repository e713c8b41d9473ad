use std::io::Cursor;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use thiserror::Error;

use crate::assets::{AssetKind, AssetStore};

const MUSIC_VOLUME: f32 = 0.5;

/// Sounds the game can ask for. Scenes push cues into a queue; the main loop
/// drains it into the audio system once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    BackgroundMusic,
    Hit,
    Success,
}

impl SoundCue {
    pub fn asset_key(self) -> &'static str {
        match self {
            Self::BackgroundMusic => "background",
            Self::Hit => "hit",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output is unavailable")]
    Unavailable,
    #[error("sound '{0}' is not loaded")]
    MissingAsset(&'static str),
    #[error("failed to decode sound '{key}': {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: rodio::decoder::DecoderError,
    },
    #[error("failed to create audio sink: {0}")]
    Sink(#[from] rodio::PlayError),
}

/// rodio output plus the looping music sink. Missing hardware is not fatal:
/// every call becomes a logged no-op.
pub struct AudioSystem {
    _stream: Option<OutputStream>,
    stream_handle: Option<OutputStreamHandle>,
    music_sink: Option<Sink>,
    muted: bool,
}

impl AudioSystem {
    pub fn new() -> Self {
        match OutputStream::try_default() {
            Ok((stream, stream_handle)) => Self {
                _stream: Some(stream),
                stream_handle: Some(stream_handle),
                music_sink: None,
                muted: false,
            },
            Err(e) => {
                log::warn!("Failed to initialize audio: {e}. Audio will be unavailable.");
                Self {
                    _stream: None,
                    stream_handle: None,
                    music_sink: None,
                    muted: false,
                }
            }
        }
    }

    /// Play queued cues, in order. Failures are logged and skipped.
    pub fn drain(&mut self, cues: &mut Vec<SoundCue>, assets: &AssetStore, muted: bool) {
        self.set_muted(muted);
        for cue in cues.drain(..) {
            if let Err(err) = self.play(cue, assets) {
                log::debug!("Sound cue {cue:?} not played: {err}");
            }
        }
    }

    pub fn play(&mut self, cue: SoundCue, assets: &AssetStore) -> Result<(), AudioError> {
        let handle = self.stream_handle.as_ref().ok_or(AudioError::Unavailable)?;
        // Muted effects are dropped, not deferred. Music still starts, paused.
        if self.muted && cue != SoundCue::BackgroundMusic {
            return Ok(());
        }
        let key = cue.asset_key();
        if !assets.has(key, AssetKind::Audio) {
            return Err(AudioError::MissingAsset(key));
        }
        let bytes: Arc<[u8]> = assets
            .get(key)
            .map(|asset| Arc::clone(&asset.bytes))
            .ok_or(AudioError::MissingAsset(key))?;
        let source =
            Decoder::new(Cursor::new(bytes)).map_err(|source| AudioError::Decode { key, source })?;

        let sink = Sink::try_new(handle)?;
        match cue {
            SoundCue::BackgroundMusic => {
                self.stop_music();
                sink.append(source.repeat_infinite());
                sink.set_volume(MUSIC_VOLUME);
                if self.muted {
                    sink.pause();
                }
                self.music_sink = Some(sink);
            }
            SoundCue::Hit | SoundCue::Success => {
                sink.append(source);
                sink.detach();
            }
        }
        Ok(())
    }

    pub fn set_muted(&mut self, muted: bool) {
        if self.muted == muted {
            return;
        }
        self.muted = muted;
        if let Some(sink) = &self.music_sink {
            if muted {
                sink.pause();
            } else {
                sink.play();
            }
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(sink) = self.music_sink.take() {
            sink.stop();
        }
    }
}

impl Default for AudioSystem {
    fn default() -> Self {
        Self::new()
    }
}

use crate::events::Cue;
use anyhow::Result;
use std::collections::VecDeque;
use std::path::PathBuf;

/// Fire-and-forget sound cues plus the background music track.
///
/// Implementations report failures through the returned `Result`; callers treat
/// audio as best-effort and never let an error block navigation.
pub trait AudioCues {
    fn play_cue(&mut self, cue: Cue) -> Result<()>;

    fn play_hover_cue(&mut self) -> Result<()> {
        self.play_cue(Cue::Hover)
    }

    fn play_click_cue(&mut self) -> Result<()> {
        self.play_cue(Cue::Click)
    }

    fn set_music_muted(&mut self, _muted: bool) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AudioAssets {
    pub hover_cue: Option<PathBuf>,
    pub click_cue: Option<PathBuf>,
    pub music: Option<PathBuf>,
    pub music_volume: f32,
}

pub struct AudioManager {
    enabled: bool,
    capacity: usize,
    triggers: VecDeque<Cue>,
    #[cfg(feature = "audio_output")]
    output: Option<output::RodioOutput>,
}

impl AudioManager {
    /// A manager that only records cue triggers.
    pub fn new(capacity: usize) -> Self {
        Self {
            enabled: true,
            capacity: capacity.max(1),
            triggers: VecDeque::new(),
            #[cfg(feature = "audio_output")]
            output: None,
        }
    }

    /// Opens the default output device and preloads `assets`. A missing device
    /// or unreadable file leaves the manager silent.
    pub fn with_assets(capacity: usize, assets: &AudioAssets) -> Self {
        #[allow(unused_mut)]
        let mut manager = Self::new(capacity);
        #[cfg(feature = "audio_output")]
        match output::RodioOutput::open(assets) {
            Ok(output) => manager.output = Some(output),
            Err(err) => tracing::warn!(target: "audio", "audio output unavailable, running silent: {err:#}"),
        }
        #[cfg(not(feature = "audio_output"))]
        tracing::info!(target: "audio", ?assets, "built without audio output, cues are recorded only");
        manager
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn clear(&mut self) {
        self.triggers.clear();
    }

    pub fn recent_triggers(&self) -> impl ExactSizeIterator<Item = &Cue> {
        self.triggers.iter()
    }

    fn push_trigger(&mut self, cue: Cue) {
        if self.triggers.len() == self.capacity {
            self.triggers.pop_front();
        }
        self.triggers.push_back(cue);
    }
}

impl AudioCues for AudioManager {
    fn play_cue(&mut self, cue: Cue) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.push_trigger(cue);
        #[cfg(feature = "audio_output")]
        if let Some(output) = self.output.as_mut() {
            output.play(cue)?;
        }
        Ok(())
    }

    fn set_music_muted(&mut self, muted: bool) -> Result<()> {
        #[cfg(feature = "audio_output")]
        if let Some(output) = self.output.as_mut() {
            output.set_music_muted(muted)?;
        }
        #[cfg(not(feature = "audio_output"))]
        let _ = muted;
        Ok(())
    }
}

#[cfg(feature = "audio_output")]
mod output {
    use super::AudioAssets;
    use crate::events::Cue;
    use anyhow::{anyhow, Context, Result};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    type Clip = Arc<[u8]>;

    pub(super) struct RodioOutput {
        // Dropping the stream stops all playback.
        _stream: OutputStream,
        handle: OutputStreamHandle,
        hover: Option<Clip>,
        click: Option<Clip>,
        music: Option<Sink>,
    }

    impl RodioOutput {
        pub(super) fn open(assets: &AudioAssets) -> Result<Self> {
            let (stream, handle) = OutputStream::try_default().context("No default audio output device")?;
            let hover = load_clip(assets.hover_cue.as_deref());
            let click = load_clip(assets.click_cue.as_deref());
            let music = match load_clip(assets.music.as_deref()) {
                Some(bytes) => match start_music(&handle, bytes, assets.music_volume) {
                    Ok(sink) => Some(sink),
                    Err(err) => {
                        tracing::warn!(target: "audio", "background music disabled: {err:#}");
                        None
                    }
                },
                None => None,
            };
            Ok(Self { _stream: stream, handle, hover, click, music })
        }

        pub(super) fn play(&mut self, cue: Cue) -> Result<()> {
            let clip = match cue {
                Cue::Hover => self.hover.as_ref(),
                Cue::Click => self.click.as_ref(),
            };
            let Some(clip) = clip else {
                return Ok(());
            };
            let source = Decoder::new(Cursor::new(clip.clone()))
                .with_context(|| format!("Failed to decode {} cue", cue.label()))?;
            self.handle
                .play_raw(source.convert_samples())
                .map_err(|err| anyhow!("Failed to play {} cue: {err}", cue.label()))
        }

        pub(super) fn set_music_muted(&mut self, muted: bool) -> Result<()> {
            let Some(sink) = self.music.as_ref() else {
                tracing::debug!(target: "audio", muted, "no music track loaded");
                return Ok(());
            };
            if muted {
                sink.pause();
            } else {
                sink.play();
            }
            Ok(())
        }
    }

    fn load_clip(path: Option<&Path>) -> Option<Clip> {
        let path = path?;
        match fs::read(path) {
            Ok(bytes) => Some(Arc::from(bytes)),
            Err(err) => {
                tracing::warn!(target: "audio", path = %path.display(), "failed to read audio asset: {err}");
                None
            }
        }
    }

    fn start_music(handle: &OutputStreamHandle, bytes: Clip, volume: f32) -> Result<Sink> {
        let sink = Sink::try_new(handle).context("Failed to create music sink")?;
        let source = Decoder::new(Cursor::new(bytes)).context("Failed to decode music track")?;
        sink.set_volume(volume.clamp(0.0, 1.0));
        // Starts muted; the host unmutes on request.
        sink.pause();
        sink.append(source.repeat_infinite());
        Ok(sink)
    }
}

//! Ambient playback backends.
//!
//! Real playback needs the `audio` feature (rodio). Without it the player
//! reports the device as unavailable and the session runs silently.

use std::path::PathBuf;

use tomato_core::AmbientPlayer;

pub fn player(sounds_dir: PathBuf) -> Box<dyn AmbientPlayer> {
    #[cfg(feature = "audio")]
    {
        Box::new(sink::SinkPlayer::new(sounds_dir))
    }
    #[cfg(not(feature = "audio"))]
    {
        Box::new(Unavailable { sounds_dir })
    }
}

#[cfg(not(feature = "audio"))]
struct Unavailable {
    sounds_dir: PathBuf,
}

#[cfg(not(feature = "audio"))]
impl AmbientPlayer for Unavailable {
    fn play(&mut self, sound: tomato_core::AmbientSound) -> Result<(), tomato_core::EffectError> {
        tracing::debug!(path = %sound.path_in(&self.sounds_dir).display(), "ambient playback requested");
        Err(tomato_core::EffectError::AudioUnavailable(
            "built without the `audio` feature".into(),
        ))
    }

    fn pause(&mut self) -> Result<(), tomato_core::EffectError> {
        Ok(())
    }
}

#[cfg(feature = "audio")]
mod sink {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};

    use rodio::decoder::Mp4Type;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use tomato_core::{AmbientPlayer, AmbientSound, EffectError};
    use tracing::debug;

    /// How a sound file is handed to the decoder.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(super) enum Container {
        /// ISO MP4 (AAC audio). The probe cannot always recognise it.
        Mp4,
        /// Let the decoder sniff the format (mp3, wav).
        Probe,
    }

    pub(super) fn container_of(path: &Path) -> Container {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mp4") || ext.eq_ignore_ascii_case("m4a") => {
                Container::Mp4
            }
            _ => Container::Probe,
        }
    }

    pub(super) fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, EffectError> {
        let file = File::open(path).map_err(|_| EffectError::SoundNotFound(path.to_path_buf()))?;
        let reader = BufReader::new(file);
        let decoded = match container_of(path) {
            Container::Mp4 => Decoder::new_mp4(reader, Mp4Type::Mp4),
            Container::Probe => Decoder::new(reader),
        };
        decoded.map_err(|e| EffectError::AudioUnavailable(format!("{}: {e}", path.display())))
    }

    /// Loops the chosen sound on the default output device.
    pub struct SinkPlayer {
        sounds_dir: PathBuf,
        // The stream must outlive every sink created from its handle.
        output: Option<(OutputStream, OutputStreamHandle)>,
        sink: Option<Sink>,
    }

    impl SinkPlayer {
        pub fn new(sounds_dir: PathBuf) -> Self {
            Self {
                sounds_dir,
                output: None,
                sink: None,
            }
        }

        fn handle(&mut self) -> Result<&OutputStreamHandle, EffectError> {
            if self.output.is_none() {
                let output = OutputStream::try_default()
                    .map_err(|e| EffectError::AudioUnavailable(e.to_string()))?;
                self.output = Some(output);
            }
            match &self.output {
                Some((_, handle)) => Ok(handle),
                None => Err(EffectError::AudioUnavailable("no output stream".into())),
            }
        }
    }

    impl AmbientPlayer for SinkPlayer {
        fn play(&mut self, sound: AmbientSound) -> Result<(), EffectError> {
            if let Some(old) = self.sink.take() {
                old.stop();
            }

            let source = open_source(&sound.path_in(&self.sounds_dir))?;
            let sink = Sink::try_new(self.handle()?)
                .map_err(|e| EffectError::AudioUnavailable(e.to_string()))?;
            sink.append(source.repeat_infinite());
            debug!(%sound, "ambient playback started");
            self.sink = Some(sink);
            Ok(())
        }

        fn pause(&mut self) -> Result<(), EffectError> {
            if let Some(sink) = &self.sink {
                sink.pause();
            }
            Ok(())
        }
    }
}

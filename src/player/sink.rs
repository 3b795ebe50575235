//! rodio-backed output: decoding a file into a `Sink` on the default device.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use super::backend::{OutputBackend, OutputHandle};
use super::types::PlaybackError;

pub struct RodioBackend {
    stream: OutputStream,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn new() -> Result<Self, PlaybackError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::NoOutputDevice(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl OutputBackend for RodioBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn OutputHandle>, PlaybackError> {
        let file = File::open(path).map_err(|e| PlaybackError::Unloadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::Unloadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // rodio decoders often cannot report a total duration up front; read
        // it from the container instead.
        let duration = lofty::read_from_path(path)
            .ok()
            .map(|tagged| tagged.properties().duration());

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();

        Ok(Box::new(RodioHandle { sink, duration }))
    }
}

struct RodioHandle {
    sink: Sink,
    duration: Option<Duration>,
}

impl OutputHandle for RodioHandle {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn set_rate(&mut self, rate: f32) {
        self.sink.set_speed(rate);
    }

    fn set_position(&mut self, position: Duration) {
        if let Err(e) = self.sink.try_seek(position) {
            log::debug!("seek to {position:?} not supported by source: {e}");
        }
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

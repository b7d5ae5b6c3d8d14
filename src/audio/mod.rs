pub mod chime;

use chime::Chime;

use anyhow::{anyhow, Result};
use log::warn;
use rodio::{OutputStream, Sink};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use crate::timer::CompletionNotifier;

/// Played quietly; the cue should be noticeable, not alarming.
const CHIME_VOLUME: f32 = 0.3;

enum AudioCommand {
    Chime,
}

/// Best-effort completion chime.
///
/// A dedicated thread owns the non-`Send` output stream and sink and receives
/// commands over a channel; the thread (and the audio device) is only brought
/// up on the first chime. Every failure along the way is logged and dropped —
/// a machine without an output device still gets a correct countdown.
pub struct ChimePlayer {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl ChimePlayer {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|_| anyhow!("audio channel mutex poisoned"))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        // Dedicated thread holding the non-Send audio objects
        thread::Builder::new()
            .name("audio-chime".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<()> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| anyhow!("failed to open audio output: {e}"))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| anyhow!("failed to create audio sink: {e}"))?;
                        new_sink.set_volume(CHIME_VOLUME);
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Chime => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                warn!("completion chime skipped: {err}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.append(Chime::new());
                            }
                        }
                    }
                }
            })
            .map_err(|e| anyhow!("failed to spawn audio thread: {e}"))?;

        let tx_clone = tx.clone();
        *guard = Some(tx);
        Ok(tx_clone)
    }
}

impl Default for ChimePlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionNotifier for ChimePlayer {
    fn notify(&self) {
        let result = self.ensure_thread().and_then(|tx| {
            tx.send(AudioCommand::Chime)
                .map_err(|_| anyhow!("audio thread is gone"))
        });

        if let Err(err) = result {
            warn!("completion chime unavailable: {err}");
        }
    }
}

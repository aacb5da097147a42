//! Off-thread image loading with completions delivered back to the owner thread.
//!
//! Every request gets a monotonically increasing token. The engine remembers the latest token
//! per slot and drops completions that arrive for anything older.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::{
    assets::{
        chroma::key_frame,
        decode::{PreparedImage, decode_image, decode_rgba8, prepare_rgba8},
        source::AssetSource,
    },
    foundation::error::{StoryframeError, StoryframeResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoadSlot {
    Frame,
    Photo,
}

#[derive(Debug)]
pub(crate) enum LoadedAsset {
    Frame { image: PreparedImage, keyed: bool },
    Photo(PreparedImage),
}

#[derive(Debug)]
pub(crate) struct LoadCompletion {
    pub(crate) slot: LoadSlot,
    pub(crate) token: u64,
    pub(crate) key: String,
    pub(crate) result: StoryframeResult<LoadedAsset>,
}

pub(crate) struct Loader {
    tx: Sender<LoadCompletion>,
    rx: Receiver<LoadCompletion>,
    next_token: u64,
    in_flight: usize,
}

impl Loader {
    pub(crate) fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            next_token: 1,
            in_flight: 0,
        }
    }

    /// Reserve a token without starting a load, invalidating older requests of a slot.
    pub(crate) fn bump_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        token
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub(crate) fn spawn_frame(&mut self, source: AssetSource, threshold: u8) -> u64 {
        self.spawn(LoadSlot::Frame, source, move |bytes| {
            let processed = key_frame(decode_rgba8(bytes)?, threshold);
            Ok(LoadedAsset::Frame {
                keyed: processed.keyed,
                image: prepare_rgba8(processed.image),
            })
        })
    }

    pub(crate) fn spawn_photo(&mut self, source: AssetSource) -> u64 {
        self.spawn(LoadSlot::Photo, source, |bytes| {
            Ok(LoadedAsset::Photo(decode_image(bytes)?))
        })
    }

    fn spawn<F>(&mut self, slot: LoadSlot, source: AssetSource, job: F) -> u64
    where
        F: FnOnce(&[u8]) -> StoryframeResult<LoadedAsset> + Send + 'static,
    {
        let token = self.bump_token();
        let key = source.cache_key();
        let tx = self.tx.clone();
        self.in_flight += 1;

        let worker_key = key.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("storyframe-load-{token}"))
            .spawn(move || {
                let _span = tracing::debug_span!("load", ?slot, token).entered();
                let result = catch_unwind(AssertUnwindSafe(|| {
                    let bytes = source.read_bytes()?;
                    job(&bytes)
                }))
                .unwrap_or_else(|_| Err(StoryframeError::decode("image decoder panicked")));
                let _ = tx.send(LoadCompletion {
                    slot,
                    token,
                    key: worker_key,
                    result,
                });
            });

        if let Err(err) = spawned {
            let _ = self.tx.send(LoadCompletion {
                slot,
                token,
                key,
                result: Err(StoryframeError::Other(
                    anyhow::Error::new(err).context("spawn image loader thread"),
                )),
            });
        }
        token
    }

    /// Next finished load, if one is already waiting.
    pub(crate) fn try_next(&mut self) -> Option<LoadCompletion> {
        let done = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(done)
    }

    /// Block until the next load finishes; `None` once nothing is in flight.
    pub(crate) fn wait_next(&mut self) -> Option<LoadCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        let done = self.rx.recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(done)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;

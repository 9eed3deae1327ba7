//! Background decoding of artwork uploads and garment mockups
//!
//! Each request is decoded on its own thread and reported back over a
//! channel. Requests carry a generation number per kind; only the result of
//! the most recent request of a kind is handed to the caller; older results
//! are dropped when they arrive.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tiny_skia::Pixmap;

use super::upload::decode_pixmap;

/// What a decoded image will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Artwork,
    Mockup,
}

impl AssetKind {
    fn index(self) -> usize {
        match self {
            AssetKind::Artwork => 0,
            AssetKind::Mockup => 1,
        }
    }
}

/// Where the encoded bytes come from
#[derive(Debug, Clone)]
pub enum AssetSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

impl AssetSource {
    fn decode(self) -> Result<Pixmap> {
        match self {
            AssetSource::Bytes(bytes) => decode_pixmap(&bytes),
            AssetSource::File(path) => {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                decode_pixmap(&bytes).with_context(|| format!("failed to decode {}", path.display()))
            }
        }
    }
}

struct Loaded {
    kind: AssetKind,
    generation: u64,
    label: String,
    result: Result<Pixmap>,
}

/// Result of the latest request of its kind
#[derive(Debug)]
pub struct Decoded {
    pub kind: AssetKind,
    /// Caller supplied label (garment key, file name)
    pub label: String,
    pub result: Result<Pixmap>,
}

pub struct AssetLoader {
    tx: Sender<Loaded>,
    rx: Receiver<Loaded>,
    latest: [u64; 2],
    in_flight: usize,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            latest: [0; 2],
            in_flight: 0,
        }
    }

    /// Start decoding; supersedes any earlier request of the same kind
    pub fn request(&mut self, kind: AssetKind, source: AssetSource, label: &str) -> u64 {
        let slot = &mut self.latest[kind.index()];
        *slot += 1;
        let generation = *slot;
        self.in_flight += 1;

        let tx = self.tx.clone();
        let label = label.to_string();
        let thread_label = label.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("decode-{}", generation))
            .spawn(move || {
                let result = source.decode();
                let _ = tx.send(Loaded {
                    kind,
                    generation,
                    label: thread_label,
                    result,
                });
            });
        if let Err(err) = spawned {
            log::error!("Failed to spawn decode thread: {}", err);
            let _ = self.tx.send(Loaded {
                kind,
                generation,
                label,
                result: Err(anyhow::Error::new(err).context("failed to start decoding")),
            });
        }
        generation
    }

    /// True when no decode is pending
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// Collect finished decodes without blocking
    pub fn poll(&mut self) -> Vec<Decoded> {
        let mut out = Vec::new();
        while let Ok(loaded) = self.rx.try_recv() {
            self.accept(loaded, &mut out);
        }
        out
    }

    /// Block until every pending decode has finished or `timeout` elapses
    pub fn wait(&mut self, timeout: Duration) -> Vec<Decoded> {
        let deadline = Instant::now() + timeout;
        let mut out = self.poll();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(loaded) => self.accept(loaded, &mut out),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("{} decode(s) still pending after {:?}", self.in_flight, timeout);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        out
    }

    fn accept(&mut self, loaded: Loaded, out: &mut Vec<Decoded>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if loaded.generation != self.latest[loaded.kind.index()] {
            log::debug!(
                "Dropping stale {:?} decode '{}' (generation {})",
                loaded.kind,
                loaded.label,
                loaded.generation
            );
            return;
        }
        out.push(Decoded {
            kind: loaded.kind,
            label: loaded.label,
            result: loaded.result,
        });
    }
}

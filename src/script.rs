//! Scripted editing sessions
//!
//! A script is a list of steps (TOML `[[step]]` tables or a JSON object with
//! a `step` array) replayed against a session in place of interactive input.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::assets::{mime_from_path, parse_data_uri};
use crate::config::HexColor;
use crate::domain::{Point, PointerEvent, PointerPhase, Viewport};
use crate::export::encode_png;
use crate::session::{DesignSession, EditMsg, Notice, TextMsg, ZoomDirection};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    /// Display rectangle pointer coordinates are given in; surface space when unset
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

fn once() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Garment {
        color: String,
    },
    /// Upload a file; the MIME type is guessed from the extension unless given
    Upload {
        path: PathBuf,
        #[serde(default)]
        mime: Option<String>,
    },
    UploadDataUri {
        uri: String,
    },
    ClearImage,
    Zoom {
        direction: ZoomDirection,
        #[serde(default = "once")]
        times: u32,
    },
    Title {
        text: String,
    },
    Subtitle {
        text: String,
    },
    Font {
        family: String,
    },
    TextColor {
        color: HexColor,
    },
    TitleSize {
        size: f32,
    },
    SubtitleSize {
        size: f32,
    },
    ClearText,
    Pointer {
        event: PointerEvent,
    },
    /// Mouse drag from `from` to `to` in `steps` moves
    Drag {
        from: Point,
        to: Point,
        #[serde(default)]
        shift: bool,
        #[serde(default = "once")]
        steps: u32,
    },
    /// Wait for pending decodes and exports
    Settle,
    Export,
    /// Write the current surface as PNG
    Snapshot {
        path: PathBuf,
    },
}

impl Script {
    /// Load a script; `.json` files are read as JSON, anything else as TOML
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script: {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let script = if is_json {
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse script: {}", path.display()))?
        } else {
            toml::from_str(&raw).with_context(|| format!("failed to parse script: {}", path.display()))?
        };
        Ok(script)
    }
}

/// Summary of a script run
#[derive(Debug, Default)]
pub struct RunReport {
    pub steps_run: usize,
    /// Steps the session rejected; the run continued past them
    pub rejected: usize,
    pub notices: Vec<Notice>,
}

/// Replays scripts against a session
///
/// Relative paths in steps resolve against `base_dir`.
pub struct ScriptRunner<'a> {
    session: &'a mut DesignSession,
    base_dir: PathBuf,
    timeout: Duration,
    report: RunReport,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(session: &'a mut DesignSession, base_dir: &Path, timeout: Duration) -> Self {
        Self {
            session,
            base_dir: base_dir.to_path_buf(),
            timeout,
            report: RunReport::default(),
        }
    }

    /// Run every step, then wait for background work to finish
    pub fn run(mut self, script: &Script) -> Result<RunReport> {
        if let Some(viewport) = script.viewport {
            self.send(EditMsg::SetViewport(viewport));
        }
        for (index, step) in script.steps.iter().enumerate() {
            log::debug!("Step {}: {:?}", index + 1, step);
            self.step(step)
                .with_context(|| format!("step {} failed", index + 1))?;
            self.report.steps_run += 1;
        }
        self.session.settle(self.timeout);
        self.collect_notices();
        Ok(self.report)
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Garment { color } => self.send(EditMsg::SetGarment(color.clone())),
            Step::Upload { path, mime } => {
                let path = self.resolve(path);
                let bytes =
                    std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
                let mime = mime
                    .clone()
                    .or_else(|| mime_from_path(&path).map(str::to_string))
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                self.send(EditMsg::Upload { mime, bytes });
                // later steps address the placed image
                self.session.settle(self.timeout);
            }
            Step::UploadDataUri { uri } => {
                let (mime, bytes) = parse_data_uri(uri)?;
                self.send(EditMsg::Upload { mime, bytes });
                self.session.settle(self.timeout);
            }
            Step::ClearImage => self.send(EditMsg::ClearImage),
            Step::Zoom { direction, times } => {
                for _ in 0..*times {
                    self.send(EditMsg::Zoom(*direction));
                }
            }
            Step::Title { text } => self.send(EditMsg::Text(TextMsg::SetTitle(text.clone()))),
            Step::Subtitle { text } => self.send(EditMsg::Text(TextMsg::SetSubtitle(text.clone()))),
            Step::Font { family } => self.send(EditMsg::Text(TextMsg::SetFont(family.clone()))),
            Step::TextColor { color } => self.send(EditMsg::Text(TextMsg::SetColor(*color))),
            Step::TitleSize { size } => self.send(EditMsg::Text(TextMsg::SetTitleSize(*size))),
            Step::SubtitleSize { size } => self.send(EditMsg::Text(TextMsg::SetSubtitleSize(*size))),
            Step::ClearText => self.send(EditMsg::ClearText),
            Step::Pointer { event } => self.send(EditMsg::Pointer(event.clone())),
            Step::Drag {
                from,
                to,
                shift,
                steps,
            } => self.drag(*from, *to, *shift, *steps),
            Step::Settle => self.session.settle(self.timeout),
            Step::Export => self.send(EditMsg::Export),
            Step::Snapshot { path } => {
                let path = self.resolve(path);
                self.session.pump();
                let png = encode_png(self.session.surface())?;
                std::fs::write(&path, png).with_context(|| format!("failed to write {}", path.display()))?;
                log::info!("Snapshot written to {}", path.display());
            }
        }
        Ok(())
    }

    fn drag(&mut self, from: Point, to: Point, shift: bool, steps: u32) {
        let steps = steps.max(1);
        let press = PointerEvent::mouse(PointerPhase::Press, from.x, from.y).with_shift(shift);
        self.send(EditMsg::Pointer(press));
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let x = from.x + (to.x - from.x) * t;
            let y = from.y + (to.y - from.y) * t;
            let motion = PointerEvent::mouse(PointerPhase::Move, x, y).with_shift(shift);
            self.send(EditMsg::Pointer(motion));
        }
        let release = PointerEvent::mouse(PointerPhase::Release, to.x, to.y);
        self.send(EditMsg::Pointer(release));
    }

    fn send(&mut self, msg: EditMsg) {
        if self.session.handle(msg).is_err() {
            self.report.rejected += 1;
        }
        self.session.pump();
        self.collect_notices();
    }

    fn collect_notices(&mut self) {
        self.report.notices.extend(self.session.take_notices());
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

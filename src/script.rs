//! Recorded host sessions: a viewport plus a list of interactions replayed against an engine.

use std::{io::Read, path::Path};

use anyhow::Context;

use crate::{
    engine::FrameEngine, foundation::error::StoryframeResult, gesture::input::InputEvent,
    layout::display::Viewport,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionScript {
    /// Applied with [`FrameEngine::resize`] before the first step.
    #[serde(default)]
    pub viewport: Option<Viewport>,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

/// One host interaction.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    ZoomIn,
    ZoomOut,
    /// Back to the cover transform.
    Fit,
    /// Clear the photo; the transform returns to its defaults.
    Reset,
    DisplayWidth {
        width: f64,
    },
    Resize(Viewport),
    Input {
        event: InputEvent,
    },
}

impl SessionScript {
    pub fn from_json_str(s: &str) -> StoryframeResult<Self> {
        Ok(serde_json::from_str(s).context("parse session script JSON")?)
    }

    pub fn from_json_reader(r: impl Read) -> StoryframeResult<Self> {
        Ok(serde_json::from_reader(r).context("parse session script JSON")?)
    }

    pub fn load(path: &Path) -> StoryframeResult<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open session script '{}'", path.display()))?;
        Self::from_json_reader(std::io::BufReader::new(f))
    }

    /// Replay every step in order. Returns how many steps changed the photo transform.
    pub fn apply(&self, engine: &mut FrameEngine) -> usize {
        if let Some(viewport) = self.viewport {
            engine.resize(viewport);
        }

        let mut changed = 0;
        for (idx, step) in self.steps.iter().enumerate() {
            let before = engine.revision();
            match step {
                ScriptStep::ZoomIn => {
                    engine.zoom_in();
                }
                ScriptStep::ZoomOut => {
                    engine.zoom_out();
                }
                ScriptStep::Fit => {
                    engine.fit_to_frame();
                }
                ScriptStep::Reset => engine.set_user_photo(None),
                ScriptStep::DisplayWidth { width } => {
                    engine.set_display_width(*width);
                }
                ScriptStep::Resize(viewport) => {
                    engine.resize(*viewport);
                }
                ScriptStep::Input { event } => {
                    engine.handle_input(event);
                }
            }
            if engine.revision() != before {
                changed += 1;
            }
            tracing::trace!(idx, ?step, revision = engine.revision(), "script step");
        }
        tracing::debug!(steps = self.steps.len(), changed, "session script applied");
        changed
    }
}

#[cfg(test)]
#[path = "../tests/unit/script.rs"]
mod tests;

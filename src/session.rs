//! Fetch-and-render sessions.
//!
//! A [`Session`] reacts to page-style events (initial load, mode change,
//! resize). Every event stamps a new generation, fetches samples for the
//! current mode, and renders a fresh [`Frame`]. The fetch is the only
//! suspension point; when it completes, the result is kept only if no newer
//! event arrived meanwhile, so the latest request always wins no matter which
//! response lands first.

use crate::error::{Error, Result};
use crate::geometry::Surface;
use crate::overlay::{Frame, HeatmapSettings, Overlay, RenderConfig};
use crate::source::{Mode, SampleSource};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// What to do when the source fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailurePolicy {
    /// Log and keep the previous picture.
    #[default]
    Skip,
    /// Log and render the fallback set.
    Fallback,
}

/// Event that starts a render cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// First render.
    Load,
    /// Switch the data-source selector, then render.
    ModeChange(Mode),
    /// Resize the surface, then render.
    Resize(Surface),
}

/// How a cycle ended.
#[derive(Debug)]
pub enum Outcome {
    /// A new frame was rendered.
    Rendered(Box<Frame>),
    /// A newer cycle started while this one was fetching; its data was dropped.
    Superseded {
        /// Generation of the dropped cycle.
        generation: u64,
    },
    /// The fetch failed and the policy is [`FetchFailurePolicy::Skip`].
    Skipped {
        /// The fetch error.
        error: Error,
    },
}

impl Outcome {
    /// The frame, if one was rendered.
    #[must_use]
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            Self::Rendered(frame) => Some(frame.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct State {
    mode: Mode,
    config: RenderConfig,
    overlay: Overlay,
}

/// Event-driven renderer over a [`SampleSource`].
#[derive(Debug)]
pub struct Session<S> {
    source: S,
    heat: HeatmapSettings,
    policy: FetchFailurePolicy,
    generation: AtomicU64,
    state: Mutex<State>,
}

impl<S: SampleSource> Session<S> {
    /// Create a session in the default mode.
    #[must_use]
    pub fn new(source: S, config: RenderConfig, heat: HeatmapSettings) -> Self {
        Self {
            source,
            heat,
            policy: FetchFailurePolicy::default(),
            generation: AtomicU64::new(0),
            state: Mutex::new(State {
                mode: Mode::default(),
                config,
                overlay: Overlay::new(),
            }),
        }
    }

    /// Start in `mode`.
    #[must_use]
    pub fn with_mode(self, mode: Mode) -> Self {
        self.lock().mode = mode;
        self
    }

    /// Set the fetch failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FetchFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.lock().mode.clone()
    }

    /// Current surface.
    pub fn surface(&self) -> Surface {
        self.lock().config.surface
    }

    /// Generation of the most recent cycle (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    // Poisoning only means another cycle panicked mid-render; the state is
    // plain data and still usable.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initial render.
    ///
    /// # Errors
    ///
    /// See [`Self::handle`].
    pub async fn load(&self) -> Result<Outcome> {
        self.handle(Trigger::Load).await
    }

    /// Switch modes and re-render.
    ///
    /// # Errors
    ///
    /// See [`Self::handle`].
    pub async fn set_mode(&self, mode: Mode) -> Result<Outcome> {
        self.handle(Trigger::ModeChange(mode)).await
    }

    /// Resize the surface and re-render from scratch.
    ///
    /// # Errors
    ///
    /// See [`Self::handle`]. An invalid surface is rejected before anything
    /// changes.
    pub async fn resize(&self, surface: Surface) -> Result<Outcome> {
        self.handle(Trigger::Resize(surface)).await
    }

    /// Run one fetch-and-render cycle.
    ///
    /// # Errors
    ///
    /// Fetch failures are reported through [`Outcome`], not as errors. Errors
    /// come from an invalid resize or from rendering itself (for instance
    /// degenerate bounds).
    pub async fn handle(&self, trigger: Trigger) -> Result<Outcome> {
        let (generation, mode) = {
            let mut state = self.lock();
            match trigger {
                Trigger::Load => {}
                Trigger::ModeChange(mode) => state.mode = mode,
                Trigger::Resize(surface) => {
                    surface.validate()?;
                    state.config.surface = surface;
                }
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (generation, state.mode.clone())
        };
        debug!(generation, %mode, "fetching samples");

        let fetched = self.source.fetch(&mode).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "superseded by a newer request");
            return Ok(Outcome::Superseded { generation });
        }

        let samples = match fetched {
            Ok(samples) => samples,
            Err(error) => {
                warn!(generation, %mode, %error, "sample fetch failed");
                match self.policy {
                    FetchFailurePolicy::Skip => return Ok(Outcome::Skipped { error }),
                    FetchFailurePolicy::Fallback => Vec::new(),
                }
            }
        };

        let mut state = self.lock();
        let State {
            config, overlay, ..
        } = &mut *state;
        let frame = overlay.render_frame(&samples, config, &self.heat)?;
        Ok(Outcome::Rendered(Box::new(frame)))
    }
}

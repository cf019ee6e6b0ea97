use std::time::{Duration, Instant};

use crate::channel::Transform;
use crate::display::{DisplayStyle, Levels};
use crate::error::{AlignError, Result};
use crate::viewport::{RenderQuality, ViewportState};

/// How long input must stay quiet before the deferred full-quality
/// re-render runs.
pub const RENDER_SETTLE: Duration = Duration::from_millis(120);

/// Keyboard modifier scaling applied to nudge and rotate steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepModifier {
    Normal,
    Coarse,
    Fine,
}

/// Step sizes for keyboard alignment commands.
#[derive(Clone, Debug, PartialEq)]
pub struct StepSizes {
    /// Base translation step in image pixels.
    pub translate: f64,
    /// Multiplier while Shift is held.
    pub coarse: f64,
    /// Multiplier while Alt is held.
    pub fine: f64,
    /// Base rotation step in degrees.
    pub rotate: f64,
}

impl Default for StepSizes {
    fn default() -> Self {
        Self {
            translate: 1.0,
            coarse: 10.0,
            fine: 0.5,
            rotate: 0.1,
        }
    }
}

impl StepSizes {
    pub fn translate_step(&self, modifier: StepModifier) -> f64 {
        match modifier {
            StepModifier::Normal => self.translate,
            StepModifier::Coarse => self.translate * self.coarse,
            StepModifier::Fine => self.translate * self.fine,
        }
    }

    pub fn rotate_step(&self, modifier: StepModifier) -> f64 {
        match modifier {
            StepModifier::Normal => self.rotate,
            StepModifier::Coarse => self.rotate * 10.0,
            StepModifier::Fine => self.rotate * 0.2,
        }
    }
}

/// One discrete input applied to the session.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Move the active channel by (dx, dy) step units.
    Nudge {
        dx: f64,
        dy: f64,
        modifier: StepModifier,
    },
    /// Rotate the active channel; `direction` is -1 or +1.
    Rotate {
        direction: i8,
        modifier: StepModifier,
    },
    CycleActive,
    /// Make the given channel the target of keyboard commands.
    SetActive { index: usize },
    ResetActive,
    ResetAll,
    /// Move the viewport by (dx, dy) image pixels.
    Pan { dx: f32, dy: f32 },
    /// Multiply the zoom, keeping `anchor` (viewport pixels) fixed when given.
    ZoomBy {
        factor: f32,
        anchor: Option<(f32, f32)>,
    },
    ZoomToFit,
    SetOpacity { index: usize, value: f32 },
    SetBrightness { value: f32 },
    SetLevels { levels: Levels },
    ToggleFullResolution,
    /// The viewport was resized to (width, height) display pixels.
    Resize { width: usize, height: usize },
}

/// What a handled event requires of the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redraw {
    None,
    /// Redraw immediately at draft quality; a full render follows on idle.
    Draft,
    /// Redraw once at full quality.
    Full,
}

/// All mutable state of one alignment session.
///
/// Input handlers translate raw input into [`Event`] values and feed them
/// through [`SessionState::apply`], so the alignment logic runs headlessly
/// in tests. Pixel data lives elsewhere (the render worker); the session
/// tracks only transforms and view parameters.
#[derive(Clone, Debug)]
pub struct SessionState {
    transforms: Vec<Transform>,
    active: usize,
    pub viewport: ViewportState,
    pub style: DisplayStyle,
    pub steps: StepSizes,
    generation: u64,
    image_size: (usize, usize),
}

impl SessionState {
    pub fn new(channel_count: usize, image_size: (usize, usize), viewport_size: (usize, usize)) -> Self {
        let mut viewport = ViewportState::new(viewport_size);
        viewport.zoom = ViewportState::fit_zoom(image_size, viewport_size);
        viewport.pan = ViewportState::centered_pan(image_size, viewport_size, viewport.zoom);
        Self {
            transforms: vec![Transform::default(); channel_count],
            // Channel 0 reads as the reference; start keyboard control on
            // the first channel that can move against it.
            active: if channel_count > 1 { 1 } else { 0 },
            viewport,
            style: DisplayStyle::for_channels(channel_count),
            steps: StepSizes::default(),
            generation: 0,
            image_size,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.transforms.len()
    }

    pub fn image_size(&self) -> (usize, usize) {
        self.image_size
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn transform(&self, index: usize) -> Result<Transform> {
        self.transforms
            .get(index)
            .copied()
            .ok_or(AlignError::ChannelIndexOutOfRange {
                index,
                total: self.transforms.len(),
            })
    }

    pub fn set_transform(&mut self, index: usize, t: Transform) -> Result<()> {
        let total = self.transforms.len();
        let slot = self
            .transforms
            .get_mut(index)
            .ok_or(AlignError::ChannelIndexOutOfRange { index, total })?;
        *slot = t;
        Ok(())
    }

    pub fn reset(&mut self, index: usize) -> Result<()> {
        self.set_transform(index, Transform::default())
    }

    pub fn reset_all(&mut self) {
        self.transforms.fill(Transform::default());
    }

    /// Advance the active channel, wrapping to 0. Returns the new index.
    pub fn cycle_active(&mut self) -> usize {
        self.active = (self.active + 1) % self.transforms.len();
        self.active
    }

    /// Monotonic counter identifying the current render-relevant state.
    /// Completed renders stamped with an older value must be dropped.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn accepts(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Apply one input event. Any event that changes what is on screen bumps
    /// the generation, invalidating in-flight renders of older state.
    pub fn apply(&mut self, event: Event) -> Redraw {
        let redraw = self.dispatch(event);
        if redraw != Redraw::None {
            self.generation += 1;
        }
        redraw
    }

    fn dispatch(&mut self, event: Event) -> Redraw {
        match event {
            Event::Nudge { dx, dy, modifier } => {
                let step = self.steps.translate_step(modifier);
                let t = &mut self.transforms[self.active];
                t.dx += dx * step;
                t.dy += dy * step;
                Redraw::Draft
            }
            Event::Rotate {
                direction,
                modifier,
            } => {
                let step = self.steps.rotate_step(modifier);
                self.transforms[self.active].angle_deg += f64::from(direction) * step;
                Redraw::Draft
            }
            Event::CycleActive => {
                self.cycle_active();
                Redraw::Full
            }
            Event::SetActive { index } => {
                if index < self.transforms.len() && index != self.active {
                    self.active = index;
                    Redraw::Full
                } else {
                    Redraw::None
                }
            }
            Event::ResetActive => {
                self.transforms[self.active] = Transform::default();
                Redraw::Full
            }
            Event::ResetAll => {
                self.reset_all();
                Redraw::Full
            }
            Event::Pan { dx, dy } => {
                self.viewport.pan.0 += dx;
                self.viewport.pan.1 += dy;
                Redraw::Draft
            }
            Event::ZoomBy { factor, anchor } => {
                let old_zoom = self.viewport.zoom;
                let new_zoom = ViewportState::clamp_zoom(old_zoom * factor);
                if let Some((ax, ay)) = anchor {
                    // Keep the image point under the anchor stationary.
                    self.viewport.pan.0 += ax / old_zoom - ax / new_zoom;
                    self.viewport.pan.1 += ay / old_zoom - ay / new_zoom;
                }
                self.viewport.zoom = new_zoom;
                Redraw::Draft
            }
            Event::ZoomToFit => {
                self.viewport.zoom = ViewportState::fit_zoom(self.image_size, self.viewport.size);
                self.viewport.pan =
                    ViewportState::centered_pan(self.image_size, self.viewport.size, self.viewport.zoom);
                Redraw::Full
            }
            Event::SetOpacity { index, value } => {
                if let Some(opacity) = self.style.opacities.get_mut(index) {
                    *opacity = value.clamp(0.0, 1.0);
                    Redraw::Draft
                } else {
                    Redraw::None
                }
            }
            Event::SetBrightness { value } => {
                self.style.brightness = value.max(0.0);
                Redraw::Draft
            }
            Event::SetLevels { levels } => {
                self.style.levels = levels;
                Redraw::Full
            }
            Event::ToggleFullResolution => {
                self.viewport.full_resolution = !self.viewport.full_resolution;
                Redraw::Full
            }
            Event::Resize { width, height } => {
                if self.viewport.size == (width, height) {
                    Redraw::None
                } else {
                    self.viewport.size = (width, height);
                    Redraw::Full
                }
            }
        }
    }

    /// The viewport to render for the given quality tier.
    pub fn viewport_for(&self, quality: RenderQuality) -> ViewportState {
        let mut view = self.viewport.clone();
        view.quality = quality;
        view
    }
}

/// Schedules the deferred full-quality render: each interactive event
/// pushes the deadline out, and the render fires once input has settled.
#[derive(Clone, Debug)]
pub struct RenderDebounce {
    settle: Duration,
    deadline: Option<Instant>,
}

impl Default for RenderDebounce {
    fn default() -> Self {
        Self::new(RENDER_SETTLE)
    }
}

impl RenderDebounce {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            deadline: None,
        }
    }

    /// Record an interactive event at `now`, postponing the full render.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.settle);
    }

    /// Drop any pending full render (a full render already happened).
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once when the settle window has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

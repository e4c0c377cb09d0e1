use reqwest::Url;
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Wider viewports keep the sheet horizontally centered.
    pub desktop_breakpoint: f64,
    pub max_dismiss_distance: f64,
    pub dismiss_height_ratio: f64,
    pub min_backdrop_opacity: f64,
    pub settle_duration: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            desktop_breakpoint: 768.0,
            max_dismiss_distance: 150.0,
            dismiss_height_ratio: 0.33,
            min_backdrop_opacity: 0.25,
            settle_duration: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetTransform {
    Centered { offset_y: f64 },
    Vertical { offset_y: f64 },
}


impl Display for SheetTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetTransform::Centered { offset_y } => {
                write!(f, "translateX(-50%) translateY({}px)", offset_y)
            }
            SheetTransform::Vertical { offset_y } => write!(f, "translateY({}px)", offset_y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Follows the finger with no easing.
    Disabled,
    /// Sheet eases over 300ms, backdrop over 250ms.
    Animated,
    Cleared,
}

/// The panel, its backdrop and the page behind them.
pub trait SheetSurface {
    fn viewport(&self) -> Viewport;
    fn panel_height(&self) -> f64;
    fn set_transform(&mut self, transform: SheetTransform);
    fn set_backdrop_opacity(&mut self, opacity: f64);
    fn set_transition(&mut self, transition: Transition);
    /// Shows or hides panel and backdrop, locking page scroll while shown.
    fn set_active(&mut self, active: bool);
    fn load_form(&mut self, url: &Url);
}

/// Raw input on the panel header; moves and ups for the pointer come from the whole page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    PointerDown { y: f64 },
    PointerMove { y: f64 },
    PointerUp,
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    TouchEnd,
    TouchCancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging { start_y: f64, current_y: f64 },
    Settling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Dismissed,
    Restored,
}

pub struct GestureController {
    config: GestureConfig,
    state: GestureState,
    tracking_pointer: bool,
}

impl GestureController {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
            tracking_pointer: false,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether page-wide pointer move/up listeners are attached.
    pub fn is_tracking_pointer(&self) -> bool {
        self.tracking_pointer
    }

    pub fn dismiss_threshold(&self, panel_height: f64) -> f64 {
        self.config
            .max_dismiss_distance
            .min(panel_height * self.config.dismiss_height_ratio)
    }

    pub fn transform(&self, viewport: Viewport, offset_y: f64) -> SheetTransform {
        if viewport.width > self.config.desktop_breakpoint {
            SheetTransform::Centered { offset_y }
        } else {
            SheetTransform::Vertical { offset_y }
        }
    }

    /// Returns how the drag ended, only for the input that ended it.
    pub fn handle<S: SheetSurface>(&mut self, input: GestureInput, surface: &mut S) -> Option<Release> {
        match input {
            GestureInput::PointerDown { y } => {
                self.tracking_pointer = true;
                self.start(y, surface);
                None
            }
            GestureInput::TouchStart { y } => {
                self.start(y, surface);
                None
            }
            GestureInput::PointerMove { y } => {
                if self.tracking_pointer {
                    self.drag_to(y, surface);
                }
                None
            }
            GestureInput::TouchMove { y } => {
                self.drag_to(y, surface);
                None
            }
            GestureInput::PointerUp => {
                if !self.tracking_pointer {
                    return None;
                }
                self.tracking_pointer = false;
                self.release(surface)
            }
            GestureInput::TouchEnd | GestureInput::TouchCancel => self.release(surface),
        }
    }

    /// Clears the settle animation once it had time to play.
    pub fn finish_settling<S: SheetSurface>(&mut self, surface: &mut S) {
        if self.state == GestureState::Settling {
            surface.set_transition(Transition::Cleared);
            self.state = GestureState::Idle;
        }
    }

    /// Puts the panel back at rest, dropping whatever a previous drag left behind.
    pub fn reset<S: SheetSurface>(&mut self, surface: &mut S) {
        self.state = GestureState::Idle;
        self.tracking_pointer = false;

        surface.set_transform(self.transform(surface.viewport(), 0.0));
        surface.set_backdrop_opacity(1.0);
    }

    fn start<S: SheetSurface>(&mut self, y: f64, surface: &mut S) {
        trace!(y, "Drag started");

        self.state = GestureState::Dragging {
            start_y: y,
            current_y: y,
        };
        surface.set_transition(Transition::Disabled);
    }

    fn drag_to<S: SheetSurface>(&mut self, y: f64, surface: &mut S) {
        let GestureState::Dragging { start_y, .. } = self.state else {
            return;
        };

        self.state = GestureState::Dragging {
            start_y,
            current_y: y,
        };

        let delta = (y - start_y).max(0.0);
        let viewport = surface.viewport();
        let opacity = (1.0 - delta / viewport.height).max(self.config.min_backdrop_opacity);

        surface.set_transform(self.transform(viewport, delta));
        surface.set_backdrop_opacity(opacity);
    }

    fn release<S: SheetSurface>(&mut self, surface: &mut S) -> Option<Release> {
        let GestureState::Dragging { start_y, current_y } = self.state else {
            return None;
        };

        self.state = GestureState::Settling;

        let delta = (current_y - start_y).max(0.0);
        let threshold = self.dismiss_threshold(surface.panel_height());

        surface.set_transition(Transition::Animated);

        if delta > threshold {
            debug!(delta, threshold, "Sheet dragged away");
            Some(Release::Dismissed)
        } else {
            trace!(delta, threshold, "Sheet snapped back");
            surface.set_transform(self.transform(surface.viewport(), 0.0));
            surface.set_backdrop_opacity(1.0);
            Some(Release::Restored)
        }
    }
}

use std::fmt;

use tracing::debug;

use crate::config::ViewportConfig;
use crate::geometry::Point2;

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewSize {
    pub width: f64,
    pub height: f64,
}

impl ViewSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Aspect-preserving fit of content into a container, centered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Letterbox {
    pub scale: f64,
    pub offset: Point2,
}

impl Letterbox {
    pub fn fit(container: ViewSize, content: ViewSize) -> Self {
        if !container.is_positive() || !content.is_positive() {
            return Self {
                scale: 1.0,
                offset: Point2::default(),
            };
        }
        let scale = (container.width / content.width).min(container.height / content.height);
        Self {
            scale,
            offset: Point2::new(
                (container.width - content.width * scale) / 2.0,
                (container.height - content.height * scale) / 2.0,
            ),
        }
    }

    /// Screen position -> content pixel position.
    pub fn to_content(&self, screen: Point2) -> Point2 {
        Point2::new(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    /// Content pixel position -> screen position.
    pub fn to_screen(&self, content: Point2) -> Point2 {
        Point2::new(
            content.x * self.scale + self.offset.x,
            content.y * self.scale + self.offset.y,
        )
    }
}

/// Zoom and pan over the rectified raster. Pan is in fit-space pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub scale: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

/// What a single-pointer gesture does on the measurement view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Measure,
    Pan,
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Measure => write!(f, "Measure"),
            Self::Pan => write!(f, "Pan"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Start,
    Move,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Point2,
}

impl PointerEvent {
    pub fn start(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Start,
            position: Point2::new(x, y),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::Move,
            position: Point2::new(x, y),
        }
    }

    pub fn end(x: f64, y: f64) -> Self {
        Self {
            phase: PointerPhase::End,
            position: Point2::new(x, y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Measuring { candidate: Point2 },
    Panning { last: Point2 },
}

/// Maps between screen pixels and normalized rectified coordinates and runs
/// the measure / pan gesture state machine.
#[derive(Clone, Debug)]
pub struct Viewport {
    container: ViewSize,
    raster: ViewSize,
    state: ViewportState,
    mode: InteractionMode,
    gesture: Gesture,
    min_scale: f64,
    max_scale: f64,
}

impl Viewport {
    pub fn new(container: ViewSize, raster: ViewSize, config: &ViewportConfig) -> Self {
        let min_scale = config.min_scale.max(f64::MIN_POSITIVE);
        Self {
            container,
            raster,
            state: ViewportState::default(),
            mode: InteractionMode::default(),
            gesture: Gesture::Idle,
            min_scale,
            max_scale: config.max_scale.max(min_scale),
        }
        .with_scale_clamped()
    }

    fn with_scale_clamped(mut self) -> Self {
        self.state.scale = self.state.scale.clamp(self.min_scale, self.max_scale);
        self
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn container(&self) -> ViewSize {
        self.container
    }

    pub fn raster_size(&self) -> ViewSize {
        self.raster
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switch modes. Any gesture in progress is abandoned without side effects.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.gesture = Gesture::Idle;
    }

    pub fn set_container(&mut self, container: ViewSize) {
        self.container = container;
        self.clamp_pan();
    }

    /// Track a rebuilt raster's pixel size. Zoom and pan are kept.
    pub fn set_raster_size(&mut self, raster: ViewSize) {
        self.raster = raster;
        self.clamp_pan();
    }

    pub fn letterbox(&self) -> Letterbox {
        Letterbox::fit(self.container, self.raster)
    }

    /// Live crosshair position of a measure gesture, if one is in progress.
    pub fn candidate(&self) -> Option<Point2> {
        match self.gesture {
            Gesture::Measuring { candidate } => Some(candidate),
            _ => None,
        }
    }

    /// Screen position -> normalized rectified coordinate, clamped to [0, 1].
    pub fn screen_to_normalized(&self, screen: Point2) -> Point2 {
        if !self.raster.is_positive() {
            return Point2::default();
        }
        let fit = self.letterbox().to_content(screen);
        let px = (fit.x - self.state.pan_x) / self.state.scale;
        let py = (fit.y - self.state.pan_y) / self.state.scale;
        Point2::new(px / self.raster.width, py / self.raster.height).clamp_unit()
    }

    /// Normalized rectified coordinate -> screen position.
    pub fn normalized_to_screen(&self, normalized: Point2) -> Point2 {
        let fit = Point2::new(
            normalized.x * self.raster.width * self.state.scale + self.state.pan_x,
            normalized.y * self.raster.height * self.state.scale + self.state.pan_y,
        );
        self.letterbox().to_screen(fit)
    }

    /// Set the zoom, keeping the raster point under the viewport center fixed.
    pub fn set_scale(&mut self, scale: f64) {
        if !scale.is_finite() {
            return;
        }
        let new_scale = scale.clamp(self.min_scale, self.max_scale);
        let old_scale = self.state.scale;
        let anchor = self.letterbox().to_content(Point2::new(
            self.container.width / 2.0,
            self.container.height / 2.0,
        ));
        let ratio = new_scale / old_scale;
        self.state.pan_x = anchor.x - (anchor.x - self.state.pan_x) * ratio;
        self.state.pan_y = anchor.y - (anchor.y - self.state.pan_y) * ratio;
        self.state.scale = new_scale;
        self.clamp_pan();
        debug!(scale = new_scale, "Viewport zoom changed");
    }

    /// Multiply the current zoom by `factor` (pinch / wheel step).
    pub fn zoom_by(&mut self, factor: f64) {
        self.set_scale(self.state.scale * factor);
    }

    /// Shift the pan offset, then clamp it.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.state.pan_x += dx;
        self.state.pan_y += dy;
        self.clamp_pan();
    }

    /// Back to scale 1 with no pan.
    pub fn reset_view(&mut self) {
        self.state = ViewportState::default();
        self.state.scale = self.state.scale.clamp(self.min_scale, self.max_scale);
    }

    /// Keep each axis within `[-extent/2 * scale, extent/2]`, where extent is
    /// the viewport size expressed in fit-space pixels.
    fn clamp_pan(&mut self) {
        let fit = self.letterbox().scale;
        let half_w = self.container.width / fit / 2.0;
        let half_h = self.container.height / fit / 2.0;
        self.state.pan_x = self.state.pan_x.clamp(-half_w * self.state.scale, half_w);
        self.state.pan_y = self.state.pan_y.clamp(-half_h * self.state.scale, half_h);
    }

    /// Feed one pointer event. Returns the normalized coordinate to commit as a
    /// marker when a measure gesture ends. Measure events are ignored while
    /// there is no raster to measure on.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<Point2> {
        match (self.mode, event.phase) {
            (InteractionMode::Measure, _) if !self.raster.is_positive() => {
                self.gesture = Gesture::Idle;
                None
            }
            (InteractionMode::Measure, PointerPhase::Start | PointerPhase::Move) => {
                if event.phase == PointerPhase::Move && self.gesture == Gesture::Idle {
                    return None;
                }
                let candidate = self.screen_to_normalized(event.position);
                self.gesture = Gesture::Measuring { candidate };
                None
            }
            (InteractionMode::Measure, PointerPhase::End) => match self.gesture {
                Gesture::Measuring { candidate } => {
                    self.gesture = Gesture::Idle;
                    Some(candidate)
                }
                _ => None,
            },
            (InteractionMode::Pan, PointerPhase::Start) => {
                self.gesture = Gesture::Panning {
                    last: event.position,
                };
                None
            }
            (InteractionMode::Pan, PointerPhase::Move) => {
                if let Gesture::Panning { last } = self.gesture {
                    let fit = self.letterbox().scale;
                    self.pan_by(
                        (event.position.x - last.x) / fit,
                        (event.position.y - last.y) / fit,
                    );
                    self.gesture = Gesture::Panning {
                        last: event.position,
                    };
                }
                None
            }
            (InteractionMode::Pan, PointerPhase::End) => {
                self.gesture = Gesture::Idle;
                None
            }
        }
    }
}

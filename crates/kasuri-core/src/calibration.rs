use crate::geometry::{CalibrationQuad, Corner, Point2};
use crate::viewport::{Letterbox, PointerEvent, PointerPhase, ViewSize};

/// Drag interaction for the calibration step.
///
/// The source photo is letterboxed into the container. Pointer-down grabs the
/// corner nearest to the pointer; moves relocate only that corner until
/// pointer-up.
#[derive(Clone, Debug)]
pub struct CalibrationEditor {
    container: ViewSize,
    image: ViewSize,
    active: Option<Corner>,
}

impl CalibrationEditor {
    pub fn new(container: ViewSize, image: ViewSize) -> Self {
        Self {
            container,
            image,
            active: None,
        }
    }

    pub fn set_container(&mut self, container: ViewSize) {
        self.container = container;
    }

    /// Corner currently being dragged.
    pub fn active_corner(&self) -> Option<Corner> {
        self.active
    }

    /// Screen position -> normalized source-image coordinate (not clamped).
    pub fn screen_to_image(&self, screen: Point2) -> Point2 {
        let p = Letterbox::fit(self.container, self.image).to_content(screen);
        Point2::new(p.x / self.image.width, p.y / self.image.height)
    }

    /// Normalized source-image coordinate -> screen position, for drawing handles.
    pub fn image_to_screen(&self, normalized: Point2) -> Point2 {
        Letterbox::fit(self.container, self.image).to_screen(Point2::new(
            normalized.x * self.image.width,
            normalized.y * self.image.height,
        ))
    }

    /// Apply one pointer event to `quad`. Returns `true` if a corner moved.
    pub fn handle_pointer(&mut self, quad: &mut CalibrationQuad, event: PointerEvent) -> bool {
        let target = self.screen_to_image(event.position);
        match event.phase {
            PointerPhase::Start => {
                let corner = quad.nearest_corner(target);
                self.active = Some(corner);
                relocate(quad, corner, target)
            }
            PointerPhase::Move => match self.active {
                Some(corner) => relocate(quad, corner, target),
                None => false,
            },
            PointerPhase::End => {
                self.active = None;
                false
            }
        }
    }
}

fn relocate(quad: &mut CalibrationQuad, corner: Corner, target: Point2) -> bool {
    let before = quad.corner(corner);
    quad.set_corner(corner, target);
    quad.corner(corner) != before
}

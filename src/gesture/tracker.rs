use crate::{
    config::ZoomConfig,
    foundation::core::{Point, Vec2},
    gesture::input::InputEvent,
    transform::photo::PhotoTransform,
};

/// Pinches that start with contacts closer than this never scale.
const MIN_PINCH_DISTANCE: f64 = 1e-6;

/// The active interaction, if any. Modes are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureMode {
    #[default]
    Idle,
    /// Single contact. `anchor` is the display position at gesture start, `origin` the offset
    /// the photo had then.
    Dragging { anchor: Point, origin: Vec2 },
    /// Two contacts. Scale follows the ratio of the current to the starting distance.
    Pinching { start_distance: f64, start_scale: f64 },
}

/// A transform update requested by a gesture; clamping happens when it is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum TransformOp {
    MoveTo(Vec2),
    ScaleTo(f64),
    /// Zoom by a factor around the canvas center.
    ZoomBy(f64),
}

/// Turns raw input events into transform operations.
#[derive(Debug, Default)]
pub struct GestureTracker {
    mode: GestureMode,
}

impl GestureTracker {
    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    pub fn reset(&mut self) {
        self.mode = GestureMode::Idle;
    }

    /// Feed one event. `ratio` converts display pixels to output pixels and must reflect the
    /// current display size.
    pub(crate) fn handle(
        &mut self,
        event: &InputEvent,
        current: &PhotoTransform,
        ratio: f64,
        zoom: &ZoomConfig,
    ) -> Option<TransformOp> {
        match event {
            InputEvent::MouseDown { x, y } => {
                self.start_drag(Point::new(*x, *y), current);
                None
            }
            InputEvent::MouseMove { x, y } => self.drag_to(Point::new(*x, *y), ratio),
            InputEvent::MouseUp | InputEvent::MouseLeave => {
                if matches!(self.mode, GestureMode::Dragging { .. }) {
                    self.mode = GestureMode::Idle;
                }
                None
            }
            InputEvent::TouchStart { touches } => {
                match touches.as_slice() {
                    [p] => self.start_drag(*p, current),
                    [a, b] => {
                        self.mode = GestureMode::Pinching {
                            start_distance: a.distance(*b),
                            start_scale: current.scale,
                        };
                        tracing::debug!(start_scale = current.scale, "pinch started");
                    }
                    _ => {}
                }
                None
            }
            InputEvent::TouchMove { touches } => match (touches.as_slice(), self.mode) {
                ([p], GestureMode::Dragging { .. }) => self.drag_to(*p, ratio),
                (
                    [a, b],
                    GestureMode::Pinching {
                        start_distance,
                        start_scale,
                    },
                ) => {
                    if start_distance < MIN_PINCH_DISTANCE {
                        return None;
                    }
                    Some(TransformOp::ScaleTo(
                        start_scale * (a.distance(*b) / start_distance),
                    ))
                }
                _ => None,
            },
            InputEvent::TouchEnd => {
                self.mode = GestureMode::Idle;
                None
            }
            InputEvent::Wheel { delta_y } => Some(TransformOp::ZoomBy(if *delta_y > 0.0 {
                zoom.wheel_out
            } else {
                zoom.wheel_in
            })),
        }
    }

    fn start_drag(&mut self, anchor: Point, current: &PhotoTransform) {
        self.mode = GestureMode::Dragging {
            anchor,
            origin: current.offset,
        };
    }

    fn drag_to(&self, p: Point, ratio: f64) -> Option<TransformOp> {
        let GestureMode::Dragging { anchor, origin } = self.mode else {
            return None;
        };
        Some(TransformOp::MoveTo(origin + (p - anchor) * ratio))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gesture/tracker.rs"]
mod tests;

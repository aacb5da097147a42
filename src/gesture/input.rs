use crate::foundation::core::Point;

/// A pointer, touch or wheel event in display coordinates.
///
/// Touch events carry every active contact, mirroring platform touch lists.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    MouseDown { x: f64, y: f64 },
    MouseMove { x: f64, y: f64 },
    MouseUp,
    MouseLeave,
    TouchStart { touches: Vec<Point> },
    TouchMove { touches: Vec<Point> },
    TouchEnd,
    /// Positive `delta_y` scrolls down (zoom out).
    Wheel { delta_y: f64 },
}

impl InputEvent {
    pub fn is_touch(&self) -> bool {
        matches!(
            self,
            Self::TouchStart { .. } | Self::TouchMove { .. } | Self::TouchEnd
        )
    }

    pub fn is_wheel(&self) -> bool {
        matches!(self, Self::Wheel { .. })
    }
}

/// What the engine did with an input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputResponse {
    /// The host should suppress the platform's default gesture (scroll, page zoom).
    pub prevent_default: bool,
    /// The photo transform changed and a redraw was requested.
    pub transform_changed: bool,
}

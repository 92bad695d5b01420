// gesture.rs — 屏幕手势输入 (平移 / 捏合 / 旋转)

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

impl GesturePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, GesturePhase::Ended | GesturePhase::Cancelled)
    }
}

/// A gesture recognizer update in screen points. Values are cumulative since
/// the gesture began, the navigator turns them into deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Pan { translation: Vec2, phase: GesturePhase },
    Pinch { scale: f32, touches: usize, phase: GesturePhase },
    /// `angle` in radians, positive clockwise on screen.
    Rotate { angle: f32, phase: GesturePhase },
}

impl GestureEvent {
    pub fn phase(&self) -> GesturePhase {
        match *self {
            GestureEvent::Pan { phase, .. }
            | GestureEvent::Pinch { phase, .. }
            | GestureEvent::Rotate { phase, .. } => phase,
        }
    }
}

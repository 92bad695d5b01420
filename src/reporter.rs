// reporter.rs — 航向 / 视场角输出给罗盘和回调

use std::rc::Rc;

/// Receives the heading readout, e.g. a compass indicator.
pub trait PanoramaCompass {
    fn update_ui(&self, rotation_angle: f32, field_of_view_angle: f32);
}

impl<T: PanoramaCompass + ?Sized> PanoramaCompass for Rc<T> {
    fn update_ui(&self, rotation_angle: f32, field_of_view_angle: f32) {
        (**self).update_ui(rotation_angle, field_of_view_angle)
    }
}

pub type MovementHandler = Box<dyn FnMut(f32, f32)>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingReport {
    pub rotation_angle: f32,
    /// Horizontal angular width of the view, radians.
    pub field_of_view_angle: f32,
}

impl HeadingReport {
    /// `vertical_fov` in degrees; the viewport aspect widens it to the
    /// horizontal extent. A zero-height viewport counts as square.
    pub fn new(yaw: f32, vertical_fov: f32, viewport: (f32, f32)) -> Self {
        let (width, height) = viewport;
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        Self {
            rotation_angle: -yaw,
            field_of_view_angle: (vertical_fov * aspect).to_radians(),
        }
    }
}

#[derive(Default)]
pub struct HeadingReporter {
    compass: Option<Box<dyn PanoramaCompass>>,
    movement_handler: Option<MovementHandler>,
    last: Option<HeadingReport>,
}

impl HeadingReporter {
    pub fn set_compass(&mut self, compass: Option<Box<dyn PanoramaCompass>>) {
        self.compass = compass;
        if let (Some(c), Some(r)) = (&self.compass, self.last) {
            c.update_ui(r.rotation_angle, r.field_of_view_angle);
        }
    }

    pub fn set_movement_handler(&mut self, handler: Option<MovementHandler>) {
        self.movement_handler = handler;
    }

    /// Forwards to the compass and, for user-driven movement, to the handler.
    pub fn report(&mut self, report: HeadingReport, call_handler: bool) {
        self.last = Some(report);
        if let Some(compass) = &self.compass {
            compass.update_ui(report.rotation_angle, report.field_of_view_angle);
        }
        if call_handler {
            if let Some(handler) = self.movement_handler.as_mut() {
                handler(report.rotation_angle, report.field_of_view_angle);
            }
        }
    }
}

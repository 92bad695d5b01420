// compass.rs — 扇形罗盘指示器
// 扇形宽度 = 水平视场角，整体按航向旋转；扇形中线默认朝上

use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke};
use std::cell::Cell;
use std::f32::consts::FRAC_PI_2;

use crate::reporter::PanoramaCompass;

pub struct CompassDial {
    slice_angle: Cell<f32>,
    rotation: Cell<f32>,
    pub slice_color: Color32,
    pub outer_ring_color: Color32,
    pub background_color: Color32,
}

impl Default for CompassDial {
    fn default() -> Self {
        Self {
            slice_angle: Cell::new(FRAC_PI_2),
            rotation: Cell::new(0.0),
            slice_color: Color32::RED,
            outer_ring_color: Color32::GREEN,
            background_color: Color32::BLACK,
        }
    }
}

impl CompassDial {
    pub fn slice_angle(&self) -> f32 {
        self.slice_angle.get()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation.get()
    }

    pub fn paint(&self, painter: &Painter, rect: Rect) {
        let center = rect.center();
        let size = rect.width().min(rect.height());

        painter.circle_filled(center, size / 2.0, self.background_color);
        painter.circle_stroke(center, size / 2.0 - 2.0, Stroke::new(2.0, self.outer_ring_color));

        let outline = slice_outline(center, size / 2.0 - 6.0, self.rotation(), self.slice_angle(), 48);
        // 扇形可能超过 180°，拆成三角扇逐个画
        for pair in outline[1..].windows(2) {
            painter.add(Shape::convex_polygon(
                vec![center, pair[0], pair[1]],
                self.slice_color,
                Stroke::NONE,
            ));
        }
    }
}

impl PanoramaCompass for CompassDial {
    fn update_ui(&self, rotation_angle: f32, field_of_view_angle: f32) {
        self.slice_angle.set(field_of_view_angle);
        self.rotation.set(rotation_angle);
    }
}

/// Centre followed by the arc points of a pie slice in screen space (y down,
/// angles clockwise), centred on "up" before `rotation` is applied.
pub fn slice_outline(center: Pos2, radius: f32, rotation: f32, slice: f32, steps: usize) -> Vec<Pos2> {
    let steps = steps.max(1);
    let start = -(FRAC_PI_2 + slice / 2.0) + rotation;

    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let a = start + slice * (i as f32) / (steps as f32);
        points.push(Pos2::new(center.x + radius * a.cos(), center.y + radius * a.sin()));
    }
    points
}

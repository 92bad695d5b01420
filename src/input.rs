// input.rs — 桌面输入 → 手势事件
//
// 鼠标左键拖动         -> 平移
// 滚轮 / 触控板缩放     -> 双指捏合
// 触控板旋转           -> 旋转
// 触摸屏：1 指平移，2 指捏合 + 旋转，3 指以上按实际触点数上报捏合

use glam::Vec2;
use panorama_view::{GestureEvent, GesturePhase};
use std::collections::BTreeMap;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

const WHEEL_STEP: f32 = 0.1;

#[derive(Debug, Default)]
pub struct GestureRecognizer {
    cursor: Vec2,
    drag_origin: Option<Vec2>,
    magnify: f32,
    twist: f32,
    touches: BTreeMap<u64, Vec2>,
    touch_pan_origin: Option<Vec2>,
    // 双指开始时的距离与角度
    pair_start: Option<(f32, f32)>,
}

fn phase_of(phase: TouchPhase) -> GesturePhase {
    match phase {
        TouchPhase::Started => GesturePhase::Began,
        TouchPhase::Moved => GesturePhase::Changed,
        TouchPhase::Ended => GesturePhase::Ended,
        TouchPhase::Cancelled => GesturePhase::Cancelled,
    }
}

fn pinch(scale: f32, touches: usize, phase: GesturePhase) -> GestureEvent {
    GestureEvent::Pinch { scale, touches, phase }
}

impl GestureRecognizer {
    pub fn on_window_event(&mut self, event: &WindowEvent) -> Vec<GestureEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.drag_moved()
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.drag_button(*state == ElementState::Pressed),
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                };
                self.wheel(steps)
            }
            WindowEvent::TouchpadMagnify { delta, phase, .. } => self.magnify(*delta as f32, phase_of(*phase)),
            WindowEvent::TouchpadRotate { delta, phase, .. } => self.twist(*delta, phase_of(*phase)),
            WindowEvent::Touch(t) => self.touch(
                t.id,
                Vec2::new(t.location.x as f32, t.location.y as f32),
                t.phase,
            ),
            _ => Vec::new(),
        }
    }

    fn drag_button(&mut self, pressed: bool) -> Vec<GestureEvent> {
        if pressed {
            self.drag_origin = Some(self.cursor);
            vec![GestureEvent::Pan {
                translation: Vec2::ZERO,
                phase: GesturePhase::Began,
            }]
        } else if let Some(origin) = self.drag_origin.take() {
            vec![GestureEvent::Pan {
                translation: self.cursor - origin,
                phase: GesturePhase::Ended,
            }]
        } else {
            Vec::new()
        }
    }

    fn drag_moved(&mut self) -> Vec<GestureEvent> {
        match self.drag_origin {
            Some(origin) => vec![GestureEvent::Pan {
                translation: self.cursor - origin,
                phase: GesturePhase::Changed,
            }],
            None => Vec::new(),
        }
    }

    /// One wheel notch is a complete pinch; scrolling up zooms in.
    fn wheel(&mut self, steps: f32) -> Vec<GestureEvent> {
        if steps == 0.0 {
            return Vec::new();
        }
        let scale = (1.0 + WHEEL_STEP).powf(steps);
        vec![
            pinch(1.0, 2, GesturePhase::Began),
            pinch(scale, 2, GesturePhase::Changed),
            pinch(scale, 2, GesturePhase::Ended),
        ]
    }

    fn magnify(&mut self, delta: f32, phase: GesturePhase) -> Vec<GestureEvent> {
        match phase {
            GesturePhase::Began => self.magnify = 1.0,
            _ => self.magnify *= 1.0 + delta,
        }
        vec![pinch(self.magnify, 2, phase)]
    }

    /// Touchpad deltas are degrees counter-clockwise.
    fn twist(&mut self, delta: f32, phase: GesturePhase) -> Vec<GestureEvent> {
        match phase {
            GesturePhase::Began => self.twist = 0.0,
            _ => self.twist -= delta.to_radians(),
        }
        vec![GestureEvent::Rotate {
            angle: self.twist,
            phase,
        }]
    }

    fn touch(&mut self, id: u64, at: Vec2, phase: TouchPhase) -> Vec<GestureEvent> {
        let before = self.touches.len();
        match phase {
            TouchPhase::Started | TouchPhase::Moved => {
                self.touches.insert(id, at);
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.remove(&id);
            }
        }
        let after = self.touches.len();

        let mut out = Vec::new();
        if before != after {
            out.extend(self.end_touch_gestures(before));
            out.extend(self.begin_touch_gestures(after));
        } else {
            out.extend(self.update_touch_gestures(after));
        }
        out
    }

    fn centroid(&self) -> Vec2 {
        let n = self.touches.len().max(1) as f32;
        self.touches.values().copied().sum::<Vec2>() / n
    }

    fn pair(&self) -> Option<(f32, f32)> {
        let mut it = self.touches.values();
        let (a, b) = (it.next()?, it.next()?);
        let d = *b - *a;
        Some((d.length(), d.y.atan2(d.x)))
    }

    fn begin_touch_gestures(&mut self, count: usize) -> Vec<GestureEvent> {
        match count {
            0 => Vec::new(),
            1 => {
                self.touch_pan_origin = Some(self.centroid());
                vec![GestureEvent::Pan {
                    translation: Vec2::ZERO,
                    phase: GesturePhase::Began,
                }]
            }
            _ => {
                self.pair_start = self.pair();
                let mut out = vec![pinch(1.0, count, GesturePhase::Began)];
                if count == 2 {
                    out.push(GestureEvent::Rotate {
                        angle: 0.0,
                        phase: GesturePhase::Began,
                    });
                }
                out
            }
        }
    }

    fn update_touch_gestures(&mut self, count: usize) -> Vec<GestureEvent> {
        match count {
            0 => Vec::new(),
            1 => match self.touch_pan_origin {
                Some(origin) => vec![GestureEvent::Pan {
                    translation: self.centroid() - origin,
                    phase: GesturePhase::Changed,
                }],
                None => Vec::new(),
            },
            _ => {
                let (Some((d0, a0)), Some((d, a))) = (self.pair_start, self.pair()) else {
                    return Vec::new();
                };
                let scale = if d0 > 0.0 { d / d0 } else { 1.0 };
                let mut out = vec![pinch(scale, count, GesturePhase::Changed)];
                if count == 2 {
                    out.push(GestureEvent::Rotate {
                        angle: a - a0,
                        phase: GesturePhase::Changed,
                    });
                }
                out
            }
        }
    }

    fn end_touch_gestures(&mut self, count: usize) -> Vec<GestureEvent> {
        match count {
            0 => Vec::new(),
            1 => {
                self.touch_pan_origin = None;
                vec![GestureEvent::Pan {
                    translation: Vec2::ZERO,
                    phase: GesturePhase::Ended,
                }]
            }
            _ => {
                self.pair_start = None;
                let mut out = vec![pinch(1.0, count, GesturePhase::Ended)];
                if count == 2 {
                    out.push(GestureEvent::Rotate {
                        angle: 0.0,
                        phase: GesturePhase::Ended,
                    });
                }
                out
            }
        }
    }
}

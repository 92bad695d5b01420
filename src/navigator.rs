// navigator.rs — 相机朝向状态机
//
// 唯一的写入者：手势、传感器样本、控制方式切换都以 NavigationEvent 的形式
// 按顺序进入 handle()，不需要锁。

use glam::{Quat, Vec2, Vec3};
use log::{debug, trace, warn};

use crate::attitude::{SceneAttitude, ScreenOrientation};
use crate::error::SensorError;
use crate::gesture::{GestureEvent, GesturePhase};
use crate::orientation::{CameraOrientation, EulerAngles, GestureOffset};
use crate::panorama::{ControlMethod, PanoramaSettings, ProjectionMode};
use crate::reporter::{HeadingReport, HeadingReporter, MovementHandler, PanoramaCompass};

/// Start/stop switch for the device-attitude source.
pub trait MotionControl {
    fn is_available(&self) -> bool;
    fn is_active(&self) -> bool;
    /// Idempotent.
    fn start(&mut self);
    /// Idempotent.
    fn stop(&mut self);
    /// Id of the most recent sampling run; advances on every real start.
    fn session(&self) -> u64;
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    Gesture(GestureEvent),
    /// Sample from sampling run `session`.
    Attitude { session: u64, attitude: SceneAttitude },
    SensorFailed { session: u64, error: SensorError },
    SetControlMethod(ControlMethod),
    SetProjectionMode(ProjectionMode),
    Resize { width: f32, height: f32 },
}

pub struct PanoramaNavigator {
    settings: PanoramaSettings,
    projection: ProjectionMode,
    control: ControlMethod,
    orientation: CameraOrientation,
    fov: f32,
    offset: GestureOffset,
    viewport: (f32, f32),

    // 手势状态，仅 UI 线程
    prev_location: Vec2,
    pinch_base: Option<f32>,
    prev_rotation: f32,
    rotating: bool,

    last_attitude: Option<SceneAttitude>,
    sensor_failed: bool,
    motion: Box<dyn MotionControl>,
    reporter: HeadingReporter,
}

impl PanoramaNavigator {
    /// Starts in touch control with a cylindrical projection.
    pub fn new(settings: PanoramaSettings, motion: Box<dyn MotionControl>) -> Self {
        let mut nav = Self {
            settings,
            projection: ProjectionMode::Cylindrical,
            control: ControlMethod::Touch,
            orientation: CameraOrientation::initial(ProjectionMode::Cylindrical, settings.start_angle),
            fov: settings.clamp_fov(settings.default_fov),
            offset: GestureOffset::default(),
            viewport: (1.0, 1.0),
            prev_location: Vec2::ZERO,
            pinch_base: None,
            prev_rotation: 0.0,
            rotating: false,
            last_attitude: None,
            sensor_failed: false,
            motion,
            reporter: HeadingReporter::default(),
        };
        nav.set_control_method(ControlMethod::Touch);
        nav
    }

    pub fn settings(&self) -> &PanoramaSettings {
        &self.settings
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.projection
    }

    pub fn control_method(&self) -> ControlMethod {
        self.control
    }

    pub fn orientation(&self) -> CameraOrientation {
        self.orientation
    }

    /// Vertical field of view in degrees.
    pub fn field_of_view(&self) -> f32 {
        self.fov
    }

    pub fn gesture_offset(&self) -> GestureOffset {
        self.offset
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    /// True while a rotate gesture holds back sensor updates.
    pub fn is_sensor_paused(&self) -> bool {
        self.rotating
    }

    pub fn is_motion_active(&self) -> bool {
        self.motion.is_active()
    }

    pub fn heading_report(&self) -> HeadingReport {
        HeadingReport::new(self.orientation.yaw(), self.fov, self.viewport)
    }

    pub fn set_compass(&mut self, compass: Option<Box<dyn PanoramaCompass>>) {
        self.reporter.set_compass(compass);
    }

    pub fn set_movement_handler(&mut self, handler: Option<MovementHandler>) {
        self.reporter.set_movement_handler(handler);
    }

    pub fn handle(&mut self, event: NavigationEvent) {
        match event {
            NavigationEvent::Gesture(g) => self.apply_gesture(g),
            NavigationEvent::Attitude { session, attitude } => {
                if self.is_current_session(session) {
                    self.apply_scene_attitude(attitude);
                }
            }
            NavigationEvent::SensorFailed { session, error } => {
                if self.is_current_session(session) {
                    self.halt_motion(error);
                }
            }
            NavigationEvent::SetControlMethod(m) => self.set_control_method(m),
            NavigationEvent::SetProjectionMode(p) => self.set_projection_mode(p),
            NavigationEvent::Resize { width, height } => self.set_viewport(width, height),
        }
    }

    /// Events queued by a sampler run that has since been restarted are stale.
    fn is_current_session(&self, session: u64) -> bool {
        let current = self.motion.session();
        if session != current {
            trace!("dropping sensor event from session {session}, current {current}");
        }
        session == current
    }

    /// Tears down the active input sources, brings up the ones `method`
    /// needs, then resets the camera.
    pub fn set_control_method(&mut self, method: ControlMethod) {
        debug!("control method -> {method}");
        self.control = method;
        self.prev_location = Vec2::ZERO;
        self.pinch_base = None;
        self.rotating = false;
        self.last_attitude = None;
        self.sensor_failed = false;

        self.motion.stop();
        if method.uses_motion() {
            if self.motion.is_available() {
                self.motion.start();
            } else {
                warn!("device motion unavailable, {method} control will not follow the device");
            }
        }
        self.reset_camera_angles();
    }

    /// Changing the projection rebuilds geometry on the host side; here it
    /// switches the orientation representation and resets.
    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        debug!("projection -> {mode}");
        self.projection = mode;
        self.reset_camera_angles();
    }

    pub fn reset_camera_angles(&mut self) {
        self.orientation = CameraOrientation::initial(self.projection, self.settings.start_angle);
        self.offset = GestureOffset::default();
        self.report(false);
    }

    /// Layout change. Re-reports to the compass only when the size differs.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if (width, height) == self.viewport {
            return;
        }
        self.viewport = (width, height);
        self.report(false);
    }

    pub fn apply_gesture(&mut self, gesture: GestureEvent) {
        if !self.control.uses_gestures() {
            trace!("{:?} gesture ignored under {} control", gesture.phase(), self.control);
            return;
        }
        match gesture {
            GestureEvent::Pan { translation, phase } => self.apply_pan(translation, phase),
            GestureEvent::Pinch { scale, touches, phase } => self.apply_pinch(scale, touches, phase),
            GestureEvent::Rotate { angle, phase } => self.apply_rotate(angle, phase),
        }
    }

    fn apply_pan(&mut self, translation: Vec2, phase: GesturePhase) {
        match phase {
            GesturePhase::Began => self.prev_location = Vec2::ZERO,
            GesturePhase::Changed => {
                let (width, height) = self.viewport;
                if width <= 0.0 || height <= 0.0 {
                    return;
                }
                let delta = translation - self.prev_location;
                self.prev_location = translation;

                let (dyaw, mut dpitch) = self.settings.pan_angles(delta.x, delta.y, width, height);
                if self.projection == ProjectionMode::Cylindrical {
                    dpitch = 0.0; // 圆柱全景不允许上下看
                }

                if self.control == ControlMethod::Combined {
                    self.offset.total_x += dpitch;
                    self.offset.total_y += dyaw;
                    self.orientation = self.compose_with_sensor();
                } else {
                    self.orientation = self.panned(dyaw, dpitch);
                }
                self.report(true);
            }
            GesturePhase::Ended | GesturePhase::Cancelled => {}
        }
    }

    fn panned(&self, dyaw: f32, dpitch: f32) -> CameraOrientation {
        let limit = self.settings.pitch_limit;
        match self.orientation.for_mode(self.projection) {
            CameraOrientation::Euler(mut e) => {
                e.yaw += dyaw;
                e.pitch = (e.pitch + dpitch).clamp(-limit, limit);
                CameraOrientation::Euler(e)
            }
            CameraOrientation::Quaternion(q) => {
                // 增量先限制在 ±limit 内，不越过竖直方向
                let current = EulerAngles::from_quat(q).pitch;
                let dpitch = (current + dpitch).clamp(-limit, limit) - current;
                let q = (Quat::from_rotation_y(dyaw) * q * Quat::from_rotation_x(dpitch)).normalize();
                let mut e = EulerAngles::from_quat(q);
                if e.pitch.abs() > limit {
                    e.pitch = e.pitch.clamp(-limit, limit);
                    CameraOrientation::Quaternion(e.to_quat())
                } else {
                    CameraOrientation::Quaternion(q)
                }
            }
        }
    }

    fn apply_pinch(&mut self, scale: f32, touches: usize, phase: GesturePhase) {
        if touches != 2 {
            // 第三根手指抬起时也要结束捏合
            if phase.is_finished() {
                self.pinch_base = None;
            }
            trace!("pinch with {touches} touches ignored");
            return;
        }
        match phase {
            GesturePhase::Began => self.pinch_base = Some(self.fov),
            GesturePhase::Changed => {
                let Some(base) = self.pinch_base else {
                    return;
                };
                let scale = 1.0 + (scale - 1.0) * self.settings.pinch_speed;
                if !scale.is_finite() || scale <= 0.0 {
                    return;
                }
                self.fov = self.settings.clamp_fov(base / scale);
                self.report(true);
            }
            GesturePhase::Ended | GesturePhase::Cancelled => self.pinch_base = None,
        }
    }

    fn apply_rotate(&mut self, angle: f32, phase: GesturePhase) {
        if self.projection == ProjectionMode::Cylindrical {
            return;
        }
        match phase {
            GesturePhase::Began => {
                self.prev_rotation = 0.0;
                self.rotating = true;
            }
            GesturePhase::Changed => {
                let delta = angle - self.prev_rotation;
                self.prev_rotation = angle;
                let q = self.orientation.rotation() * Quat::from_axis_angle(Vec3::NEG_Z, delta);
                self.orientation = CameraOrientation::Quaternion(q.normalize());
                self.report(true);
            }
            GesturePhase::Ended | GesturePhase::Cancelled => self.rotating = false,
        }
    }

    /// Converts a raw device attitude and applies it.
    pub fn apply_attitude_sample(&mut self, device: Quat, screen: ScreenOrientation) {
        self.apply_scene_attitude(SceneAttitude::from_device(device, screen));
    }

    pub fn apply_scene_attitude(&mut self, attitude: SceneAttitude) {
        if !self.control.uses_motion() || self.sensor_failed || self.rotating {
            return;
        }
        self.last_attitude = Some(attitude);
        self.orientation = self.compose_with_sensor();
        self.report(true);
    }

    fn halt_motion(&mut self, error: SensorError) {
        warn!("stopping device motion updates: {error}");
        self.sensor_failed = true;
        self.motion.stop();
    }

    // 传感器姿态 + 起始角 + (Combined 时) 手势偏移
    fn compose_with_sensor(&self) -> CameraOrientation {
        let start = self.settings.start_angle;
        match self.projection {
            ProjectionMode::Cylindrical => {
                let heading = self.last_attitude.map_or(0.0, |a| a.heading);
                CameraOrientation::Euler(EulerAngles::yaw_only(start - heading + self.offset.total_y))
            }
            ProjectionMode::Spherical => {
                let base = self.last_attitude.map_or(Quat::IDENTITY, |a| a.rotation);
                // 先绕相机自身 X 轴，再绕世界 Y 轴
                let local = base * Quat::from_rotation_x(self.offset.total_x);
                let q = Quat::from_rotation_y(start + self.offset.total_y) * local;
                CameraOrientation::Quaternion(q.normalize())
            }
        }
    }

    fn report(&mut self, call_handler: bool) {
        let report = self.heading_report();
        self.reporter.report(report, call_handler);
    }
}

impl Drop for PanoramaNavigator {
    fn drop(&mut self) {
        self.motion.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::f32::consts::{FRAC_PI_2, PI};
    use std::rc::Rc;

    const EPSILON: f32 = 1e-5;

    #[derive(Default)]
    struct MotionLog {
        available: bool,
        active: Cell<bool>,
        starts: Cell<usize>,
        stops: Cell<usize>,
    }

    impl MotionLog {
        fn session(&self) -> u64 {
            self.starts.get() as u64
        }
    }

    struct FakeMotion(Rc<MotionLog>);

    impl MotionControl for FakeMotion {
        fn is_available(&self) -> bool {
            self.0.available
        }
        fn is_active(&self) -> bool {
            self.0.active.get()
        }
        fn start(&mut self) {
            self.0.starts.set(self.0.starts.get() + 1);
            self.0.active.set(true);
        }
        fn stop(&mut self) {
            self.0.stops.set(self.0.stops.get() + 1);
            self.0.active.set(false);
        }
        fn session(&self) -> u64 {
            self.0.session()
        }
    }

    #[derive(Default)]
    struct Needle(RefCell<Vec<(f32, f32)>>);

    impl PanoramaCompass for Needle {
        fn update_ui(&self, rotation_angle: f32, field_of_view_angle: f32) {
            self.0.borrow_mut().push((rotation_angle, field_of_view_angle));
        }
    }

    fn navigator(available: bool) -> (PanoramaNavigator, Rc<MotionLog>) {
        let log = Rc::new(MotionLog {
            available,
            ..Default::default()
        });
        let mut nav = PanoramaNavigator::new(PanoramaSettings::default(), Box::new(FakeMotion(log.clone())));
        nav.set_viewport(400.0, 300.0);
        (nav, log)
    }

    fn pan(nav: &mut PanoramaNavigator, path: &[(f32, f32)]) {
        nav.handle(NavigationEvent::Gesture(GestureEvent::Pan {
            translation: Vec2::ZERO,
            phase: GesturePhase::Began,
        }));
        for &(x, y) in path {
            nav.handle(NavigationEvent::Gesture(GestureEvent::Pan {
                translation: Vec2::new(x, y),
                phase: GesturePhase::Changed,
            }));
        }
        nav.handle(NavigationEvent::Gesture(GestureEvent::Pan {
            translation: path.last().map_or(Vec2::ZERO, |&(x, y)| Vec2::new(x, y)),
            phase: GesturePhase::Ended,
        }));
    }

    fn pinch(nav: &mut PanoramaNavigator, touches: usize, scales: &[f32]) {
        let mut send = |scale, phase| {
            nav.handle(NavigationEvent::Gesture(GestureEvent::Pinch { scale, touches, phase }));
        };
        send(1.0, GesturePhase::Began);
        for &s in scales {
            send(s, GesturePhase::Changed);
        }
        send(scales.last().copied().unwrap_or(1.0), GesturePhase::Ended);
    }

    fn rotate(nav: &mut PanoramaNavigator, angles: &[f32]) {
        nav.apply_gesture(GestureEvent::Rotate {
            angle: 0.0,
            phase: GesturePhase::Began,
        });
        for &a in angles {
            nav.apply_gesture(GestureEvent::Rotate {
                angle: a,
                phase: GesturePhase::Changed,
            });
        }
        nav.apply_gesture(GestureEvent::Rotate {
            angle: angles.last().copied().unwrap_or(0.0),
            phase: GesturePhase::Ended,
        });
    }

    /// Delivers `attitude` as the running sampler would.
    fn deliver(nav: &mut PanoramaNavigator, attitude: SceneAttitude) {
        let session = nav.motion.session();
        nav.handle(NavigationEvent::Attitude { session, attitude });
    }

    fn fail(nav: &mut PanoramaNavigator) {
        let session = nav.motion.session();
        nav.handle(NavigationEvent::SensorFailed {
            session,
            error: SensorError::ReadFailed("gone".into()),
        });
    }

    fn upright_turned(heading: f32) -> SceneAttitude {
        SceneAttitude::from_device(
            Quat::from_rotation_z(heading) * Quat::from_rotation_x(FRAC_PI_2),
            ScreenOrientation::Portrait,
        )
    }

    #[test]
    fn touch_pan_right_scenario() {
        let (mut nav, _) = navigator(false);
        pan(&mut nav, &[(40.0, 0.0), (100.0, 0.0)]);

        let expected = 100.0 * 0.4 / 400.0 * 2.0 * PI;
        assert!((nav.orientation().yaw() - expected).abs() < EPSILON);
        assert_eq!(nav.orientation().pitch(), 0.0);
    }

    #[test]
    fn cylindrical_pans_never_touch_pitch_or_roll() {
        let (mut nav, _) = navigator(false);
        pan(&mut nav, &[(10.0, 80.0), (-30.0, 200.0), (5.0, -400.0)]);
        pan(&mut nav, &[(0.0, 1000.0)]);

        match nav.orientation() {
            CameraOrientation::Euler(e) => {
                assert_eq!(e.pitch, 0.0);
                assert_eq!(e.roll, 0.0);
                let expected = 5.0 * 0.4 / 400.0 * 2.0 * PI;
                assert!((e.yaw - expected).abs() < EPSILON);
            }
            other => panic!("cylindrical orientation must stay euler, got {other:?}"),
        }
    }

    #[test]
    fn touch_pan_clamps_pitch_in_spherical() {
        let (mut nav, _) = navigator(false);
        nav.set_projection_mode(ProjectionMode::Spherical);
        // 300pt 向下 => 0.4π 每步
        pan(&mut nav, &[(0.0, 300.0), (0.0, 600.0), (0.0, 900.0)]);
        assert!((nav.orientation().pitch() - 1.1).abs() < 1e-4);
        assert!(matches!(nav.orientation(), CameraOrientation::Quaternion(_)));
    }

    #[test]
    fn combined_pan_does_not_clamp_pitch() {
        let (mut nav, _) = navigator(true);
        nav.set_projection_mode(ProjectionMode::Spherical);
        nav.set_control_method(ControlMethod::Combined);
        pan(&mut nav, &[(0.0, 150.0)]);
        pan(&mut nav, &[(0.0, 150.0)]);
        pan(&mut nav, &[(0.0, 150.0)]);
        assert!((nav.gesture_offset().total_x - 0.6 * PI).abs() < EPSILON);
        assert!(nav.orientation().pitch().abs() > 1.1);
    }

    #[test]
    fn pinch_scales_field_of_view() {
        let (mut nav, _) = navigator(false);
        nav.fov = 80.0;
        pinch(&mut nav, 2, &[1.5, 2.0]);
        assert!((nav.field_of_view() - 40.0).abs() < EPSILON);
    }

    #[test]
    fn pinch_needs_exactly_two_touches() {
        let (mut nav, _) = navigator(false);
        let before = nav.field_of_view();
        pinch(&mut nav, 1, &[2.0]);
        pinch(&mut nav, 3, &[0.5]);
        pinch(&mut nav, 0, &[4.0]);
        assert_eq!(nav.field_of_view(), before);
    }

    #[test]
    fn pinch_stays_within_bounds() {
        let (mut nav, _) = navigator(false);
        for scale in [0.01, 0.3, 0.9, 1.0, 1.7, 5.0, 100.0, -2.0, f32::NAN] {
            pinch(&mut nav, 2, &[scale]);
            let fov = nav.field_of_view();
            assert!((20.0..=100.0).contains(&fov), "fov {fov} after scale {scale}");
        }
    }

    #[test]
    fn pinch_without_began_is_ignored() {
        let (mut nav, _) = navigator(false);
        let before = nav.field_of_view();
        nav.apply_gesture(GestureEvent::Pinch {
            scale: 2.0,
            touches: 2,
            phase: GesturePhase::Changed,
        });
        assert_eq!(nav.field_of_view(), before);
    }

    #[test]
    fn rotate_is_ignored_for_cylindrical() {
        let (mut nav, _) = navigator(false);
        let before = nav.orientation();
        rotate(&mut nav, &[0.3, 0.9]);
        assert_eq!(nav.orientation(), before);
        assert!(!nav.is_sensor_paused());
    }

    #[test]
    fn rotate_rolls_around_view_axis() {
        let (mut nav, _) = navigator(false);
        nav.set_projection_mode(ProjectionMode::Spherical);
        rotate(&mut nav, &[0.2, 0.5]);

        let q = nav.orientation().rotation();
        let forward = q * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Z).length() < EPSILON);
        assert!((nav.orientation().roll() + 0.5).abs() < EPSILON);
    }

    #[test]
    fn rotate_pauses_sensor_updates() {
        let (mut nav, _) = navigator(true);
        nav.set_projection_mode(ProjectionMode::Spherical);
        nav.set_control_method(ControlMethod::Combined);

        nav.apply_gesture(GestureEvent::Rotate {
            angle: 0.0,
            phase: GesturePhase::Began,
        });
        assert!(nav.is_sensor_paused());
        nav.apply_gesture(GestureEvent::Rotate {
            angle: 0.4,
            phase: GesturePhase::Changed,
        });
        let rolled = nav.orientation();
        deliver(&mut nav, upright_turned(1.0));
        assert_eq!(nav.orientation(), rolled);

        nav.apply_gesture(GestureEvent::Rotate {
            angle: 0.4,
            phase: GesturePhase::Ended,
        });
        assert!(!nav.is_sensor_paused());
        deliver(&mut nav, upright_turned(1.0));
        assert_ne!(nav.orientation(), rolled);
    }

    #[test]
    fn control_method_switch_resets_angles() {
        let (mut nav, _) = navigator(true);
        pan(&mut nav, &[(120.0, 0.0)]);
        assert!(nav.orientation().yaw() != 0.0);

        nav.set_control_method(ControlMethod::Motion);
        assert_eq!(nav.orientation(), CameraOrientation::Euler(EulerAngles::yaw_only(0.0)));

        deliver(&mut nav, upright_turned(0.7));
        assert!(nav.orientation().yaw() != 0.0);

        nav.set_control_method(ControlMethod::Touch);
        assert_eq!(nav.orientation(), CameraOrientation::Euler(EulerAngles::yaw_only(0.0)));
    }

    #[test]
    fn control_method_switch_clears_offsets() {
        let (mut nav, _) = navigator(true);
        nav.set_control_method(ControlMethod::Combined);
        pan(&mut nav, &[(50.0, 0.0)]);
        assert!(!nav.gesture_offset().is_zero());

        nav.set_control_method(ControlMethod::Combined);
        assert!(nav.gesture_offset().is_zero());
    }

    #[test]
    fn reset_returns_to_start_angle() {
        let settings = PanoramaSettings {
            start_angle: 0.6,
            ..Default::default()
        };
        let mut nav = PanoramaNavigator::new(settings, Box::new(FakeMotion(Rc::new(MotionLog::default()))));
        nav.set_viewport(400.0, 300.0);
        assert!((nav.orientation().yaw() - 0.6).abs() < EPSILON);

        pan(&mut nav, &[(77.0, 0.0)]);
        nav.reset_camera_angles();
        assert!((nav.orientation().yaw() - 0.6).abs() < EPSILON);

        nav.set_projection_mode(ProjectionMode::Spherical);
        assert!((nav.orientation().yaw() - 0.6).abs() < EPSILON);
        assert!(nav.orientation().pitch().abs() < EPSILON);
    }

    #[test]
    fn motion_source_follows_control_method() {
        let (mut nav, log) = navigator(true);
        assert!(!nav.is_motion_active());

        nav.set_control_method(ControlMethod::Motion);
        assert!(nav.is_motion_active());

        nav.set_control_method(ControlMethod::Combined);
        assert!(nav.is_motion_active());

        nav.set_control_method(ControlMethod::Touch);
        assert!(!nav.is_motion_active());
        assert_eq!(log.starts.get(), 2);
    }

    #[test]
    fn unavailable_sensor_makes_motion_a_no_op() {
        let (mut nav, log) = navigator(false);
        nav.set_control_method(ControlMethod::Motion);
        assert_eq!(log.starts.get(), 0);
        assert!(!nav.is_motion_active());
        assert_eq!(nav.orientation(), CameraOrientation::Euler(EulerAngles::yaw_only(0.0)));
    }

    #[test]
    fn motion_control_ignores_gestures() {
        let (mut nav, _) = navigator(true);
        nav.set_control_method(ControlMethod::Motion);
        let fov = nav.field_of_view();
        pan(&mut nav, &[(100.0, 0.0)]);
        pinch(&mut nav, 2, &[2.0]);
        assert_eq!(nav.orientation(), CameraOrientation::Euler(EulerAngles::yaw_only(0.0)));
        assert_eq!(nav.field_of_view(), fov);
    }

    #[test]
    fn touch_control_ignores_attitude() {
        let (mut nav, _) = navigator(true);
        deliver(&mut nav, upright_turned(1.0));
        assert_eq!(nav.orientation(), CameraOrientation::Euler(EulerAngles::yaw_only(0.0)));
    }

    #[test]
    fn cylindrical_sensor_sets_yaw_from_heading() {
        let (mut nav, _) = navigator(true);
        nav.set_control_method(ControlMethod::Motion);
        let sample = upright_turned(0.5);
        deliver(&mut nav, sample);

        match nav.orientation() {
            CameraOrientation::Euler(e) => {
                assert!((e.yaw + sample.heading).abs() < EPSILON);
                assert_eq!(e.pitch, 0.0);
                assert_eq!(e.roll, 0.0);
            }
            other => panic!("expected euler angles, got {other:?}"),
        }
    }

    #[test]
    fn combined_cylindrical_adds_pan_offset_to_heading() {
        let (mut nav, _) = navigator(true);
        nav.set_control_method(ControlMethod::Combined);
        let sample = upright_turned(0.5);
        deliver(&mut nav, sample);
        pan(&mut nav, &[(100.0, 50.0)]);

        let offset = 100.0 * 0.4 / 400.0 * 2.0 * PI;
        assert!((nav.gesture_offset().total_y - offset).abs() < EPSILON);
        assert_eq!(nav.gesture_offset().total_x, 0.0);

        deliver(&mut nav, sample);
        assert!((nav.orientation().yaw() - (offset - sample.heading)).abs() < EPSILON);
    }

    #[test]
    fn spherical_sensor_uses_corrected_attitude() {
        let (mut nav, _) = navigator(true);
        nav.set_projection_mode(ProjectionMode::Spherical);
        nav.set_control_method(ControlMethod::Motion);
        let device = Quat::from_rotation_z(0.3) * Quat::from_rotation_x(1.2);
        nav.apply_attitude_sample(device, ScreenOrientation::LandscapeLeft);

        let expected = SceneAttitude::from_device(device, ScreenOrientation::LandscapeLeft).rotation;
        assert!(nav.orientation().rotation().dot(expected).abs() > 1.0 - EPSILON);
    }

    #[test]
    fn combined_spherical_layers_local_pitch_then_world_yaw() {
        let (mut nav, _) = navigator(true);
        nav.set_projection_mode(ProjectionMode::Spherical);
        nav.set_control_method(ControlMethod::Combined);
        let sample = upright_turned(0.4);
        deliver(&mut nav, sample);
        pan(&mut nav, &[(50.0, 30.0)]);

        let offset = nav.gesture_offset();
        let expected = Quat::from_rotation_y(offset.total_y) * sample.rotation * Quat::from_rotation_x(offset.total_x);
        assert!(nav.orientation().rotation().dot(expected).abs() > 1.0 - EPSILON);
    }

    #[test]
    fn sensor_failure_halts_updates_until_reset() {
        let (mut nav, log) = navigator(true);
        nav.set_control_method(ControlMethod::Motion);
        fail(&mut nav);
        assert!(!nav.is_motion_active());

        deliver(&mut nav, upright_turned(1.0));
        assert_eq!(nav.orientation(), CameraOrientation::Euler(EulerAngles::yaw_only(0.0)));

        nav.handle(NavigationEvent::SetControlMethod(ControlMethod::Motion));
        assert!(nav.is_motion_active());
        deliver(&mut nav, upright_turned(1.0));
        assert!(nav.orientation().yaw() != 0.0);
        assert_eq!(log.starts.get(), 2);
    }

    #[test]
    fn stale_events_from_a_restarted_sampler_are_dropped() {
        let (mut nav, log) = navigator(true);
        nav.set_control_method(ControlMethod::Motion);
        let first = log.session();
        nav.set_control_method(ControlMethod::Motion);
        assert_ne!(log.session(), first);

        // 旧线程在重启前排进队列的事件
        nav.handle(NavigationEvent::SensorFailed {
            session: first,
            error: SensorError::ReadFailed("gone".into()),
        });
        assert!(nav.is_motion_active());
        nav.handle(NavigationEvent::Attitude {
            session: first,
            attitude: upright_turned(1.0),
        });
        assert_eq!(nav.orientation(), CameraOrientation::Euler(EulerAngles::yaw_only(0.0)));

        deliver(&mut nav, upright_turned(1.0));
        assert!(nav.orientation().yaw() != 0.0);
        fail(&mut nav);
        assert!(!nav.is_motion_active());
    }

    #[test]
    fn pinch_ended_with_extra_finger_clears_base() {
        let (mut nav, _) = navigator(true);
        let fov = nav.field_of_view();
        nav.handle(NavigationEvent::Gesture(GestureEvent::Pinch {
            scale: 1.0,
            touches: 2,
            phase: GesturePhase::Began,
        }));
        nav.handle(NavigationEvent::Gesture(GestureEvent::Pinch {
            scale: 1.2,
            touches: 3,
            phase: GesturePhase::Ended,
        }));
        nav.handle(NavigationEvent::Gesture(GestureEvent::Pinch {
            scale: 1.5,
            touches: 2,
            phase: GesturePhase::Changed,
        }));
        assert_eq!(nav.field_of_view(), fov);
    }

    #[test]
    fn reported_heading_is_negated_yaw() {
        let (mut nav, _) = navigator(true);
        let needle = Rc::new(Needle::default());
        nav.set_compass(Some(Box::new(needle.clone())));

        pan(&mut nav, &[(60.0, 0.0)]);
        let (rotation, _) = *needle.0.borrow().last().unwrap();
        assert_eq!(rotation, -nav.orientation().yaw());

        nav.set_control_method(ControlMethod::Motion);
        deliver(&mut nav, upright_turned(0.9));
        let (rotation, _) = *needle.0.borrow().last().unwrap();
        assert_eq!(rotation, -nav.orientation().yaw());
    }

    #[test]
    fn resize_reports_without_movement_handler() {
        let (mut nav, _) = navigator(false);
        let needle = Rc::new(Needle::default());
        let moved = Rc::new(Cell::new(0));
        nav.set_compass(Some(Box::new(needle.clone())));
        let counter = moved.clone();
        nav.set_movement_handler(Some(Box::new(move |_, _| counter.set(counter.get() + 1))));
        let before = needle.0.borrow().len();

        nav.handle(NavigationEvent::Resize {
            width: 800.0,
            height: 400.0,
        });
        assert_eq!(needle.0.borrow().len(), before + 1);
        let (_, fov) = *needle.0.borrow().last().unwrap();
        assert!((fov - (70.0f32 * 2.0).to_radians()).abs() < EPSILON);

        // 尺寸不变则不重复上报
        nav.set_viewport(800.0, 400.0);
        assert_eq!(needle.0.borrow().len(), before + 1);

        nav.reset_camera_angles();
        assert_eq!(moved.get(), 0);

        pan(&mut nav, &[(10.0, 0.0)]);
        assert_eq!(moved.get(), 1);
    }

    #[test]
    fn dropping_navigator_stops_motion() {
        let (mut nav, log) = navigator(true);
        nav.set_control_method(ControlMethod::Motion);
        drop(nav);
        assert!(!log.active.get());
    }
}

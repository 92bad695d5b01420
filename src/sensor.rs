// sensor.rs — 设备姿态采样
//
// 后台线程按固定间隔读取姿态，结合采样时的屏幕方向换算成 SceneAttitude，
// 再通过通道交给 UI 线程。读取失败时发送 SensorFailed 并永久停止。
// 每次启动都有新的 session 编号，重启前排队的旧事件会被 navigator 丢弃。

use glam::Quat;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::attitude::{SceneAttitude, ScreenOrientation};
use crate::error::SensorError;
use crate::navigator::{MotionControl, NavigationEvent};

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(15);

pub trait AttitudeProvider: Send + Sync {
    fn is_available(&self) -> bool;
    /// Device attitude in the "X arbitrary, Z vertical" reference frame.
    fn read_attitude(&self) -> Result<Quat, SensorError>;
}

/// Current interface orientation, written by the UI and read per sample.
#[derive(Debug, Clone, Default)]
pub struct ScreenOrientationCell(Arc<AtomicU8>);

impl ScreenOrientationCell {
    pub fn new(orientation: ScreenOrientation) -> Self {
        Self(Arc::new(AtomicU8::new(orientation.to_u8())))
    }

    pub fn get(&self) -> ScreenOrientation {
        ScreenOrientation::from_u8(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, orientation: ScreenOrientation) {
        self.0.store(orientation.to_u8(), Ordering::Relaxed);
    }
}

pub struct MotionSampler {
    provider: Arc<dyn AttitudeProvider>,
    screen: ScreenOrientationCell,
    interval: Duration,
    events: Sender<NavigationEvent>,
    running: Arc<AtomicBool>,
    session: u64,
    worker: Option<JoinHandle<()>>,
}

impl MotionSampler {
    pub fn new(
        provider: Arc<dyn AttitudeProvider>,
        screen: ScreenOrientationCell,
        interval: Duration,
        events: Sender<NavigationEvent>,
    ) -> Self {
        Self {
            provider,
            screen,
            interval,
            events,
            running: Arc::new(AtomicBool::new(false)),
            session: 0,
            worker: None,
        }
    }

    fn spawn(&mut self) {
        let provider = self.provider.clone();
        let screen = self.screen.clone();
        let interval = self.interval;
        let events = self.events.clone();
        let running = self.running.clone();
        let session = self.session;

        let spawned = thread::Builder::new()
            .name("attitude-sampler".into())
            .spawn(move || {
                while running.load(Ordering::Acquire) {
                    let event = match provider.read_attitude() {
                        Ok(device) => NavigationEvent::Attitude {
                            session,
                            attitude: SceneAttitude::from_device(device, screen.get()),
                        },
                        Err(error) => {
                            running.store(false, Ordering::Release);
                            NavigationEvent::SensorFailed { session, error }
                        }
                    };
                    if events.send(event).is_err() {
                        // UI 端已关闭
                        running.store(false, Ordering::Release);
                        break;
                    }
                    thread::sleep(interval);
                }
            });

        match spawned {
            Ok(handle) => self.worker = Some(handle),
            Err(e) => {
                warn!("cannot spawn attitude sampler: {e}");
                self.running.store(false, Ordering::Release);
            }
        }
    }
}

impl MotionControl for MotionSampler {
    fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    fn is_active(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn start(&mut self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        // 上一次因错误退出的线程
        if let Some(old) = self.worker.take() {
            if old.join().is_err() {
                warn!("previous attitude sampler panicked");
            }
        }
        self.session += 1;
        debug!("attitude sampling session {} every {:?}", self.session, self.interval);
        self.spawn();
    }

    fn session(&self) -> u64 {
        self.session
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("attitude sampler panicked");
            }
        }
    }
}

impl Drop for MotionSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Attitude source driven by the host, e.g. keyboard input on a desktop.
#[derive(Debug)]
pub struct VirtualDevice {
    attitude: RwLock<Quat>,
    disconnected: AtomicBool,
}

impl Default for VirtualDevice {
    /// Held upright in portrait: the screen's Y axis points up.
    fn default() -> Self {
        Self::new(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2))
    }
}

impl VirtualDevice {
    pub fn new(attitude: Quat) -> Self {
        Self {
            attitude: RwLock::new(attitude),
            disconnected: AtomicBool::new(false),
        }
    }

    pub fn attitude(&self) -> Quat {
        self.attitude.read().map(|q| *q).unwrap_or(Quat::IDENTITY)
    }

    pub fn set_attitude(&self, attitude: Quat) {
        if let Ok(mut q) = self.attitude.write() {
            *q = attitude.normalize();
        }
    }

    /// Turns the device around the vertical axis.
    pub fn turn(&self, angle: f32) {
        self.set_attitude(Quat::from_rotation_z(angle) * self.attitude());
    }

    /// Tilts the device around its own X axis.
    pub fn tilt(&self, angle: f32) {
        self.set_attitude(self.attitude() * Quat::from_rotation_x(angle));
    }

    /// Makes subsequent reads fail.
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::Release);
    }

    pub fn reconnect(&self) {
        self.disconnected.store(false, Ordering::Release);
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }
}

impl AttitudeProvider for VirtualDevice {
    fn is_available(&self) -> bool {
        true
    }

    fn read_attitude(&self) -> Result<Quat, SensorError> {
        if self.disconnected.load(Ordering::Acquire) {
            return Err(SensorError::ReadFailed("virtual device disconnected".into()));
        }
        self.attitude
            .read()
            .map(|q| *q)
            .map_err(|_| SensorError::ReadFailed("attitude lock poisoned".into()))
    }
}

/// Hosts without any attitude hardware.
#[derive(Debug, Default)]
pub struct NoSensor;

impl AttitudeProvider for NoSensor {
    fn is_available(&self) -> bool {
        false
    }

    fn read_attitude(&self) -> Result<Quat, SensorError> {
        Err(SensorError::Unavailable)
    }
}

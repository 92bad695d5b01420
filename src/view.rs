// view.rs — 全景组件：图片 → 投影模式 → 几何体，外加导航状态

use glam::Quat;
use log::info;

use crate::mesh::{PanoramaMesh, PANORAMA_RADIUS};
use crate::navigator::{MotionControl, NavigationEvent, PanoramaNavigator};
use crate::panorama::{ControlMethod, PanoramaSettings, ProjectionMode};

pub struct PanoramaView {
    navigator: PanoramaNavigator,
    image_size: Option<(u32, u32)>,
    projection_override: Option<ProjectionMode>,
    geometry: PanoramaMesh,
    geometry_generation: u64,
    overlay: Option<String>,
}

impl PanoramaView {
    pub fn new(settings: PanoramaSettings, motion: Box<dyn MotionControl>) -> Self {
        let navigator = PanoramaNavigator::new(settings, motion);
        let geometry = PanoramaMesh::for_projection(navigator.projection_mode(), PANORAMA_RADIUS, settings.default_fov);
        Self {
            navigator,
            image_size: None,
            projection_override: None,
            geometry,
            geometry_generation: 0,
            overlay: None,
        }
    }

    pub fn navigator(&self) -> &PanoramaNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut PanoramaNavigator {
        &mut self.navigator
    }

    pub fn handle(&mut self, event: NavigationEvent) {
        match event {
            NavigationEvent::SetProjectionMode(mode) => self.set_projection_mode(mode),
            other => self.navigator.handle(other),
        }
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    /// New image: picks the projection from its aspect ratio unless one is
    /// forced.
    pub fn set_image_size(&mut self, size: Option<(u32, u32)>) {
        self.image_size = size;
        let mode = self
            .projection_override
            .unwrap_or_else(|| ProjectionMode::for_image_size(size));
        info!("image {size:?} -> {mode} projection");
        self.set_projection_mode(mode);
    }

    pub fn set_projection_override(&mut self, mode: Option<ProjectionMode>) {
        self.projection_override = mode;
        self.set_image_size(self.image_size);
    }

    pub fn projection_override(&self) -> Option<ProjectionMode> {
        self.projection_override
    }

    /// Rebuilds the geometry and resets the camera.
    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        let settings = *self.navigator.settings();
        self.geometry = PanoramaMesh::for_projection(mode, PANORAMA_RADIUS, settings.default_fov);
        self.geometry_generation += 1;
        self.navigator.set_projection_mode(mode);
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.navigator.projection_mode()
    }

    pub fn set_control_method(&mut self, method: ControlMethod) {
        self.navigator.set_control_method(method);
    }

    pub fn geometry(&self) -> &PanoramaMesh {
        &self.geometry
    }

    /// Bumped on every rebuild so a renderer can tell stale buffers apart.
    pub fn geometry_generation(&self) -> u64 {
        self.geometry_generation
    }

    pub fn geometry_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.navigator.settings().angle_offset)
    }

    pub fn camera_rotation(&self) -> Quat {
        self.navigator.orientation().rotation()
    }

    pub fn overlay(&self) -> Option<&str> {
        self.overlay.as_deref()
    }

    pub fn set_overlay(&mut self, overlay: Option<String>) {
        self.overlay = overlay;
    }
}

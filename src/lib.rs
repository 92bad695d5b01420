//! Embeddable panorama viewer core.
//!
//! A single equirectangular or cylindrical photo is wrapped around the camera
//! (sphere for 2:1 images, tube otherwise) and the user looks around with
//! touch gestures, the device attitude sensor, or both. The
//! [`navigator::PanoramaNavigator`] owns the camera orientation and field of
//! view; everything else feeds it [`navigator::NavigationEvent`]s or reads
//! from it.
//!
//! ```no_run
//! use std::sync::{mpsc::channel, Arc};
//! use panorama_view::{
//!     ControlMethod, MotionSampler, NavigationEvent, PanoramaSettings, PanoramaView,
//!     ScreenOrientationCell, VirtualDevice, DEFAULT_SAMPLE_INTERVAL,
//! };
//!
//! let (tx, rx) = channel();
//! let sampler = MotionSampler::new(
//!     Arc::new(VirtualDevice::default()),
//!     ScreenOrientationCell::default(),
//!     DEFAULT_SAMPLE_INTERVAL,
//!     tx,
//! );
//! let mut view = PanoramaView::new(PanoramaSettings::default(), Box::new(sampler));
//! view.set_image_size(Some((4096, 2048)));
//! view.set_control_method(ControlMethod::Combined);
//!
//! // UI loop
//! while let Ok(event) = rx.try_recv() {
//!     view.handle(event);
//! }
//! let _rotation = view.camera_rotation();
//! # let _ = NavigationEvent::Resize { width: 1.0, height: 1.0 };
//! ```

pub mod attitude;
pub mod compass;
pub mod config;
pub mod error;
pub mod gesture;
pub mod mesh;
pub mod navigator;
pub mod orientation;
pub mod panorama;
pub mod reporter;
pub mod sensor;
pub mod view;

pub use attitude::{SceneAttitude, ScreenOrientation};
pub use compass::CompassDial;
pub use config::ViewerConfig;
pub use error::{ConfigError, SensorError};
pub use gesture::{GestureEvent, GesturePhase};
pub use navigator::{MotionControl, NavigationEvent, PanoramaNavigator};
pub use orientation::{CameraOrientation, EulerAngles, GestureOffset};
pub use panorama::{ControlMethod, PanoramaSettings, ProjectionMode};
pub use reporter::{HeadingReport, PanoramaCompass};
pub use sensor::{AttitudeProvider, MotionSampler, NoSensor, ScreenOrientationCell, VirtualDevice, DEFAULT_SAMPLE_INTERVAL};
pub use view::PanoramaView;

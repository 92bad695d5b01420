// main.rs — 桌面全景查看器：窗口、输入、菜单、状态栏、罗盘

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 在 Release 模式下隐藏控制台窗口

mod fonts;
mod i18n;
mod input;
mod renderer;

use input::GestureRecognizer;
use renderer::Renderer;

use panorama_view::config::SensorKind;
use panorama_view::{
    AttitudeProvider, CompassDial, ControlMethod, MotionSampler, NavigationEvent, NoSensor, PanoramaView,
    ProjectionMode, ScreenOrientationCell, ViewerConfig, VirtualDevice,
};

use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowBuilder},
};

use image::io::Reader as ImageReader;
use log::{error, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread;

// 方向键每次转动虚拟设备的角度
const KEY_STEP_DEG: f32 = 5.0;
const COMPASS_SIZE: f32 = 96.0;
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];
const LANGS: [(&str, &str); 2] = [("en", "English"), ("zh-Hans", "简体中文")];

struct UiState {
    is_loading: bool,
    is_fullscreen: bool,
    show_compass: bool,
    current_lang: String,
    next_image: Option<PathBuf>,
    exit_requested: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::load()?;
    i18n::init(i18n::resolve_lang(config.lang.as_deref()));

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(i18n::tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;

    // 传感器线程 -> UI 线程
    let (nav_tx, nav_rx) = channel::<NavigationEvent>();
    // 后台解码 -> UI 线程
    let (img_tx, img_rx) = channel::<image::RgbaImage>();

    let device = match config.sensor {
        SensorKind::Virtual => Some(Arc::new(VirtualDevice::default())),
        SensorKind::None => None,
    };
    let provider: Arc<dyn AttitudeProvider> = match &device {
        Some(d) => d.clone() as Arc<dyn AttitudeProvider>,
        None => Arc::new(NoSensor),
    };
    let screen = ScreenOrientationCell::default();
    let sampler = MotionSampler::new(provider, screen.clone(), config.sample_interval(), nav_tx);

    let mut view = PanoramaView::new(config.settings(), Box::new(sampler));
    let compass = Rc::new(CompassDial::default());
    view.navigator_mut().set_compass(Some(Box::new(compass.clone())));
    view.navigator_mut()
        .set_movement_handler(Some(Box::new(|rotation: f32, fov: f32| {
            log::trace!("moved: heading {:.1}°, fov {:.1}°", rotation.to_degrees(), fov.to_degrees());
        })));
    view.set_overlay(config.overlay_text.clone());
    view.set_projection_override(config.projection);
    view.set_control_method(config.control_method);
    view.handle(resize_event(window.inner_size()));

    let mut ui = UiState {
        is_loading: false,
        is_fullscreen: false,
        show_compass: config.show_compass,
        current_lang: i18n::current_lang(),
        next_image: config.image.clone(),
        exit_requested: false,
    };
    let mut recognizer = GestureRecognizer::default();
    // LoopDestroyed 时取出并丢弃，停止采样线程
    let mut panorama = Some(view);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        if let Event::LoopDestroyed = event {
            panorama.take();
            return;
        }
        let Some(view) = panorama.as_mut() else {
            return;
        };

        while let Ok(nav) = nav_rx.try_recv() {
            view.handle(nav);
        }

        if let Ok(rgba) = img_rx.try_recv() {
            view.set_image_size(Some(rgba.dimensions()));
            renderer.load_panorama(rgba);
            ui.is_loading = false;
        }

        if let Some(path) = ui.next_image.take() {
            ui.is_loading = true;
            start_load_image(path, img_tx.clone());
        }

        if ui.exit_requested {
            *control_flow = ControlFlow::Exit;
            return;
        }

        match event {
            Event::WindowEvent { event, .. } => {
                // 先让 egui 处理事件
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                for gesture in recognizer.on_window_event(&event) {
                    view.handle(NavigationEvent::Gesture(gesture));
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        view.handle(resize_event(new_size));
                    }

                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        renderer.resize(*new_inner_size);
                        view.handle(resize_event(*new_inner_size));
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            if let Some(key) = input.virtual_keycode {
                                handle_key(key, view, device.as_deref(), &screen, &mut ui, &window);
                            }
                        }
                    }

                    WindowEvent::DroppedFile(path) => {
                        ui.next_image = Some(path);
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                renderer.set_geometry(view.geometry(), view.geometry_generation());
                renderer.update_camera(
                    view.camera_rotation(),
                    view.navigator().field_of_view(),
                    view.geometry_rotation(),
                );

                let render_result =
                    renderer.render_with_ui(&window, |ctx| draw_ui(ctx, view, &compass, &mut ui, &window));

                match render_result {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => error!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    })
}

fn resize_event(size: PhysicalSize<u32>) -> NavigationEvent {
    NavigationEvent::Resize {
        width: size.width as f32,
        height: size.height as f32,
    }
}

fn handle_key(
    key: VirtualKeyCode,
    view: &mut PanoramaView,
    device: Option<&VirtualDevice>,
    screen: &ScreenOrientationCell,
    ui: &mut UiState,
    window: &Window,
) {
    let step = KEY_STEP_DEG.to_radians();
    match key {
        VirtualKeyCode::O => ui.next_image = pick_image(),
        VirtualKeyCode::F11 => toggle_fullscreen(ui, window),
        VirtualKeyCode::Key1 => view.handle(NavigationEvent::SetControlMethod(ControlMethod::Touch)),
        VirtualKeyCode::Key2 => view.handle(NavigationEvent::SetControlMethod(ControlMethod::Motion)),
        VirtualKeyCode::Key3 => view.handle(NavigationEvent::SetControlMethod(ControlMethod::Combined)),
        VirtualKeyCode::P => view.set_projection_override(Some(view.projection_mode().toggled())),
        VirtualKeyCode::R => {
            let next = screen.get().next();
            screen.set(next);
            info!(
                "{}",
                i18n::tr_with("log.screen_orientation", &[("orientation", format!("{next:?}"))])
            );
        }
        VirtualKeyCode::Space => view.navigator_mut().reset_camera_angles(),
        _ => {
            if let Some(device) = device {
                drive_virtual_device(key, step, view, device);
            }
        }
    }
}

fn drive_virtual_device(key: VirtualKeyCode, step: f32, view: &mut PanoramaView, device: &VirtualDevice) {
    match key {
        VirtualKeyCode::Left => device.turn(step),
        VirtualKeyCode::Right => device.turn(-step),
        VirtualKeyCode::Up => device.tilt(step),
        VirtualKeyCode::Down => device.tilt(-step),
        VirtualKeyCode::X if device.is_disconnected() => {
            device.reconnect();
            info!("{}", i18n::tr("log.sensor_reconnected"));
            // 传感器出错后需要重新设置控制方式才会恢复
            let method = view.navigator().control_method();
            view.set_control_method(method);
        }
        VirtualKeyCode::X => {
            device.disconnect();
            warn!("{}", i18n::tr("log.sensor_disconnected"));
        }
        _ => {}
    }
}

fn toggle_fullscreen(ui: &mut UiState, window: &Window) {
    ui.is_fullscreen = !ui.is_fullscreen;
    if ui.is_fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
    }
}

fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(&i18n::tr("file.filter.images"), &IMAGE_EXTENSIONS)
        .pick_file()
}

fn start_load_image(path: PathBuf, tx: Sender<image::RgbaImage>) {
    thread::spawn(move || {
        info!(
            "{}",
            i18n::tr_with("log.loading_image_bg", &[("path", path.display().to_string())])
        );

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                error!("{}", i18n::tr_with("error.open_file", &[("err", e.to_string())]));
                return;
            }
        };

        let img_result = ImageReader::new(BufReader::new(file))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)
            .and_then(|mut r| {
                r.no_limits();
                r.decode()
            });

        match img_result {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (w, h) = rgba.dimensions();
                info!(
                    "{}",
                    i18n::tr_with("log.image_loaded_size", &[("w", w.to_string()), ("h", h.to_string())])
                );
                if tx.send(rgba).is_err() {
                    error!("{}", i18n::tr("error.send_to_main_failed"));
                }
            }
            Err(e) => error!("{}", i18n::tr_with("error.decode_image", &[("err", e.to_string())])),
        }
    });
}

fn projection_key(mode: ProjectionMode) -> &'static str {
    match mode {
        ProjectionMode::Cylindrical => "projection.cylindrical",
        ProjectionMode::Spherical => "projection.spherical",
    }
}

fn control_key(method: ControlMethod) -> &'static str {
    match method {
        ControlMethod::Touch => "control.touch",
        ControlMethod::Motion => "control.motion",
        ControlMethod::Combined => "control.both",
    }
}

fn draw_ui(ctx: &egui::Context, view: &mut PanoramaView, compass: &CompassDial, state: &mut UiState, window: &Window) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button(i18n::tr("menu.file"), |ui| {
                if ui.button(i18n::tr("menu.open_image")).clicked() {
                    ui.close_menu();
                    state.next_image = pick_image();
                }
                if ui.button(i18n::tr("menu.exit")).clicked() {
                    state.exit_requested = true;
                }
            });

            ui.menu_button(i18n::tr("menu.view"), |ui| {
                if ui.button(i18n::tr("view.reset")).clicked() {
                    view.navigator_mut().reset_camera_angles();
                    ui.close_menu();
                }
                let fullscreen_label = if state.is_fullscreen {
                    i18n::tr("view.exit_fullscreen")
                } else {
                    i18n::tr("view.fullscreen")
                };
                if ui.button(fullscreen_label).clicked() {
                    toggle_fullscreen(state, window);
                    ui.close_menu();
                }

                ui.separator();
                for mode in [ProjectionMode::Cylindrical, ProjectionMode::Spherical] {
                    if ui.radio(view.projection_mode() == mode, i18n::tr(projection_key(mode))).clicked() {
                        view.set_projection_override(Some(mode));
                        ui.close_menu();
                    }
                }
                if ui
                    .radio(view.projection_override().is_none(), i18n::tr("view.projection_auto"))
                    .clicked()
                {
                    view.set_projection_override(None);
                    ui.close_menu();
                }

                ui.separator();
                ui.checkbox(&mut state.show_compass, i18n::tr("view.show_compass"));
            });

            ui.menu_button(i18n::tr("menu.control"), |ui| {
                for method in [ControlMethod::Touch, ControlMethod::Motion, ControlMethod::Combined] {
                    let selected = view.navigator().control_method() == method;
                    if ui.radio(selected, i18n::tr(control_key(method))).clicked() {
                        view.handle(NavigationEvent::SetControlMethod(method));
                        ui.close_menu();
                    }
                }
            });

            ui.menu_button(i18n::tr("menu.language"), |ui| {
                for (code, name) in LANGS {
                    if ui.radio(state.current_lang == code, name).clicked() {
                        state.current_lang = code.to_string();
                        i18n::init(code);
                        window.set_title(&i18n::tr("app.title"));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if state.is_loading {
                ui.label(egui::RichText::new(i18n::tr("status.loading_image")).color(egui::Color32::YELLOW));
                ui.label("|");
            }

            if let Some((w, h)) = view.image_size() {
                ui.label(format!("{w}×{h}"));
                ui.label("|");
            }

            let nav = view.navigator();
            ui.label(format!(
                "{} {}",
                i18n::tr("status.projection"),
                i18n::tr(projection_key(nav.projection_mode()))
            ));
            ui.label("|");
            ui.label(format!(
                "{} {}",
                i18n::tr("status.control"),
                i18n::tr(control_key(nav.control_method()))
            ));
            ui.label("|");
            ui.label(format!("FOV: {:.1}°", nav.field_of_view()));
            ui.label("|");
            ui.label(format!(
                "{} {:.1}°",
                i18n::tr("status.heading"),
                nav.heading_report().rotation_angle.to_degrees()
            ));

            if nav.control_method().uses_motion() && !nav.is_motion_active() {
                ui.label("|");
                ui.label(egui::RichText::new(i18n::tr("status.sensor_stopped")).color(egui::Color32::RED));
            } else if nav.is_sensor_paused() {
                ui.label("|");
                ui.label(egui::RichText::new(i18n::tr("status.sensor_paused")).color(egui::Color32::YELLOW));
            }
        });
    });

    if state.show_compass {
        egui::Area::new("compass")
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -40.0])
            .interactable(false)
            .show(ctx, |ui| {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(COMPASS_SIZE, COMPASS_SIZE), egui::Sense::hover());
                compass.paint(ui.painter(), rect);
            });
    }

    if let Some(text) = view.overlay() {
        egui::Area::new("overlay")
            .anchor(egui::Align2::CENTER_TOP, [0.0, 36.0])
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(text)
                        .size(18.0)
                        .color(egui::Color32::WHITE)
                        .background_color(egui::Color32::from_black_alpha(140)),
                );
            });
    }
}

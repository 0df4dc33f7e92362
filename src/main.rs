#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release
#![allow(unsafe_code)]
#![allow(clippy::undocumented_unsafe_blocks)]

use eframe::{egui, egui_glow, glow};
use egui::mutex::Mutex;
use egui::{CursorGrab, ViewportCommand};

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

mod config;
mod error;
mod gfx;
mod viewer;

use config::{ViewerConfig, CONFIG_FILE};
use error::ViewerError;
use gfx::renderer::Viewport;
use gfx::{Camera, DrawProperties};
use viewer::{CursorChange, FixedTimestep, InputFrame, InputState, Overlay, Scene};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = ViewerConfig::load_or_default(Path::new(CONFIG_FILE)).map_err(|e| {
        log::error!("{e}");
        eframe::Error::AppCreation(Box::new(e))
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_resizable(config.window.resizable),
        depth_buffer: 24,
        vsync: true,

        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    let title = config.window.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| match ViewerApp::new(cc, &config) {
            Ok(app) => Ok(Box::new(app)),
            Err(e) => {
                log::error!("Startup failed: {e}");
                Err(e.into())
            }
        }),
    )
}

struct ViewerApp {
    /// Behind an `Arc<Mutex<…>>` so we can pass it to [`egui::PaintCallback`] and paint later.
    scene: Arc<Mutex<Scene>>,
    model_names: Vec<String>,

    camera: Camera,
    draw_props: DrawProperties,
    input: InputState,
    timestep: FixedTimestep,
    overlay: Overlay,
}

impl ViewerApp {
    fn new(cc: &eframe::CreationContext<'_>, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let gl = cc.gl.as_ref().ok_or(ViewerError::NoGlContext)?;

        let scene = Scene::new(gl, cc.get_proc_address, config)?;
        let model_names = scene.models().names();

        let camera = Camera::new(
            config.camera.position.into(),
            config.camera.yaw,
            config.camera.pitch,
        );

        Ok(Self {
            scene: Arc::new(Mutex::new(scene)),
            model_names,
            camera,
            draw_props: DrawProperties::default(),
            input: InputState::default(),
            timestep: FixedTimestep::new(Instant::now()),
            overlay: Overlay::default(),
        })
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let elapsed = self.timestep.tick(Instant::now());
        self.overlay.set_frame_time(elapsed);

        // Camera input is applied every frame for responsiveness
        self.poll_input(ctx);

        // Logic updates would consume whole steps here
        let steps = self.timestep.drain();
        log::trace!("{steps} fixed steps, {:.4}s carried over", self.timestep.lag());

        self.draw_props = self
            .overlay
            .show(ctx, &self.camera, self.draw_props, &self.model_names);
        self.draw_props.selected_model_index = self
            .scene
            .lock()
            .models()
            .clamp_index(self.draw_props.selected_model_index);

        self.paint_scene(ctx);
        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            self.scene.lock().destroy_gl(gl);
        }
    }
}

impl ViewerApp {
    fn poll_input(&mut self, ctx: &egui::Context) {
        let keyboard_free = !ctx.wants_keyboard_input();
        // The scene is painted on the background layer, so any egui area under the pointer is UI
        let scene_hovered = !ctx.is_pointer_over_area();
        let frame = ctx.input(|i| InputFrame::from_egui(i, keyboard_free, scene_hovered));

        if frame.close_requested {
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }

        match self.input.apply(&frame, &mut self.camera) {
            Some(CursorChange::Capture) => {
                ctx.send_viewport_cmd(ViewportCommand::CursorGrab(CursorGrab::Locked));
                ctx.send_viewport_cmd(ViewportCommand::CursorVisible(false));
            }
            Some(CursorChange::Release) => {
                ctx.send_viewport_cmd(ViewportCommand::CursorGrab(CursorGrab::None));
                ctx.send_viewport_cmd(ViewportCommand::CursorVisible(true));
            }
            None => {}
        }
    }

    fn paint_scene(&self, ctx: &egui::Context) {
        // Clone to Give to callback
        let scene = self.scene.clone();
        let camera = self.camera.clone();
        let props = self.draw_props;

        let callback = egui::PaintCallback {
            rect: ctx.screen_rect(),
            callback: Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                let px = info.viewport_in_pixels();
                let viewport = Viewport {
                    x: px.left_px,
                    y: px.from_bottom_px,
                    width: px.width_px,
                    height: px.height_px,
                };
                scene.lock().paint(painter.gl(), viewport, &camera, &props);
            })),
        };
        ctx.layer_painter(egui::LayerId::background()).add(callback);
    }
}

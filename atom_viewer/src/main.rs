//! Atom Model Viewer
//!
//! A nucleus of protons and neutrons lit by orbiting electrons. Element
//! layouts are read from `.aselement` files the first time each element is
//! selected.
//!
//! Controls:
//! - Right / N: Next element
//! - Left / P: Previous element
//! - W/A/S/D: Orbit camera, Q/E: Zoom
//! - Left mouse drag: Orbit camera
//! - Scroll: Zoom in/out
//! - R: Reset view
//! - Space: Pause/resume electrons
//! - H: Toggle status panel

use std::process::ExitCode;

use atom_viewer::config::Config;
use atom_viewer::renderer::AtomRenderer;
use atom_viewer::ui::{draw_status_panel, ElementStatus};
use atom_viewer::selection::intent_for_key;
use atom_viewer::{AtomScene, FileSource};
use clap::Parser;
use common::{Camera3D, CameraController, GraphicsContext};
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: AtomRenderer,
    scene: AtomScene<FileSource>,
    camera: Camera3D,
    controller: CameraController,
    show_panel: bool,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext, config: &Config) -> Self {
        let assets_dir = config.assets_dir();
        log::info!("Reading assets from {}", assets_dir.display());

        let renderer = AtomRenderer::new(&ctx, &assets_dir);
        let scene = AtomScene::new(FileSource::new(assets_dir), config.element);
        let camera = Camera3D::new(ctx.aspect_ratio());

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Self {
            ctx,
            renderer,
            scene,
            camera,
            controller: CameraController::new(),
            show_panel: true,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
        self.renderer
            .resize(&self.ctx.device, self.ctx.size.width, self.ctx.size.height);
    }

    fn update(&mut self, dt: f32) {
        self.controller.update_camera(&mut self.camera, dt);
        self.scene.update(dt);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let counts = self.renderer.prepare(&self.ctx.queue, &self.camera, &self.scene);

        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            if self.show_panel {
                draw_status_panel(
                    ctx,
                    &ElementStatus {
                        element: self.scene.current_element(),
                        state: self.scene.current_state(),
                        texture: self.scene.current_texture(),
                        paused: self.scene.paused,
                    },
                );
            }
        });

        self.egui
            .state
            .handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self
            .egui
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui
                .renderer
                .update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let texture = self.scene.current_texture().to_string();
        self.renderer
            .render(&self.ctx, &mut encoder, &view, counts, &texture);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui
                .renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Element switches only register the intent, loading waits for the frame end
    fn handle_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) {
        let pressed = state == ElementState::Pressed;
        if self.controller.process_key(key, pressed) {
            return;
        }
        if let Some(intent) = intent_for_key(key, pressed, repeat) {
            self.scene.handle_intent(intent);
            return;
        }
        if !pressed || repeat {
            return;
        }

        match key {
            KeyCode::Space => self.scene.paused = !self.scene.paused,
            KeyCode::KeyH => self.show_panel = !self.show_panel,
            KeyCode::KeyR => self.camera.reset(),
            _ => {}
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    let (ctx, event_loop) = match pollster::block_on(GraphicsContext::new(
        "Atom Viewer - Rust/wgpu",
        config.width,
        config.height,
    )) {
        Ok(pair) => pair,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new(ctx, &config);
    let mut last_time = std::time::Instant::now();

    let result = event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                let consumed = app.handle_window_event(event);

                if !consumed {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(size) => app.resize(*size),
                        WindowEvent::MouseInput { state, button, .. } => {
                            if *button == MouseButton::Left {
                                app.controller
                                    .process_mouse_button(*state == ElementState::Pressed);
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            app.controller.process_cursor(position.x, position.y);
                        }
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(key),
                                    state,
                                    repeat,
                                    ..
                                },
                            ..
                        } => app.handle_key(*key, *state, *repeat),
                        WindowEvent::MouseWheel { delta, .. } => {
                            let scroll = match delta {
                                MouseScrollDelta::LineDelta(_, y) => *y,
                                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                            };
                            app.controller.process_scroll(scroll);
                        }
                        _ => {}
                    }
                }

                if let WindowEvent::RedrawRequested = event {
                    let now = std::time::Instant::now();
                    let dt = (now - last_time).as_secs_f32().min(0.1);
                    last_time = now;

                    app.update(dt);
                    match app.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                    app.scene.end_frame();
                }
            }
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Event loop error: {}", err);
            ExitCode::FAILURE
        }
    }
}

mod gpu;
mod input;
mod overlay;
mod state;

use anyhow::Result;
use clap::Parser;
use facade_render::ViewerSettings;
use gpu::GpuContext;
use state::ViewerState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "facade-viewer", about = "Residential façade viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

struct ViewerApp {
    state: ViewerState,
    gpu: Option<GpuContext>,
    /// Startup failure, reported after the event loop exits.
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(settings: ViewerSettings) -> Self {
        Self {
            state: ViewerState::new(settings),
            gpu: None,
            error: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<GpuContext> {
        let settings = self.state.settings();
        let (width, height) = settings.window_size;
        let attrs = Window::default_attributes()
            .with_title(settings.title.clone())
            .with_inner_size(PhysicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let gpu = GpuContext::new(window, self.state.scene(), settings)?;
        self.state.set_viewport(size.width, size.height);
        Ok(gpu)
    }

    fn redraw(&mut self) {
        let update = self.state.tick();
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        if let Some(map) = &update.environment
            && !gpu.upload_environment(map)
        {
            self.state.environment_rejected();
        }

        tracing::trace!(content = ?update.content, moved = update.camera_moved, "frame");
        gpu.render(
            self.state.camera(),
            update.content,
            &self.state.settings().title,
        );
        gpu.window().request_redraw();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("viewer failed to start: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu
            && gpu.on_window_event(&event)
        {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
                self.state.set_viewport(new_size.width, new_size.height);
            }
            WindowEvent::CursorLeft { .. } => self.state.pointer_left(),
            WindowEvent::RedrawRequested => self.redraw(),
            other => {
                if let Some(input) = input::translate(&other) {
                    self.state.handle_input(input);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window().request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("facade-viewer starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(ViewerSettings::default());
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

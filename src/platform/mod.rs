//! Platform layer
//!
//! Owns the window, the GPU renderer and the device state, and runs the frame
//! loop:
//! 1. read the clock
//! 2. rebuild the compute shader if its file changed
//! 3. drain gamepad events and sample every player's input source
//! 4. advance the simulation
//! 5. plan and dispatch one ray march per viewport, then present
//! 6. report frames per second

pub mod gamepads;
pub mod keyboard;

use std::path::Path;
use std::sync::Arc;

use glam::UVec2;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::error::{Error, Result};
use crate::frame::{FpsCounter, FrameClock};
use crate::input::{InputBinding, InputDevices, sample_all};
use crate::renderer::{FrameTiming, GpuRenderer, plan_frame, run_frame};
use crate::settings::Settings;
use crate::sim::{GameState, tick};
use crate::watcher::ShaderWatcher;

use gamepads::GamepadHub;
use keyboard::{KeyAction, KeyboardState};

/// Open the window and run until it closes
///
/// Returns the first fatal error raised inside the loop.
pub fn run(settings: Settings) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings);
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(e.to_string()))?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    settings: Settings,
    window: Option<Arc<Window>>,
    renderer: Option<GpuRenderer>,
    watcher: Option<ShaderWatcher>,

    keyboard: KeyboardState,
    gamepads: GamepadHub,
    bindings: Vec<InputBinding>,

    state: GameState,
    clock: FrameClock,
    fps: FpsCounter,

    fatal: Option<Error>,
}

impl App {
    fn new(settings: Settings) -> Self {
        let state = GameState::new(settings.player_count);
        let bindings = InputBinding::assign(&state.players, settings.keyboard_player);
        Self {
            keyboard: KeyboardState::new(UVec2::new(settings.window_width, settings.window_height)),
            gamepads: GamepadHub::new(),
            bindings,
            state,
            clock: FrameClock::new(),
            fps: FpsCounter::new(),
            window: None,
            renderer: None,
            watcher: None,
            fatal: None,
            settings,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| Error::Window(e.to_string()))?,
        );
        let size = window.inner_size();
        self.keyboard.set_window_size(UVec2::new(size.width, size.height));

        let renderer = pollster::block_on(GpuRenderer::new(window.clone(), &self.settings))?;
        if self.settings.hot_reload {
            self.watcher = start_watcher(renderer.compute_path());
        }

        self.renderer = Some(renderer);
        self.window = Some(window);
        self.clock = FrameClock::new();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{error}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let time = self.clock.tick();

        if let (Some(watcher), Some(renderer)) = (&self.watcher, self.renderer.as_mut()) {
            if watcher.poll() {
                renderer.reload_compute();
            }
        }

        self.gamepads.pump();
        let devices = InputDevices {
            keyboard: &self.keyboard,
            gamepads: self.gamepads.registry(),
        };
        let intents = sample_all(&mut self.bindings, &devices);
        tick(&mut self.state, &intents, time.elapsed_secs());

        let timing = FrameTiming {
            elapsed_time: time.elapsed_secs(),
            delta_time: time.delta_secs(),
            pointer: self.keyboard.cursor(),
        };
        let plan = plan_frame(
            &self.state,
            self.keyboard.window_size(),
            timing,
            self.settings.grid_rule,
        );

        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(e) = run_frame(renderer, &plan) {
                if e.is_fatal() {
                    self.fail(event_loop, e);
                    return;
                }
                log::error!("frame dropped: {e}");
            }
        }

        if let Some(frames) = self.fps.frame(time.delta_ms) {
            if self.settings.show_fps {
                println!("{frames} fps");
            }
        }
    }
}

fn start_watcher(path: &Path) -> Option<ShaderWatcher> {
    match ShaderWatcher::start(path) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            log::warn!("Hot reload disabled: {e}");
            None
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.frame(event_loop),
            event => {
                if let WindowEvent::Resized(size) = event {
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.resize(size.width, size.height);
                    }
                }
                if self.keyboard.handle_window_event(&event) == KeyAction::Quit {
                    event_loop.exit();
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

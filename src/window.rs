//! Window management using winit

use std::sync::Arc;

use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    error::OsError,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    monitor::MonitorHandle,
    window::{Fullscreen, Window as WinitWindow, WindowBuilder},
};

use crate::{GraphicsConfig, ScreenResolution};

/// Wrapper around winit window with additional state
pub struct Window {
    window: Arc<WinitWindow>,
    width: u32,
    height: u32,
    resized: bool,
    close_requested: bool,
}

impl Window {
    /// Create a window per the given configuration, centered on (or
    /// fullscreen over) the configured screen.
    pub fn create(event_loop: &EventLoop<()>, config: &GraphicsConfig) -> Result<Self, OsError> {
        let monitor = event_loop
            .available_monitors()
            .nth(config.screen_index)
            .or_else(|| event_loop.primary_monitor());

        let width = config.resolution.width;
        let height = config.resolution.height;

        let mut builder = WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(PhysicalSize::new(width, height));

        if config.fullscreen {
            builder = builder.with_fullscreen(Some(Fullscreen::Borderless(monitor)));
        } else if let Some(monitor) = &monitor {
            builder = builder.with_position(centered_position(monitor, width, height));
        }

        let window = Arc::new(builder.build(event_loop)?);

        Ok(Self {
            window,
            width,
            height,
            resized: false,
            close_requested: false,
        })
    }

    /// Get the raw window for backend initialization
    pub fn window(&self) -> &WinitWindow {
        &self.window
    }

    /// Get arc reference to window
    pub fn window_arc(&self) -> &Arc<WinitWindow> {
        &self.window
    }

    /// Get current window dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size of the monitor the window currently occupies
    pub fn monitor_size(&self) -> Option<(u32, u32)> {
        self.window.current_monitor().map(|m| {
            let size = m.size();
            (size.width, size.height)
        })
    }

    /// Enter or leave borderless fullscreen on the given screen
    pub fn set_fullscreen(&self, state: bool, screen_index: usize) {
        if state {
            let monitor = self
                .window
                .available_monitors()
                .nth(screen_index)
                .or_else(|| self.window.current_monitor());
            self.window.set_fullscreen(Some(Fullscreen::Borderless(monitor)));
        } else {
            self.window.set_fullscreen(None);
        }
    }

    /// Re-center the window on another screen
    pub fn move_to_screen(&self, screen_index: usize) {
        if let Some(monitor) = self.window.available_monitors().nth(screen_index) {
            self.window
                .set_outer_position(centered_position(&monitor, self.width, self.height));
        } else {
            log::warn!("screen {} not available", screen_index);
        }
    }

    /// Ask the platform to resize the window
    pub fn request_resize(&mut self, width: u32, height: u32) {
        if let Some(size) = self.window.request_inner_size(PhysicalSize::new(width, height)) {
            self.width = size.width;
            self.height = size.height;
        } else {
            // The resize completes asynchronously via a Resized event.
            self.width = width;
            self.height = height;
        }
    }

    /// Display modes supported by the current monitor, deduplicated
    pub fn available_resolutions(&self) -> Vec<ScreenResolution> {
        let mut resolutions: Vec<ScreenResolution> = Vec::new();
        if let Some(monitor) = self.window.current_monitor() {
            for mode in monitor.video_modes() {
                let size = mode.size();
                let entry = ScreenResolution {
                    width: size.width,
                    height: size.height,
                };
                if !resolutions.contains(&entry) {
                    resolutions.push(entry);
                }
            }
        }
        resolutions
    }

    /// Check if window was resized since last frame
    pub fn was_resized(&self) -> bool {
        self.resized
    }

    /// Clear the resize flag
    pub fn clear_resize_flag(&mut self) {
        self.resized = false;
    }

    /// Check if close was requested
    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    /// Handle window events
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.width = size.width;
                self.height = size.height;
                self.resized = true;
            }
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            _ => {}
        }
    }

    /// Request a redraw
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

fn centered_position(monitor: &MonitorHandle, width: u32, height: u32) -> PhysicalPosition<i32> {
    let origin = monitor.position();
    let size = monitor.size();
    PhysicalPosition::new(
        origin.x + (size.width.saturating_sub(width) as i32) / 2,
        origin.y + (size.height.saturating_sub(height) as i32) / 2,
    )
}

/// Run a plain event loop, invoking the callback once per frame
pub fn run<F>(event_loop: EventLoop<()>, mut window: Window, mut callback: F)
where
    F: FnMut(&mut Window) + 'static,
{
    event_loop
        .run(move |event, elwt: &EventLoopWindowTarget<()>| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => {
                    window.handle_event(&event);

                    if let WindowEvent::CloseRequested = event {
                        elwt.exit();
                    }
                }
                Event::AboutToWait => {
                    callback(&mut window);
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop failed");
}

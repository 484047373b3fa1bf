use super::*;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub w: u32,
    pub h: u32,
}

impl From<WindowSize> for winit::dpi::PhysicalSize<u32> {
    fn from(value: WindowSize) -> Self {
        Self {
            width: value.w,
            height: value.h,
        }
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for WindowSize {
    fn from(value: winit::dpi::PhysicalSize<u32>) -> Self {
        Self {
            w: value.width,
            h: value.height,
        }
    }
}

pub struct Params<'a> {
    pub title: &'a str,
    pub size: WindowSize,
}

pub struct Window {
    window: Arc<winit::window::Window>,
}

impl Window {
    pub fn create(params: &Params) -> Result<(Self, winit::event_loop::EventLoop<()>)> {
        // Create event loop.
        let event_loop = winit::event_loop::EventLoop::new().context("Creating event loop")?;

        // Build window. The process owns exactly one image resolution for
        // its lifetime, so the window is not resizable.
        let window = winit::window::WindowBuilder::new()
            .with_title(params.title)
            .with_inner_size::<winit::dpi::PhysicalSize<_>>(params.size.into())
            .with_resizable(false)
            .build(&event_loop)
            .context("Building winit window")?;

        // Center window.
        if let Some(monitor) = window.primary_monitor() {
            let (monitor_width, monitor_height) = (monitor.size().width, monitor.size().height);
            info!("Primary monitor dimensions: {monitor_width} x {monitor_height}");
            window.set_outer_position(winit::dpi::PhysicalPosition::new(
                monitor_width.saturating_sub(params.size.w) / 2,
                monitor_height.saturating_sub(params.size.h) / 2,
            ));
        }

        Ok((
            Self {
                window: Arc::new(window),
            },
            event_loop,
        ))
    }

    pub fn handle(&self) -> &winit::window::Window {
        &self.window
    }

    /// Shared handle for the graphics surface, which outlives the borrow
    /// rules of the event loop closure.
    pub fn share(&self) -> Arc<winit::window::Window> {
        self.window.clone()
    }
}

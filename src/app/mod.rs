use super::*;

//
// Modules
//

mod control_flow;
mod frame_state;
mod window;

use control_flow::ControlFlow;
use frame_state::FrameState;

pub(crate) use window::{Window, WindowSize};

//
// Application
//

#[derive(Parser)]
#[command(about = "Real-time path traced spheres under an orbiting camera")]
pub struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}

pub fn run(args: Args) -> Result<()> {
    ensure!(
        args.width > 0 && args.height > 0,
        "image resolution must be non-zero"
    );
    let image_size = (args.width, args.height);

    // Init window.
    let (window, event_loop) = Window::create(&window::Params {
        title: env!("CARGO_PKG_NAME"),
        size: WindowSize {
            w: args.width,
            h: args.height,
        },
    })?;

    // Init graphics backend. Compile and link failures are fatal here;
    // there is nothing to render with without a working pipeline.
    let mut gfx =
        gfx::Gfx::create(window.share(), image_size).context("Initializing graphics backend")?;

    // Init scene and kernel parameters, fixed for the process lifetime.
    let scene = Arc::new(Scene::demo());
    let params = tracer::Params::default();
    let orbit = Orbit::default();
    info!(
        "Rendering {} x {} with {} spheres, {} max bounces",
        args.width,
        args.height,
        scene.sphere_count(),
        params.max_bounces
    );

    // The output image: allocated once, rebound every frame.
    let mut target = Some(RenderTarget::new(image_size));

    let mut frame_state = FrameState::new();
    let started = Instant::now();

    // Main event loop. Each frame dispatches, then presents, strictly in
    // that order; a new dispatch never begins before the previous frame's
    // present has consumed the image.
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);
    event_loop.run(move |event, elwt| {
        if ControlFlow::should_exit(&event) {
            elwt.exit();
            return;
        }

        match event {
            winit::event::Event::AboutToWait => {
                window.handle().request_redraw();
            }

            winit::event::Event::WindowEvent {
                event: winit::event::WindowEvent::RedrawRequested,
                ..
            } => {
                frame_state.update();

                // Update camera from the orbit.
                let time = started.elapsed().as_secs_f32();
                let camera = orbit.camera_at(time);

                // Dispatch the kernel, then hold at the barrier until every
                // work unit has retired.
                let image = target.take().expect("output image is rebound every frame");
                let fence = dispatch::dispatch(scene.clone(), camera, params, image);
                let image = fence.wait();

                // Composite the stable image and the overlay.
                gfx.present(&image, &frame_state.fps_text())
                    .expect("presenting frame");

                target = Some(image);
            }

            _ => (),
        }
    })?;

    Ok(())
}

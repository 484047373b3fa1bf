use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

pub struct ControlFlow;

impl ControlFlow {
    /// The only cancellation point: a pending close signal is checked once
    /// per loop iteration, never mid-frame.
    pub fn should_exit(event: &Event<()>) -> bool {
        let Event::WindowEvent { event, .. } = event else {
            return false;
        };

        match event {
            WindowEvent::CloseRequested => true,
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => true,
            _ => false,
        }
    }
}

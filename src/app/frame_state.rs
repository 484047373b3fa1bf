use super::*;

pub struct FrameState {
    prev: Instant,
    delta: Duration,
    buffer: VecDeque<Duration>,
    frame_count: u64,
    display_elapsed: Duration,
    display_fps: f64,
}

const BUFFER_SIZE: usize = 60;
const TRIGGER_TIME: f32 = 0.5;

impl FrameState {
    pub fn new() -> Self {
        Self {
            prev: Instant::now(),
            delta: Duration::default(),
            buffer: VecDeque::with_capacity(BUFFER_SIZE),
            frame_count: 0,
            display_elapsed: Duration::default(),
            display_fps: 0.0,
        }
    }

    pub fn update(&mut self) {
        self.delta = self.prev.elapsed();
        self.prev = Instant::now();
        self.buffer.push_front(self.delta);
        if self.buffer.len() > BUFFER_SIZE {
            self.buffer.pop_back();
        }

        // The displayed number updates at a slower cadence than the frame
        // rate so it stays readable.
        self.display_elapsed += self.delta;
        if self.display_elapsed.as_secs_f32() > TRIGGER_TIME {
            let sum: f64 = self.buffer.iter().map(Duration::as_secs_f64).sum();
            let avg = sum / self.buffer.len() as f64;
            self.display_fps = avg.recip();
            self.display_elapsed = Duration::default();
        }

        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps_text(&self) -> String {
        format!("FPS: {:.1}", self.display_fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_text_uses_overlay_alphabet() {
        // Every character the overlay font knows; anything else would be
        // silently dropped from the on-screen readout.
        let state = FrameState::new();
        let text = state.fps_text();
        assert!(text.chars().all(|ch| "0123456789FPS:. ".contains(ch)), "{text}");
    }

    #[test]
    fn test_update_counts_frames() {
        let mut state = FrameState::new();
        state.update();
        state.update();
        assert_eq!(state.frame_count(), 2);
        assert!(state.delta() >= Duration::ZERO);
    }
}

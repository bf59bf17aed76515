//! Frame Loop
//!
//! One `tick` per host frame: clear, draw, move the snow, draw again.
//! Rendering failures are reported and the loop carries on with the next
//! frame; nothing in here ever stops the loop.

use crate::camera::SceneCamera;
use crate::particles::ParticleField;
use crate::render::Renderer;
use crate::scene::SceneGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No frame has run yet
    Idle,
    Running,
}

/// Per-frame driver of animation and drawing
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    /// Draw before and after advancing the snow (otherwise only after)
    render_twice: bool,
    frames: u64,
    render_failures: u64,
}

impl FrameLoop {
    pub fn new(render_twice: bool) -> Self {
        Self {
            state: LoopState::Idle,
            render_twice,
            frames: 0,
            render_failures: 0,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[cfg(test)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(test)]
    pub fn render_failures(&self) -> u64 {
        self.render_failures
    }

    /// Run one frame. The first frame after Idle advances by 0 seconds.
    pub fn tick<R: Renderer>(
        &mut self,
        renderer: &mut R,
        scene: &mut SceneGraph,
        snow: &mut ParticleField,
        camera: &SceneCamera,
        elapsed: f32,
    ) {
        let elapsed = match self.state {
            LoopState::Idle => {
                self.state = LoopState::Running;
                0.0
            }
            LoopState::Running => elapsed,
        };

        renderer.clear_buffers();
        if self.render_twice {
            self.render(renderer, scene, camera);
        }
        snow.advance(scene, elapsed);
        self.render(renderer, scene, camera);

        self.frames += 1;
    }

    fn render<R: Renderer>(&mut self, renderer: &mut R, scene: &SceneGraph, camera: &SceneCamera) {
        if let Err(e) = renderer.render(scene, camera) {
            self.render_failures += 1;
            eprintln!(
                "Error rendering scene (frame {}, {} failures so far): {}",
                self.frames, self.render_failures, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::{FallRule, FlakeStyle, SpawnBounds};
    use crate::render::recording::{Call, RecordingRenderer};
    use macroquad::math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        scene: SceneGraph,
        snow: ParticleField,
        camera: SceneCamera,
        renderer: RecordingRenderer,
    }

    fn fixture() -> Fixture {
        let mut scene = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(21);
        let bounds = SpawnBounds { x: [-1.0, 1.0], y: [3.0, 4.0], z: [-1.0, 1.0] };
        let snow = ParticleField::initialize(&mut scene, &mut rng, 3, bounds, FallRule::default(), FlakeStyle::default());
        Fixture {
            scene,
            snow,
            camera: SceneCamera::new(Vec3::new(0.0, -1.0, 5.0), Vec3::ZERO, 30f32.to_radians()),
            renderer: RecordingRenderer::default(),
        }
    }

    impl Fixture {
        fn tick(&mut self, frame_loop: &mut FrameLoop, elapsed: f32) {
            frame_loop.tick(&mut self.renderer, &mut self.scene, &mut self.snow, &self.camera, elapsed);
        }

        fn heights(&self) -> Vec<f32> {
            self.snow.positions(&self.scene).iter().map(|p| p.y).collect()
        }
    }

    #[test]
    fn test_double_render_order() {
        let mut fx = fixture();
        let mut frame_loop = FrameLoop::new(true);
        fx.tick(&mut frame_loop, 0.5);

        let before = fx.heights();
        fx.tick(&mut frame_loop, 0.5);
        let after = fx.heights();

        let second_frame = &fx.renderer.calls[3..];
        assert_eq!(
            second_frame,
            &[Call::Clear, Call::Render(before), Call::Render(after)][..]
        );
    }

    #[test]
    fn test_single_render_order() {
        let mut fx = fixture();
        let mut frame_loop = FrameLoop::new(false);
        fx.tick(&mut frame_loop, 0.0);
        fx.tick(&mut frame_loop, 0.5);

        let after = fx.heights();
        assert_eq!(fx.renderer.calls.len(), 4);
        assert_eq!(fx.renderer.calls[2..], [Call::Clear, Call::Render(after)]);
    }

    #[test]
    fn test_first_tick_does_not_advance() {
        let mut fx = fixture();
        let mut frame_loop = FrameLoop::new(true);
        let start = fx.heights();

        assert_eq!(frame_loop.state(), LoopState::Idle);
        fx.tick(&mut frame_loop, 10.0);
        assert_eq!(frame_loop.state(), LoopState::Running);
        assert_eq!(fx.heights(), start);

        fx.tick(&mut frame_loop, 0.5);
        for (s, h) in start.iter().zip(fx.heights()) {
            assert!((s - h - 0.5).abs() < 1e-5);
        }
        assert_eq!(frame_loop.frames(), 2);
    }

    #[test]
    fn test_render_failure_is_not_fatal() {
        let mut fx = fixture();
        fx.renderer.fail = true;
        let mut frame_loop = FrameLoop::new(true);
        let start = fx.heights();

        for _ in 0..3 {
            fx.tick(&mut frame_loop, 0.25);
        }

        assert_eq!(frame_loop.frames(), 3);
        assert_eq!(frame_loop.render_failures(), 6);
        assert_eq!(fx.renderer.renders(), 6);
        for (s, h) in start.iter().zip(fx.heights()) {
            assert!((s - h - 0.5).abs() < 1e-5);
        }
    }
}

//! Particle Field
//!
//! Falling snow using a fixed-size pool. Every flake is a mesh node in the
//! scene graph; the field only remembers which slots it owns. Flakes fall at
//! a constant speed and teleport back to the ceiling once they drop below the
//! floor, so the pool never grows, shrinks or reallocates after startup.

use macroquad::color::Color;
use macroquad::math::Vec3;
use rand::Rng;
use crate::config::SnowConfig;
use crate::geometry::{palette, Geometry, Material};
use crate::scene::{MeshNode, NodeId, SceneGraph, Transform};

/// Sphere tessellation used for a single flake
const FLAKE_SEGMENTS: u32 = 8;

/// The fall-and-reset rule shared by every flake
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallRule {
    /// Distance units per second
    pub speed: f32,
    /// Strictly below this, a flake is reset
    pub floor: f32,
    /// Reset height
    pub ceiling: f32,
}

impl FallRule {
    /// Next height for a flake at `y` after `elapsed` seconds.
    /// A single comparison against the floor, however far a long frame overshoots it.
    pub fn step(&self, y: f32, elapsed: f32) -> f32 {
        let new_y = y - self.speed * elapsed;
        if new_y < self.floor {
            self.ceiling
        } else {
            new_y
        }
    }
}

impl Default for FallRule {
    fn default() -> Self {
        Self {
            speed: 1.0,
            floor: -1.0,
            ceiling: 5.0,
        }
    }
}

/// Spawn bounds for `ParticleField::initialize`, each half-open [min, max)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBounds {
    pub x: [f32; 2],
    pub y: [f32; 2],
    pub z: [f32; 2],
}

/// Look of a single flake
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlakeStyle {
    pub radius: f32,
    pub color: Color,
}

impl Default for FlakeStyle {
    fn default() -> Self {
        Self {
            radius: 0.01,
            color: palette::WHITE,
        }
    }
}

/// The snowflake pool
pub struct ParticleField {
    /// Scene slots, index 0..count-1
    slots: Vec<NodeId>,
    rule: FallRule,
}

impl ParticleField {
    /// Create `count` flakes with uniformly random positions inside `bounds`
    /// and attach them to the scene.
    pub fn initialize<R: Rng>(
        graph: &mut SceneGraph,
        rng: &mut R,
        count: usize,
        bounds: SpawnBounds,
        rule: FallRule,
        style: FlakeStyle,
    ) -> Self {
        let geometry = graph.add_geometry(Geometry::sphere(style.radius, FLAKE_SEGMENTS, FLAKE_SEGMENTS));
        let material = Material::standard(style.color);

        let mut slots = Vec::with_capacity(count);
        for _ in 0..count {
            let position = Vec3::new(
                random_range(rng, bounds.x),
                random_range(rng, bounds.y),
                random_range(rng, bounds.z),
            );
            let flake = MeshNode::new(geometry, material, Transform::from_position(position));
            slots.push(graph.attach(flake));
        }

        Self { slots, rule }
    }

    /// Build the field described by the snow section of the config.
    /// An unknown colour name (only possible if validation was skipped) falls back to white.
    pub fn from_config<R: Rng>(graph: &mut SceneGraph, rng: &mut R, config: &SnowConfig) -> Self {
        let bounds = SpawnBounds {
            x: config.x_range,
            y: config.y_range,
            z: config.z_range,
        };
        let rule = FallRule {
            speed: config.fall_speed,
            floor: config.floor,
            ceiling: config.ceiling,
        };
        let style = FlakeStyle {
            radius: config.flake_radius,
            color: palette::named(&config.flake_color).unwrap_or(palette::WHITE),
        };
        Self::initialize(graph, rng, config.count, bounds, rule, style)
    }

    /// Move every flake down by `elapsed` seconds of fall.
    /// Zero, negative or non-finite elapsed times leave the field untouched.
    pub fn advance(&mut self, graph: &mut SceneGraph, elapsed: f32) {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return;
        }

        for &id in &self.slots {
            if let Some(flake) = graph.mesh_mut(id) {
                let new_y = self.rule.step(flake.transform.position.y, elapsed);
                flake.transform.set_position_y(new_y);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub fn slots(&self) -> &[NodeId] {
        &self.slots
    }

    #[cfg(test)]
    pub fn rule(&self) -> FallRule {
        self.rule
    }

    /// Current flake positions, in slot order
    #[cfg(test)]
    pub fn positions(&self, graph: &SceneGraph) -> Vec<Vec3> {
        self.slots
            .iter()
            .filter_map(|&id| graph.mesh(id))
            .map(|flake| flake.transform.position)
            .collect()
    }
}

/// Random float in range [min, max)
fn random_range<R: Rng>(rng: &mut R, range: [f32; 2]) -> f32 {
    range[0] + rng.gen::<f32>() * (range[1] - range[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BOUNDS: SpawnBounds = SpawnBounds {
        x: [-5.0, 5.0],
        y: [5.0, 10.0],
        z: [-5.0, 5.0],
    };

    fn field(count: usize, seed: u64) -> (SceneGraph, ParticleField) {
        let mut graph = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let field = ParticleField::initialize(&mut graph, &mut rng, count, BOUNDS, FallRule::default(), FlakeStyle::default());
        (graph, field)
    }

    fn force_y(graph: &mut SceneGraph, id: NodeId, y: f32) {
        if let Some(flake) = graph.mesh_mut(id) {
            flake.transform.set_position_y(y);
        }
    }

    #[test]
    fn test_initialize_within_bounds() {
        let (graph, field) = field(1000, 1);

        assert_eq!(field.len(), 1000);
        assert_eq!(graph.mesh_count(), 1000);
        for p in field.positions(&graph) {
            assert!(p.x >= -5.0 && p.x < 5.0);
            assert!(p.y >= 5.0 && p.y < 10.0);
            assert!(p.z >= -5.0 && p.z < 5.0);
        }
    }

    #[test]
    fn test_seeded_initialization_is_deterministic() {
        let (graph_a, field_a) = field(50, 99);
        let (graph_b, field_b) = field(50, 99);
        assert_eq!(field_a.positions(&graph_a), field_b.positions(&graph_b));
    }

    #[test]
    fn test_advance_zero_is_noop() {
        let (mut graph, mut field) = field(100, 2);
        let before = field.positions(&graph);

        field.advance(&mut graph, 0.0);
        assert_eq!(field.positions(&graph), before);

        field.advance(&mut graph, -1.0);
        field.advance(&mut graph, f32::NAN);
        assert_eq!(field.positions(&graph), before);
    }

    #[test]
    fn test_advance_only_moves_y() {
        let (mut graph, mut field) = field(100, 3);
        let before = field.positions(&graph);

        field.advance(&mut graph, 0.25);
        let after = field.positions(&graph);

        for (b, a) in before.iter().zip(&after) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.z, b.z);
            assert!((b.y - a.y - 0.25).abs() < 1e-5);
        }
        for &id in field.slots() {
            assert_eq!(graph.mesh(id).map(|m| m.transform.rotation), Some(Vec3::ZERO));
        }
    }

    #[test]
    fn test_reset_past_floor() {
        let (mut graph, mut field) = field(1, 4);
        let id = field.slots()[0];

        force_y(&mut graph, id, 5.0);
        field.advance(&mut graph, 6.5);
        // 5 - 6.5 = -1.5 < -1: reset to the ceiling
        assert_eq!(field.positions(&graph)[0].y, 5.0);
    }

    #[test]
    fn test_landing_exactly_on_floor_does_not_reset() {
        let (mut graph, mut field) = field(1, 5);
        let id = field.slots()[0];

        force_y(&mut graph, id, 5.0);
        field.advance(&mut graph, 6.0);
        assert_eq!(field.positions(&graph)[0].y, -1.0);
    }

    #[test]
    fn test_large_hitch_resets_once() {
        let (mut graph, mut field) = field(1, 6);
        let id = field.slots()[0];

        force_y(&mut graph, id, 9.0);
        field.advance(&mut graph, 500.0);
        assert_eq!(field.positions(&graph)[0].y, 5.0);
    }

    #[test]
    fn test_wraparound_stays_in_band() {
        let (mut graph, mut field) = field(1000, 7);
        let rule = field.rule();
        let start: Vec<f32> = field.positions(&graph).iter().map(|p| p.y).collect();
        let mut was_reset = vec![false; field.len()];

        let dt = 1.0 / 60.0;
        let frames = ((10.0 - rule.floor) / (rule.speed * dt)) as usize + 2;
        for _ in 0..frames {
            let before: Vec<f32> = field.positions(&graph).iter().map(|p| p.y).collect();
            field.advance(&mut graph, dt);
            let after: Vec<f32> = field.positions(&graph).iter().map(|p| p.y).collect();

            for i in 0..after.len() {
                if after[i] > before[i] {
                    was_reset[i] = true;
                }
                assert!(after[i] >= rule.floor);
                if was_reset[i] {
                    assert!(after[i] <= rule.ceiling);
                }
            }
        }

        assert!(was_reset.iter().all(|&r| r));
        assert!(start.iter().all(|&y| y >= 5.0));
    }

    #[test]
    fn test_fall_rule_step() {
        let rule = FallRule::default();
        assert_eq!(rule.step(5.0, 6.5), 5.0);
        assert_eq!(rule.step(5.0, 6.0), -1.0);
        assert!((rule.step(2.0, 0.5) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_from_config() {
        let mut graph = SceneGraph::new();
        let mut rng = StdRng::seed_from_u64(8);
        let mut config = SnowConfig::default();
        config.count = 12;
        config.ceiling = 4.0;
        config.flake_color = "orange".to_string();

        let field = ParticleField::from_config(&mut graph, &mut rng, &config);
        assert_eq!(field.len(), 12);
        assert_eq!(field.rule().ceiling, 4.0);
        for &id in field.slots() {
            assert_eq!(graph.mesh(id).map(|m| m.material.color), Some(palette::ORANGE));
        }
    }
}

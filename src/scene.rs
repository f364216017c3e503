// src/scene.rs
// Builds the stock scenario: floor, left wall, seesaw with a welded ball
// holder, a chain of growing dominoes and one ball.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::physics::{AngleLimits, BodyType, Material, PhysicsWorld2D};
use crate::registry::{BoxCollection, EntityRegistry};

/// Structural pieces besides the dominoes: floor, wall, pillar, platform, holder.
pub const FIXED_LAYOUT_PIECES: usize = 5;

/// Scenario geometry in world units. Defaults fit a 16 x 8 m world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLayout {
    pub floor_y: f32,
    pub floor_thickness: f32,
    pub wall_thickness: f32,
    pub material: MaterialDef,

    pub seesaw_pivot: [f32; 2],
    pub pillar_width: f32,
    pub platform_size: [f32; 2],
    /// Hinge limits in degrees.
    pub seesaw_limits_deg: [f32; 2],
    /// Holder center relative to the platform center.
    pub holder_offset: [f32; 2],
    pub holder_size: [f32; 2],

    pub domino_count: usize,
    pub domino_start_x: f32,
    pub domino_gap: f32,
    pub domino_size: [f32; 2],
    /// Per-domino multipliers applied to width and height.
    pub domino_growth: [f32; 2],

    pub ball_radius: f32,
    /// Drop height above the holder center.
    pub ball_drop_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub density: f32,
    pub friction: f32,
}

impl From<MaterialDef> for Material {
    fn from(def: MaterialDef) -> Self {
        Material { density: def.density, friction: def.friction }
    }
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            floor_y: 1.0,
            floor_thickness: 0.5,
            wall_thickness: 0.5,
            material: MaterialDef { density: 1.0, friction: 0.3 },

            seesaw_pivot: [3.5, 2.75],
            pillar_width: 0.3,
            platform_size: [5.0, 0.2],
            seesaw_limits_deg: [-26.0, 45.0],
            holder_offset: [-2.3, 0.2],
            holder_size: [0.2, 0.2],

            domino_count: 10,
            domino_start_x: 7.0,
            domino_gap: 0.6,
            domino_size: [0.1, 0.5],
            domino_growth: [1.08, 1.1],

            ball_radius: 0.15,
            ball_drop_height: 1.5,
        }
    }
}

impl SceneLayout {
    #[inline]
    fn floor_top(&self) -> f32 {
        self.floor_y + self.floor_thickness / 2.0
    }

    /// Bottom-center and size of every domino, left to right.
    pub fn domino_placements(&self) -> Vec<(Vector2<f32>, Vector2<f32>)> {
        let mut size = Vector2::from(self.domino_size);
        let mut x = self.domino_start_x;
        let mut out = Vec::with_capacity(self.domino_count);
        for _ in 0..self.domino_count {
            out.push((Vector2::new(x, self.floor_top()), size));
            x += self.domino_gap + size.x;
            size = size.component_mul(&Vector2::from(self.domino_growth));
        }
        out
    }
}

/// What `build_layout` actually created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutSummary {
    pub layout_boxes: usize,
    pub joints: usize,
    pub balls: usize,
}

impl LayoutSummary {
    /// Expected layout boxes for `domino_count` dominoes.
    pub const fn expected_boxes(domino_count: usize) -> usize {
        FIXED_LAYOUT_PIECES + domino_count
    }
}

/// Populates an empty world. Pieces that do not fit their collection are
/// skipped, and anything joined to a skipped piece is skipped with it.
pub fn build_layout(
    world: &mut PhysicsWorld2D,
    registry: &mut EntityRegistry,
    world_size: Vector2<f32>,
    layout: &SceneLayout,
) -> LayoutSummary {
    let before = registry.counts();
    let material = Material::from(layout.material);
    let layout_box = |registry: &mut EntityRegistry, world: &mut PhysicsWorld2D, pos, size, body_type| {
        registry.create_box(world, BoxCollection::Layout, pos, size, material, body_type)
    };

    // floor
    layout_box(
        registry,
        world,
        Vector2::new(world_size.x / 2.0, layout.floor_y),
        Vector2::new(2.0 * world_size.x, layout.floor_thickness),
        BodyType::Static,
    );
    // left wall
    layout_box(
        registry,
        world,
        Vector2::new(0.0, world_size.y / 2.0),
        Vector2::new(layout.wall_thickness, world_size.y),
        BodyType::Static,
    );

    // seesaw: pillar from the floor up to the pivot, platform hinged on top
    let pivot = Vector2::from(layout.seesaw_pivot);
    let pillar_height = (pivot.y - layout.floor_top()).max(0.0);
    let pillar = registry.create_box_anchored_at_bottom(
        world,
        BoxCollection::Layout,
        Vector2::new(pivot.x, layout.floor_top()),
        Vector2::new(layout.pillar_width, pillar_height),
        material,
        BodyType::Static,
    );
    let platform = layout_box(registry, world, pivot, Vector2::from(layout.platform_size), BodyType::Dynamic);

    let holder_center = pivot + Vector2::from(layout.holder_offset);
    if let (Some(pillar), Some(platform)) = (pillar, platform) {
        let [lower, upper] = layout.seesaw_limits_deg;
        registry.create_joint(world, pillar.body, platform.body, Point2::from(pivot), AngleLimits::degrees(lower, upper));

        if let Some(holder) = layout_box(registry, world, holder_center, Vector2::from(layout.holder_size), BodyType::Dynamic) {
            registry.create_joint(world, platform.body, holder.body, Point2::from(holder_center), AngleLimits::weld());
        }
    }

    for (bottom_center, size) in layout.domino_placements() {
        registry.create_box_anchored_at_bottom(world, BoxCollection::Layout, bottom_center, size, material, BodyType::Dynamic);
    }

    let ball_pos = holder_center + Vector2::new(0.0, layout.ball_drop_height);
    registry.create_ball(world, ball_pos, layout.ball_radius, material, BodyType::Dynamic);

    let after = registry.counts();
    let summary = LayoutSummary {
        layout_boxes: after.layout_boxes - before.layout_boxes,
        joints: after.joints - before.joints,
        balls: after.balls - before.balls,
    };
    log::debug!("Built layout in {:?} world: {:?}", world_size, summary);
    summary
}

use glam::{Affine2, Vec2};
use rusty_spine::controller::SkeletonController;
use rusty_spine::Skeleton;

use crate::bounds::{BoundsProvider, SetupPoseBoundsProvider};
use crate::math::{self, Rect};
use crate::scene::{fill_draw_buffer, DrawBuffer};
use crate::SpineAsset;

/// Synchronous run-to-completion callback around the world transform pass.
pub type PoseHook = Box<dyn FnMut(&mut Skeleton)>;

#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Visibility {
    pub visible: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self { visible: true }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Alpha {
    pub alpha: f32,
}

impl Default for Alpha {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Flip {
    pub x: bool,
    pub y: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ScrollFactor {
    pub x: f32,
    pub y: f32,
}

impl Default for ScrollFactor {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Depth {
    pub depth: f32,
}

/// Scene object hosting one skeleton instance. Placement, visibility, alpha,
/// flip, scroll factor and depth are independent sub-states the host's
/// update and render loops read directly.
pub struct SpineObject {
    pub asset: Option<SpineAsset>,
    pub controller: Option<SkeletonController>,

    pub placement: Placement,
    pub visibility: Visibility,
    pub alpha: Alpha,
    pub flip: Flip,
    pub scroll_factor: ScrollFactor,
    pub depth: Depth,

    pub bounds_provider: Box<dyn BoundsProvider>,
    pub before_update_world_transform: Option<PoseHook>,
    pub after_update_world_transform: Option<PoseHook>,

    pub world_transform: Affine2,
    buffer: DrawBuffer,
}

impl SpineObject {
    pub const TYPE: &'static str = "spine";

    pub fn new(
        asset: SpineAsset,
        controller: SkeletonController,
        bounds_provider: Box<dyn BoundsProvider>,
    ) -> Self {
        Self {
            asset: Some(asset),
            controller: Some(controller),
            placement: Placement::default(),
            visibility: Visibility::default(),
            alpha: Alpha::default(),
            flip: Flip::default(),
            scroll_factor: ScrollFactor::default(),
            depth: Depth::default(),
            bounds_provider,
            before_update_world_transform: None,
            after_update_world_transform: None,
            world_transform: Affine2::IDENTITY,
            buffer: DrawBuffer::default(),
        }
    }

    /// An object with no skeleton bound yet. Pose updates no-op and bounds
    /// collapse to zero until a skeleton arrives.
    pub fn empty() -> Self {
        Self {
            asset: None,
            controller: None,
            placement: Placement::default(),
            visibility: Visibility::default(),
            alpha: Alpha::default(),
            flip: Flip::default(),
            scroll_factor: ScrollFactor::default(),
            depth: Depth::default(),
            bounds_provider: Box::new(SetupPoseBoundsProvider),
            before_update_world_transform: None,
            after_update_world_transform: None,
            world_transform: Affine2::IDENTITY,
            buffer: DrawBuffer::default(),
        }
    }

    pub fn update(&mut self, delta: f32) {
        self.sync_transform();
        self.update_pose(delta);
    }

    pub fn sync_transform(&mut self) {
        let scale = Vec2::new(
            self.placement.scale.x * if self.flip.x { -1.0 } else { 1.0 },
            self.placement.scale.y * if self.flip.y { -1.0 } else { 1.0 },
        );
        self.world_transform = Affine2::from_scale_angle_translation(
            scale,
            self.placement.rotation,
            self.placement.position,
        );
    }

    /// Per-frame pose pass, strictly ordered: advance playback, apply it to
    /// the skeleton, run the before hook, recompute world transforms, run
    /// the after hook. Hooks cannot abort the frame.
    pub fn update_pose(&mut self, delta: f32) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        controller.animation_state.update(delta);
        controller.animation_state.apply(&mut controller.skeleton);
        if let Some(hook) = self.before_update_world_transform.as_mut() {
            hook(&mut controller.skeleton);
        }
        controller.skeleton.update_world_transform();
        if let Some(hook) = self.after_update_world_transform.as_mut() {
            hook(&mut controller.skeleton);
        }
    }

    /// Rebuilds and exposes the draw buffer, or None when the object is
    /// hidden or has no skeleton.
    pub fn draw(&mut self) -> Option<&DrawBuffer> {
        if !self.visibility.visible {
            return None;
        }
        let controller = self.controller.as_ref()?;
        fill_draw_buffer(&controller.skeleton, &mut self.buffer);
        Some(&self.buffer)
    }

    pub fn calculate_bounds(&self) -> Rect {
        self.bounds_provider.calculate_bounds(self)
    }

    /// Maps a point from skeleton space into engine world space.
    pub fn to_world(&self, point: Vec2) -> Vec2 {
        math::to_world(&self.world_transform, point)
    }

    /// Maps an engine world space point back into skeleton space.
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        math::to_local(&self.world_transform, point)
    }

    /// Maps a world space point into the local space of a named bone; the
    /// bone's parent does the conversion, the bone itself at the root.
    pub fn to_bone_local(&self, point: Vec2, bone: &str) -> Option<Vec2> {
        let controller = self.controller.as_ref()?;
        let local = self.to_local(point);
        let bone = controller.skeleton.find_bone(bone)?;
        let converted = match bone.parent() {
            Some(parent) => math::world_matrix_to_local(
                parent.a(),
                parent.b(),
                parent.c(),
                parent.d(),
                parent.world_x(),
                parent.world_y(),
                local,
            ),
            None => math::world_matrix_to_local(
                bone.a(),
                bone.b(),
                bone.c(),
                bone.d(),
                bone.world_x(),
                bone.world_y(),
                local,
            ),
        };
        Some(converted)
    }
}

use std::collections::HashSet;

use glam::Vec2;
use log::{error, warn};
use rusty_spine::{AnimationState, Attachment, AttachmentType, Skeleton, Slot};

use crate::math::Rect;
use crate::scene::SpineObject;

pub const DEFAULT_TIME_STEP: f32 = 0.05;

/// Strategy computing an axis-aligned bounding rectangle for the skeleton of
/// a scene object. Providers work on a transient skeleton built from the
/// shared data, never on the live instance, so a running animation is not
/// disturbed.
pub trait BoundsProvider {
    fn calculate_bounds(&self, object: &SpineObject) -> Rect;
}

/// Bounds of the rest pose.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetupPoseBoundsProvider;

impl BoundsProvider for SetupPoseBoundsProvider {
    fn calculate_bounds(&self, object: &SpineObject) -> Rect {
        let Some(asset) = object.asset.as_ref() else {
            return Rect::ZERO;
        };
        let mut skeleton = Skeleton::new(asset.skeleton.clone());
        skeleton.set_to_setup_pose();
        skeleton.update_world_transform();
        collapse(skeleton_rect(&skeleton, &[]))
    }
}

/// Bounds of an animation's playback, sampled at fixed time steps over the
/// selected skins and folded into one rectangle. Without an animation name it
/// degrades to a single rest pose sample.
#[derive(Debug, Clone)]
pub struct SkinsAndAnimationBoundsProvider {
    pub animation: Option<String>,
    pub skins: Vec<String>,
    pub time_step: f32,
}

impl SkinsAndAnimationBoundsProvider {
    pub fn new(animation: Option<&str>, skins: Vec<String>) -> Self {
        Self {
            animation: animation.map(|name| name.to_string()),
            skins,
            time_step: DEFAULT_TIME_STEP,
        }
    }

    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }
}

impl BoundsProvider for SkinsAndAnimationBoundsProvider {
    fn calculate_bounds(&self, object: &SpineObject) -> Rect {
        let Some(asset) = object.asset.as_ref() else {
            return Rect::ZERO;
        };
        let mut skeleton = Skeleton::new(asset.skeleton.clone());
        let mut state = AnimationState::new(asset.animation.clone());
        skeleton.set_to_setup_pose();

        let duration = self.animation.as_deref().and_then(|name| {
            match asset.skeleton.find_animation(name) {
                Some(animation) => Some(animation.duration()),
                None => {
                    warn!("Skip bounds animation {}, not found", name);
                    None
                }
            }
        });
        let Some(duration) = duration else {
            skeleton.update_world_transform();
            return collapse(skeleton_rect(&skeleton, &self.skins));
        };

        let name = self.animation.as_deref().unwrap_or_default();
        state.clear_tracks();
        if let Err(error) = state.set_animation_by_name(0, name, false) {
            error!("Unable to sample animation {}, {:?}", name, error);
            skeleton.update_world_transform();
            return collapse(skeleton_rect(&skeleton, &self.skins));
        }

        let steps = (duration / self.time_step).max(1.0).ceil() as usize;
        let mut accumulator = BoundsAccumulator::new();
        for step in 0..steps {
            // step 0 captures the pose at t=0 before any time passes
            let elapsed = if step == 0 { 0.0 } else { self.time_step };
            state.update(elapsed);
            state.apply(&mut skeleton);
            skeleton.update_world_transform();
            accumulator.fold(skeleton_rect(&skeleton, &self.skins));
        }
        accumulator.finish()
    }
}

/// Running min/max fold over per-sample rectangles.
pub struct BoundsAccumulator {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    pub fn fold(&mut self, sample: Rect) {
        self.min_x = self.min_x.min(sample.x);
        self.min_y = self.min_y.min(sample.y);
        // The max corner grows from the running origin, not the sample's own.
        // TODO: fold sample.x + sample.width instead once bounds consumers are audited
        self.max_x = self.max_x.max(self.min_x + sample.width);
        self.max_y = self.max_y.max(self.min_y + sample.height);
    }

    pub fn finish(&self) -> Rect {
        collapse(Rect {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x,
            height: self.max_y - self.min_y,
        })
    }
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

fn collapse(rect: Rect) -> Rect {
    if rect.is_degenerate() {
        Rect::ZERO
    } else {
        rect
    }
}

/// Bounding rectangle of the skeleton's current pose. Named skins act like a
/// combined skin bound on top of the current pose: their attachment entries
/// override the covered slots, every other slot contributes its live
/// attachment. Skin names the rig does not define are skipped.
fn skeleton_rect(skeleton: &Skeleton, skins: &[String]) -> Rect {
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    let mut covered = HashSet::new();
    let data = skeleton.data();
    for name in skins {
        match data.find_skin(name) {
            Some(skin) => {
                for entry in skin.attachments() {
                    covered.insert(entry.slot_index);
                    let slot = match skeleton.slot_at_index(entry.slot_index) {
                        Some(slot) => slot,
                        None => continue,
                    };
                    if !slot.bone().active() {
                        continue;
                    }
                    fold_attachment(&slot, &entry.attachment, &mut min, &mut max);
                }
            }
            None => warn!("Skip unknown skin {}", name),
        }
    }
    for index in 0..skeleton.slots_count() {
        if covered.contains(&index) {
            continue;
        }
        let slot = match skeleton.slot_at_index(index) {
            Some(slot) => slot,
            None => continue,
        };
        if !slot.bone().active() {
            continue;
        }
        if let Some(attachment) = slot.attachment() {
            fold_attachment(&slot, &attachment, &mut min, &mut max);
        }
    }
    Rect {
        x: min.x,
        y: min.y,
        width: max.x - min.x,
        height: max.y - min.y,
    }
}

fn fold_attachment(slot: &Slot, attachment: &Attachment, min: &mut Vec2, max: &mut Vec2) {
    match attachment.attachment_type() {
        AttachmentType::Region => {
            let region = match attachment.as_region() {
                Some(region) => region,
                None => return,
            };
            let mut world = vec![0.0; 8];
            unsafe {
                region.compute_world_vertices(slot, &mut world, 0, 2);
            }
            fold_vertices(&world, min, max);
        }
        AttachmentType::Mesh => {
            let mesh = match attachment.as_mesh() {
                Some(mesh) => mesh,
                None => return,
            };
            let count = mesh.world_vertices_length() as usize;
            let mut world = vec![0.0; count];
            unsafe {
                mesh.compute_world_vertices(slot, 0, count as i32, &mut world, 0, 2);
            }
            fold_vertices(&world, min, max);
        }
        AttachmentType::Point => {}
        _ => {}
    }
}

fn fold_vertices(vertices: &[f32], min: &mut Vec2, max: &mut Vec2) {
    for point in vertices.chunks_exact(2) {
        min.x = min.x.min(point[0]);
        min.y = min.y.min(point[1]);
        max.x = max.x.max(point[0]);
        max.y = max.y.max(point[1]);
    }
}

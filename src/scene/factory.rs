use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::{AssetError, Assets};
use crate::bounds::{BoundsProvider, SetupPoseBoundsProvider};
use crate::scene::{SpineContainer, SpineObject};

/// Canonical construction record. The positional spec resolves into this
/// with default placement options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpineObjectConfig {
    pub x: f32,
    pub y: f32,
    pub skeleton: String,
    pub atlas: String,
    pub rotation: f32,
    pub scale: [f32; 2],
    pub alpha: f32,
    pub visible: bool,
    pub depth: f32,
    pub flip: [bool; 2],
    pub scroll_factor: [f32; 2],
}

impl Default for SpineObjectConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            skeleton: String::new(),
            atlas: String::new(),
            rotation: 0.0,
            scale: [1.0, 1.0],
            alpha: 1.0,
            visible: true,
            depth: 0.0,
            flip: [false, false],
            scroll_factor: [1.0, 1.0],
        }
    }
}

/// The two construction surfaces the host registers: positional arguments or
/// a config record. Both collapse into one canonical record at the boundary.
#[derive(Debug, Clone)]
pub enum SpineObjectSpec {
    Position {
        x: f32,
        y: f32,
        skeleton: String,
        atlas: String,
    },
    Config(SpineObjectConfig),
}

impl SpineObjectSpec {
    pub fn position(x: f32, y: f32, skeleton: &str, atlas: &str) -> Self {
        Self::Position {
            x,
            y,
            skeleton: skeleton.to_string(),
            atlas: atlas.to_string(),
        }
    }

    pub fn resolve(self) -> SpineObjectConfig {
        match self {
            SpineObjectSpec::Position {
                x,
                y,
                skeleton,
                atlas,
            } => SpineObjectConfig {
                x,
                y,
                skeleton,
                atlas,
                ..SpineObjectConfig::default()
            },
            SpineObjectSpec::Config(config) => config,
        }
    }
}

/// Builds a scene object from installed cache entries. The skeleton instance
/// is exclusively owned by the new object; the data behind it stays shared.
pub fn create_spine_object(
    assets: &mut Assets,
    spec: SpineObjectSpec,
    bounds_provider: Option<Box<dyn BoundsProvider>>,
) -> Result<SpineObject, AssetError> {
    let config = spec.resolve();
    let asset = assets.skeleton_data(&config.skeleton, &config.atlas)?;
    let controller = assets.create_skeleton(&config.skeleton, &config.atlas)?;
    let provider = bounds_provider.unwrap_or_else(|| Box::new(SetupPoseBoundsProvider));
    let mut object = SpineObject::new(asset, controller, provider);
    object.placement.position = Vec2::new(config.x, config.y);
    object.placement.rotation = config.rotation;
    object.placement.scale = Vec2::new(config.scale[0], config.scale[1]);
    object.alpha.alpha = config.alpha;
    object.visibility.visible = config.visible;
    object.depth.depth = config.depth;
    object.flip.x = config.flip[0];
    object.flip.y = config.flip[1];
    object.scroll_factor.x = config.scroll_factor[0];
    object.scroll_factor.y = config.scroll_factor[1];
    object.sync_transform();
    Ok(object)
}

pub fn create_spine_container(
    assets: &mut Assets,
    specs: Vec<SpineObjectSpec>,
) -> Result<SpineContainer, AssetError> {
    let mut container = SpineContainer::new();
    for spec in specs {
        container.add(create_spine_object(assets, spec, None)?);
    }
    Ok(container)
}

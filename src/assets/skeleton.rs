use std::sync::Arc;

use rusty_spine::{AnimationStateData, SkeletonData};
use serde_json::Value;

use crate::assets::{Asset, AtlasAsset};

pub type SpineAsset = Asset<SpineAssetData>;
pub type SkeletonJsonAsset = Asset<SkeletonJsonData>;
pub type SkeletonBinaryAsset = Asset<SkeletonBinaryData>;

/// Parsed, atlas-bound rig definition. Immutable once built, shared read-only
/// by every skeleton instance created from it.
pub struct SpineAssetData {
    pub skeleton: Arc<SkeletonData>,
    pub animation: Arc<AnimationStateData>,
    pub atlas: AtlasAsset,
}

/// Decoded skeleton JSON cache entry. The document proves the payload decodes
/// at install time; the runtime parser wants the raw source back.
pub struct SkeletonJsonData {
    pub key: String,
    pub document: Value,
    pub source: Vec<u8>,
}

pub struct SkeletonBinaryData {
    pub key: String,
    pub source: Vec<u8>,
}

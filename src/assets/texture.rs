use crate::assets::Asset;

pub type TextureAsset = Asset<TextureAssetData>;

/// Raw page image bytes registered under a per-atlas key. Decoding and GPU
/// upload belong to the host engine, the cache entry only owns the download.
#[derive(Clone)]
pub struct TextureAssetData {
    pub key: String,
    pub data: Vec<u8>,
}

impl TextureAssetData {
    pub fn new(key: String, data: Vec<u8>) -> Self {
        Self { key, data }
    }
}

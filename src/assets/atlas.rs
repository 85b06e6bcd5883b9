use std::path::PathBuf;

use crate::assets::{Asset, TextureAsset};

pub type AtlasAsset = Asset<AtlasAssetData>;

/// In-band marker the atlas exporter writes when page images were packed
/// with premultiplied alpha.
pub const PMA_MARKER: &str = "pma: true";

pub struct AtlasPage {
    pub name: String,
    pub texture: TextureAsset,
}

/// Parsed texture atlas cache entry: the descriptor source, the directory it
/// was loaded from (page images and the runtime parser resolve against it),
/// the ordered page list and the resolved premultiplied alpha flag.
pub struct AtlasAssetData {
    pub key: String,
    pub source: Vec<u8>,
    pub directory: PathBuf,
    pub pages: Vec<AtlasPage>,
    pub premultiplied_alpha: bool,
}

/// Discovers page image filenames in an atlas descriptor. The first line
/// names a page when it is a filename; every further page block is separated
/// from the previous one by a blank line, so a blank line followed by a
/// filename line names the next page image.
pub fn parse_page_names(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut names = Vec::new();
    if let Some(first) = lines.first() {
        if is_page_name(first) {
            names.push(first.trim().to_string());
        }
    }
    for index in 1..lines.len() {
        if lines[index - 1].trim().is_empty() && is_page_name(lines[index]) {
            names.push(lines[index].trim().to_string());
        }
    }
    names
}

/// A page name is a filename with some extension; `key: value` property lines
/// and bare region names are not. The image format is the host's concern.
fn is_page_name(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.contains(':') {
        return false;
    }
    match line.rsplit_once('.') {
        Some((stem, extension)) => !stem.is_empty() && !extension.is_empty(),
        None => false,
    }
}

/// Resolution rule for the premultiplied alpha flag: an explicit true wins,
/// otherwise the in-band marker decides. An explicit false does NOT override
/// a marker found in the descriptor body.
pub fn resolve_premultiplied_alpha(explicit: Option<bool>, text: &str) -> bool {
    explicit.unwrap_or(false) || text.contains(PMA_MARKER)
}

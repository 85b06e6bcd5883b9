pub use atlas::*;
pub use generic::*;
pub use manager::*;
pub use skeleton::*;
pub use texture::*;

mod atlas;
mod generic;
pub mod loader;
mod manager;
mod skeleton;
mod texture;

/// Cache namespace tags, used as metric labels and log prefixes.
pub const SKELETON_DATA_CACHE: &str = "spine.skeleton";
pub const ATLAS_CACHE: &str = "spine.atlas";
pub const TEXTURE_CACHE: &str = "spine.texture";

/// File type tags distinguishing the two skeleton payload encodings.
pub const FILE_TYPE_JSON: &str = "spine.json";
pub const FILE_TYPE_BINARY: &str = "spine.binary";

pub use assets::*;
pub use bounds::*;
pub use math::*;
pub use scene::*;

pub mod assets;
pub mod bounds;
pub mod math;
pub mod scene;

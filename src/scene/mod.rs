pub use container::*;
pub use draw::*;
pub use factory::*;
pub use node::*;

mod container;
mod draw;
mod factory;
mod node;

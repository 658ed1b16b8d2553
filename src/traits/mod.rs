pub mod camera;
pub mod document;
pub mod element;
pub mod frame;
pub mod scene;

pub use camera::*;
pub use document::*;
pub use element::*;
pub use frame::*;
pub use scene::*;

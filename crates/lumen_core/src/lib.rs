pub use glam;

pub mod config;
pub mod transform;

pub use config::LoaderConfig;
pub use transform::Transform;

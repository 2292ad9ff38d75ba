mod animation;
mod camera;
mod component;
mod config;
mod error;
mod generator;
mod host;
mod pointer;
mod render;
mod scheduler;
mod types;

pub use component::NetworkMeshCanvas;
pub use config::MeshConfig;
pub use scheduler::WindowListener;
pub use types::Theme;

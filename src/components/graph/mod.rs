mod component;
mod render;
pub mod state;
mod textures;

pub use component::GraphCanvas;
pub use state::GraphState;

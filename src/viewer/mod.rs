pub mod gui;
pub mod input;
pub mod scene;
pub mod timestep;

pub use gui::Overlay;
pub use input::{CursorChange, InputFrame, InputState};
pub use scene::Scene;
pub use timestep::FixedTimestep;

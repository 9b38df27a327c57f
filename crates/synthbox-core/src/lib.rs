pub mod app;
pub mod audio_graph;
pub mod buttons;
pub mod dispatcher;
pub mod display;
pub mod program;
pub mod reconciler;
pub mod serial;
pub mod shutdown;
pub mod subsystem;

pub use app::*;
pub use audio_graph::*;
pub use buttons::*;
pub use dispatcher::*;
pub use display::*;
pub use program::*;
pub use reconciler::*;
pub use serial::*;
pub use shutdown::*;
pub use subsystem::*;

pub mod audio;
pub mod midi;
pub mod panel;
pub mod storage;
pub mod synth;
pub mod types;

pub use audio::*;
pub use midi::*;
pub use panel::*;
pub use storage::*;
pub use synth::*;
pub use types::*;

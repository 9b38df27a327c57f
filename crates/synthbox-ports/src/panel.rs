#[derive(thiserror::Error, Debug)]
pub enum PanelError {
    #[error("io error: {0}")]
    Io(String),
    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelButton {
    ProgramDown,
    ProgramUp,
}

/// Momentary front-panel buttons, read by polling.
pub trait ButtonPanel: Send {
    fn is_pressed(&mut self, button: PanelButton) -> Result<bool, PanelError>;
}

/// Short text display (4 characters on the reference hardware).
pub trait DisplayPort: Send {
    fn show(&mut self, text: &str) -> Result<(), PanelError>;
}

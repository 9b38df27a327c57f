use std::sync::atomic::{AtomicU8, Ordering};
use synthbox_ports::types::MAX_PROGRAM;

/// The active instrument program (0..=127), shared by every input source.
#[derive(Debug, Default)]
pub struct CurrentProgram {
    value: AtomicU8,
}

impl CurrentProgram {
    pub fn new(program: u8) -> Self {
        Self {
            value: AtomicU8::new(program & MAX_PROGRAM),
        }
    }

    pub fn get(&self) -> u8 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn set(&self, program: u8) {
        self.value.store(program & MAX_PROGRAM, Ordering::Relaxed);
    }

    /// Steps up one program, wrapping 127 to 0. Returns the new value.
    pub fn increment(&self) -> u8 {
        self.update(|p| if p >= MAX_PROGRAM { 0 } else { p + 1 })
    }

    /// Steps down one program, wrapping 0 to 127. Returns the new value.
    pub fn decrement(&self) -> u8 {
        self.update(|p| if p == 0 { MAX_PROGRAM } else { p - 1 })
    }

    fn update(&self, step: impl Fn(u8) -> u8) -> u8 {
        let previous = self
            .value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |p| Some(step(p)))
            .unwrap_or_else(|p| p);
        step(previous)
    }
}

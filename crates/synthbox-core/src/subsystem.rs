use crate::shutdown::Shutdown;
use std::thread;
use tracing::{info, warn};

/// An optional input/output loop that runs on its own thread until shutdown.
pub trait Subsystem: Send {
    fn name(&self) -> &'static str;
    fn run(self: Box<Self>, shutdown: Shutdown);

    /// Whether shutdown waits for this loop. Loops that can sit in a blocking
    /// read return false and are left to end with the process.
    fn joins_on_shutdown(&self) -> bool {
        true
    }
}

/// Stand-in for a subsystem switched off in settings.
pub struct Disabled(pub &'static str);

impl Subsystem for Disabled {
    fn name(&self) -> &'static str {
        self.0
    }

    fn run(self: Box<Self>, _shutdown: Shutdown) {}
}

/// A started subsystem thread.
pub struct SubsystemHandle {
    pub name: &'static str,
    pub joins_on_shutdown: bool,
    pub handle: thread::JoinHandle<()>,
}

pub fn spawn_subsystem(
    subsystem: Box<dyn Subsystem>,
    shutdown: Shutdown,
) -> Option<SubsystemHandle> {
    let name = subsystem.name();
    let joins_on_shutdown = subsystem.joins_on_shutdown();
    let spawned = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || subsystem.run(shutdown));
    match spawned {
        Ok(handle) => {
            info!("started {}", name);
            Some(SubsystemHandle {
                name,
                joins_on_shutdown,
                handle,
            })
        }
        Err(err) => {
            warn!("failed to start {}: {}", name, err);
            None
        }
    }
}

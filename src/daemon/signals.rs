use signal_hook::consts::{SIGINT, SIGTERM};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use crate::error::{Error, Result};

/// Raises `stop` on SIGINT or SIGTERM. The loop notices it at the next cycle
/// boundary and shuts down through the normal path, so the store is closed.
pub fn setup_signal_handlers(stop: &Arc<AtomicBool>) -> Result<()> {
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(stop))
            .map_err(|e| Error::Daemon(format!("Failed to setup signal handlers: {}", e)))?;
    }
    Ok(())
}

//! Core infrastructure module for Pure Rust XGBoost.
//!
//! This module provides the building blocks shared by every other module:
//! - Error types and handling (`error`)
//! - Scalar aliases and enums (`types`)
//! - Default values and engine constants (`constants`)
//! - Objective and metric traits (`traits`)
//! - Console/tracker logger setup (`logging`)

pub mod constants;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::*;
pub use logging::{init_logging, LogConfig, Verbosity, CONSOLE_TARGET, TRACKER_TARGET};
pub use traits::*;
pub use types::*;

/// Initialize the core module: installs the default logger.
pub fn initialize_core() -> Result<()> {
    if init_logging(&LogConfig::default()) {
        log::debug!("Logger installed");
    }
    log::debug!("Core module initialized with {} worker threads", resolve_num_threads(0));
    Ok(())
}

/// Resolve a thread-count parameter; zero means every logical core.
pub fn resolve_num_threads(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get().max(1)
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_initialization() {
        assert!(initialize_core().is_ok());
        assert!(initialize_core().is_ok());
    }

    #[test]
    fn test_resolve_num_threads() {
        assert!(resolve_num_threads(0) >= 1);
        assert_eq!(resolve_num_threads(3), 3);
    }
}

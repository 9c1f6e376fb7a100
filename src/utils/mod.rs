//! Supporting utilities
//!
//! # Modules
//!
//! - [`diagnostics`] - Colored operator diagnostics mirrored into tracing
//! - [`fs`] - Atomic writes for report artifacts

pub mod diagnostics;
pub mod fs;

pub use diagnostics::Diagnostics;
pub use fs::{atomic_write, ensure_dir};

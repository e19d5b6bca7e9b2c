//! Host platform model for hostrun.
//!
//! This module handles:
//! - Host kinds and their identification
//! - Per-host descriptors (paths, executable names, protected processes)
//! - The registry that activates exactly one host platform per run

mod builtin;
pub mod descriptor;
pub mod kind;
pub mod registry;

pub use descriptor::{CtrlHandlerSupport, HostDescriptor, UserFolders};
pub use kind::HostKind;
pub use registry::{HostPlatform, HostRegistry};

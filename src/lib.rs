//! Hostrun - host platform adaptation layer for build automation.
//!
//! Build scripts describe the commands they want to run once; this library
//! adapts them to the host they actually run on. It provides:
//! - Host descriptors: binaries folder, log folder, version-control client,
//!   debug-symbol extension, protected process names
//! - A command rewriter applying ordered per-host rules to an invocation
//! - A registry activating exactly one host platform per run
//! - Configuration cascade and configured rules layered on the built-in ones
//! - A process launch boundary for the rewritten invocation
//!
//! # Example
//!
//! ```
//! use hostrun_cli::host::{HostKind, HostRegistry, UserFolders};
//! use hostrun_cli::invocation::{Invocation, RunOptions};
//!
//! let folders = UserFolders::from_home("/home/builder");
//! let platform = HostRegistry::builtin(&folders)
//!     .activate(HostKind::Linux)
//!     .unwrap();
//!
//! let out = platform.rewrite(Invocation::new("Tool.exe", "-run", RunOptions::DEFAULT));
//! assert_eq!(out.executable, "mono");
//! assert_eq!(out.arguments, "\"Tool.exe\" -run");
//! ```

pub mod config;
pub mod error;
pub mod exec;
pub mod host;
pub mod invocation;
pub mod logging;
pub mod rules;

pub use error::{HostrunError, Result};
pub use host::{HostDescriptor, HostKind, HostPlatform, HostRegistry};
pub use invocation::{Invocation, RunOptions};

//! Command rewriting for hostrun.
//!
//! This module handles:
//! - The built-in, ordered per-host rewrite rules
//! - Configured rules matched by regex and applied with sed-like substitutions
//! - The command rewriter that chains both

pub mod host_rules;
pub mod matcher;
pub mod rewriter;
pub mod substitution;

pub use host_rules::{DriverFlags, RewriteProfile, RewriteRule};
pub use matcher::{CompiledRule, compile_rules, find_matching_rule};
pub use rewriter::{CommandRewriter, RewriteOutcome};
pub use substitution::Substitution;

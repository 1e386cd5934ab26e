//! Request admission controls.
//!
//! # Design Decisions
//! - Limits are attached per route, not globally
//! - Rejections answer 429 and are counted in metrics

pub mod rate_limit;

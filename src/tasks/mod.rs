//! Background Tasks Module
//!
//! Contains the jobs that run outside of caller requests.
//!
//! # Tasks
//! - Sweeper: Removes expired cache entries at a fixed interval
//! - Warmup: Populates the cache once at startup

mod sweeper;
mod warmup;

pub use sweeper::{spawn_sweeper, SweeperHandle};
pub use warmup::{warm_up, WarmupReport};

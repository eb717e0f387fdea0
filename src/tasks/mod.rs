//! Background Tasks Module
//!
//! Hosts the expiry sweeper thread that collects expired entries
//! between cache touches.

mod sweeper;

pub(crate) use sweeper::{spawn_sweeper, SweeperGuard};

//! Internal solvers.

pub mod optimize;

pub mod backend;
pub mod config;
pub mod executor;
pub mod outcome;
pub mod pages;
pub mod probe;
pub mod resolution;
pub mod session;

pub use fresh_common::error;
pub use fresh_common::fixtures;
pub use fresh_common::protocol;

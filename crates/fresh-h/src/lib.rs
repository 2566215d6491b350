//! Headless Chromium provider for the fresh engine, driven over CDP.

pub mod backend;
pub mod cdp;
pub mod eval;
pub mod scripts;

pub use backend::HeadlessBackend;

pub mod engine;
pub mod handle;
pub mod result;

pub use engine::LocatorResolver;
pub use handle::LocatorHandle;
pub use result::Resolved;

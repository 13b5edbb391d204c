pub mod check_target;
pub mod notification;
pub mod snapshot;
pub mod verdict;

// Re-exports for convenience
pub use check_target::*;
pub use notification::*;
pub use snapshot::*;
pub use verdict::*;

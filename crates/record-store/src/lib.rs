pub mod snapshot;
pub mod store;

pub use snapshot::*;
pub use store::*;

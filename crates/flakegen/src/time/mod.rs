mod interface;
mod monotonic;
mod system;

pub use interface::*;
pub use monotonic::*;
pub use system::*;

pub mod elan;
pub mod recording;
pub mod speaker;

pub use elan::*;
pub use recording::*;
pub use speaker::*;

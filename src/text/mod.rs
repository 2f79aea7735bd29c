pub mod classify;
pub mod normalize;
pub mod tokenize;

pub use classify::*;
pub use normalize::*;
pub use tokenize::*;

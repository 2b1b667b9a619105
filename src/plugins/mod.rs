pub mod town;

pub use town::*;

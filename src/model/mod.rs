pub mod graph;
pub mod intent;

pub use graph::*;
pub use intent::*;

pub mod classifier;
pub mod descriptor;
pub mod extractor;

pub use classifier::*;
pub use descriptor::*;
pub use extractor::*;


#[allow(unused_imports)]
pub use builders::*;

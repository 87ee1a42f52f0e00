mod license;
mod order;
mod package;

pub use license::*;
pub use order::*;
pub use package::*;

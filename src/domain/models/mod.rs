mod lifecycle;
mod remote;

pub use lifecycle::*;
pub use remote::*;

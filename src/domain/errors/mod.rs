mod gateway_errors;
mod lifecycle_errors;
mod validation_errors;

pub use gateway_errors::*;
pub use lifecycle_errors::*;
pub use validation_errors::*;

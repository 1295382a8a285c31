mod client;
mod error;
mod signer;
mod xml;

pub use client::{OssConfig, OssLifecycleGateway};
pub use error::{ErrorResponse, OssError};
pub use signer::OssCredentials;
pub use xml::{from_xml, to_xml};

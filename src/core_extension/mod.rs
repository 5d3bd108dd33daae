// Ordered interception pipeline consulted at every lifecycle point

pub mod builtin;
pub mod error;
pub mod extension;
pub mod registry;

pub use error::ExtensionError;
pub use extension::{Extension, ExtensionContext, FtpEvent, HookResult, Outcome};
pub use registry::ExtensionRegistry;

//! CI platform detection and context normalization.

pub mod context;
pub mod env;
pub mod platform;
pub mod provider;

pub use context::{CiContext, Token};
pub use env::{EnvSource, ProcessEnv, StaticEnv};
pub use platform::{RuntimePlatform, detect};
pub use provider::{ContextProvider, load_context, provider_for};

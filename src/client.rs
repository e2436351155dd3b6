//! Client facade: builder, routing, and the request/stream operations.
//!
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod routing;
pub mod streaming;

pub use builder::ClientBuilder;
pub use self::core::{Client, DEFAULT_API_VERSION};
pub use routing::{BackendKind, BackendTarget, IMAGE_GENERATIONS_SUBMIT};
pub use streaming::StreamCallOptions;

//! Platform independent half of the Windows Update Agent bindings.
//!
//! Everything here talks to the agent through the [`Dispatch`] and
//! [`ObjectFactory`] traits, so the whole marshaling layer can be exercised
//! against in-memory objects. Those live in the `memory` module, which is
//! compiled for this crate's tests and behind the `testing` feature.

pub mod codec;
mod collections;
mod config;
mod dispatch;
pub mod enumerate;
mod enums;
mod error;
pub mod materialize;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
mod model;
mod value;

pub use collections::{StringCollection, UpdateCollection, build_update_collection};
pub use config::{SearcherConfig, SessionConfig};
pub use dispatch::{Dispatch, ObjectFactory, prog_id};
pub use enums::*;
pub use error::{E_FAIL, UpdateAgentError, UpdateResult};
pub use materialize::{Context, FromDispatch};
pub use model::*;
pub use value::{ObjectRef, Value, ValueKind};

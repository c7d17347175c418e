//! Outbound collections: typed sequences written back to the agent.

mod builder;
mod string_collection;
mod update_collection;

pub use builder::build_update_collection;
pub use string_collection::StringCollection;
pub use update_collection::UpdateCollection;

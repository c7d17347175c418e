use std::any::Any;
use std::fmt;

use crate::error::UpdateResult;
use crate::value::{ObjectRef, Value};

/// Late-bound access to a remote automation object.
///
/// Every materializer talks to the remote side exclusively through this
/// trait. Production code wraps an OLE `IDispatch`; tests use
/// `memory::MemoryObject` (behind the `testing` feature).
pub trait Dispatch: fmt::Debug {
    /// Reads a named property. `args` carries index arguments such as the
    /// position for `Item(i)` and is empty for plain properties.
    fn get_property(&self, name: &str, args: &[Value]) -> UpdateResult<Value>;

    fn put_property(&self, name: &str, value: Value) -> UpdateResult<()>;

    fn call_method(&self, name: &str, args: &[Value]) -> UpdateResult<Value>;

    /// The concrete object, for adapters that have to pass their own native
    /// handle back to the remote side as an argument.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

/// Creates remote objects by programmatic identifier.
pub trait ObjectFactory {
    fn create_object(&self, prog_id: &str) -> UpdateResult<ObjectRef>;
}

impl<F: ObjectFactory + ?Sized> ObjectFactory for &F {
    fn create_object(&self, prog_id: &str) -> UpdateResult<ObjectRef> {
        (**self).create_object(prog_id)
    }
}

impl<F: ObjectFactory + ?Sized> ObjectFactory for std::rc::Rc<F> {
    fn create_object(&self, prog_id: &str) -> UpdateResult<ObjectRef> {
        (**self).create_object(prog_id)
    }
}

/// Programmatic identifiers of the agent's creatable classes.
pub mod prog_id {
    pub const UPDATE_SESSION: &str = "Microsoft.Update.Session";
    pub const UPDATE_COLLECTION: &str = "Microsoft.Update.UpdateColl";
    pub const STRING_COLLECTION: &str = "Microsoft.Update.StringColl";
    pub const SERVICE_MANAGER: &str = "Microsoft.Update.ServiceManager";
    pub const AUTOMATIC_UPDATES: &str = "Microsoft.Update.AutoUpdate";
    pub const SYSTEM_INFO: &str = "Microsoft.Update.SystemInfo";
    pub const AGENT_INFO: &str = "Microsoft.Update.AgentInfo";
    pub const UPDATE_LOCKDOWN: &str = "Microsoft.Update.Lockdown";
}

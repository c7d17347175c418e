use std::marker::PhantomData;

use windows_update_core::{ObjectFactory, ObjectRef, UpdateAgentError, UpdateResult};

/// The Windows Update Agent only exists on Windows.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComFactory;

impl ComFactory {
    pub fn new() -> UpdateResult<Self> {
        Err(UpdateAgentError::Unsupported)
    }
}

impl ObjectFactory for ComFactory {
    fn create_object(&self, _prog_id: &str) -> UpdateResult<ObjectRef> {
        Err(UpdateAgentError::Unsupported)
    }
}

#[derive(Debug)]
pub struct ApartmentGuard {
    _not_send: PhantomData<*const ()>,
}

impl ApartmentGuard {
    pub fn new() -> UpdateResult<Self> {
        Err(UpdateAgentError::Unsupported)
    }
}

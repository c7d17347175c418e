use tracing::instrument;
use windows_update_core::{
    ObjectFactory, ObjectRef, UpdateLockdownOption, UpdateResult, Value, codec, prog_id,
};

/// Restricts access to Windows Update web sites.
#[derive(Debug, Clone)]
pub struct UpdateLockdown {
    disp: ObjectRef,
}

impl UpdateLockdown {
    pub fn new<F: ObjectFactory + ?Sized>(factory: &F) -> UpdateResult<Self> {
        Ok(Self::from_dispatch(
            factory.create_object(prog_id::UPDATE_LOCKDOWN)?,
        ))
    }

    #[must_use]
    pub fn from_dispatch(disp: ObjectRef) -> Self {
        Self { disp }
    }

    /// Raw lockdown policy bits.
    pub fn lockdown_policy(&self) -> UpdateResult<i32> {
        codec::to_i32(self.disp.call_method("GetLockdownPolicy", &[]))
    }

    pub fn is_locked_down(&self, option: UpdateLockdownOption) -> UpdateResult<bool> {
        Ok(self.lockdown_policy()? & option.code() != 0)
    }

    #[instrument(skip(self))]
    pub fn set_lockdown_policy(&self, policy: i32) -> UpdateResult<()> {
        self.disp
            .call_method("SetLockdownPolicy", &[Value::I32(policy)])?;
        Ok(())
    }
}

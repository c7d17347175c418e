use windows_update_core::{
    ObjectFactory, ObjectRef, UpdateAgentError, UpdateResult, Value, ValueKind, codec, prog_id,
};

/// Version information of the installed agent.
#[derive(Debug, Clone)]
pub struct WindowsUpdateAgentInfo {
    disp: ObjectRef,
}

impl WindowsUpdateAgentInfo {
    pub fn new<F: ObjectFactory + ?Sized>(factory: &F) -> UpdateResult<Self> {
        Ok(Self::from_dispatch(factory.create_object(prog_id::AGENT_INFO)?))
    }

    #[must_use]
    pub fn from_dispatch(disp: ObjectRef) -> Self {
        Self { disp }
    }

    /// Raw `GetInfo(identifier)` call.
    pub fn info(&self, identifier: &str) -> UpdateResult<Value> {
        self.disp.call_method("GetInfo", &[Value::from(identifier)])
    }

    fn version_part(&self, identifier: &str) -> UpdateResult<i32> {
        let value = codec::to_i64(self.info(identifier))?;
        i32::try_from(value).map_err(|_| UpdateAgentError::type_mismatch(ValueKind::I32, ValueKind::I64))
    }

    pub fn api_major_version(&self) -> UpdateResult<i32> {
        self.version_part("ApiMajorVersion")
    }

    pub fn api_minor_version(&self) -> UpdateResult<i32> {
        self.version_part("ApiMinorVersion")
    }

    /// Version of `wuapi.dll`, e.g. `"10.0.22621.2506"`.
    pub fn product_version_string(&self) -> UpdateResult<String> {
        codec::to_string(self.info("ProductVersionString"))
    }
}

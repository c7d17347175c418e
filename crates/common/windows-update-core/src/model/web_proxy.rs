use serde::Serialize;

use crate::codec;
use crate::enumerate;
use crate::error::UpdateResult;
use crate::materialize::{Context, FromDispatch};
use crate::value::ObjectRef;

/// HTTP proxy settings of a session.
///
/// Keeps the remote proxy object so it can be handed back through
/// `UpdateSession::set_web_proxy`.
#[derive(Debug, Clone, Serialize)]
pub struct WebProxy {
    #[serde(skip)]
    disp: ObjectRef,
    pub address: String,
    pub auto_detect: bool,
    pub bypass_list: Vec<String>,
    pub bypass_proxy_on_local: bool,
    pub read_only: bool,
    pub user_name: String,
}

impl FromDispatch for WebProxy {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            disp: disp.clone(),
            address: codec::to_string(disp.get_property("Address"))?,
            auto_detect: codec::to_bool(disp.get_property("AutoDetect"))?,
            bypass_list: enumerate::string_list_property(disp, "BypassList")?,
            bypass_proxy_on_local: codec::to_bool(disp.get_property("BypassProxyOnLocal"))?,
            read_only: codec::to_bool(disp.get_property("ReadOnly"))?,
            user_name: codec::to_string(disp.get_property("UserName"))?,
        })
    }
}

impl WebProxy {
    #[must_use]
    pub fn dispatch(&self) -> &ObjectRef {
        &self.disp
    }
}

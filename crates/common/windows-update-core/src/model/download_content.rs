use serde::Serialize;

use crate::codec;
use crate::error::UpdateResult;
use crate::materialize::{Context, FromDispatch};
use crate::value::ObjectRef;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UpdateDownloadContent {
    pub download_url: String,
}

impl FromDispatch for UpdateDownloadContent {
    fn from_dispatch_in(disp: &ObjectRef, _cx: &Context) -> UpdateResult<Self> {
        Ok(Self {
            download_url: codec::to_string(disp.get_property("DownloadUrl"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdateAgentError;
    use crate::memory::MemoryObject;
    use crate::value::Value;

    #[test]
    fn reads_download_url() {
        let disp = MemoryObject::new("UpdateDownloadContent")
            .with_property("DownloadUrl", "http://download.windowsupdate.com/c/msdownload/a.cab")
            .into_ref();
        let content = UpdateDownloadContent::from_dispatch(&disp).unwrap();
        assert_eq!(
            content.download_url,
            "http://download.windowsupdate.com/c/msdownload/a.cab"
        );
    }

    #[test]
    fn null_url_is_empty() {
        let disp = MemoryObject::new("UpdateDownloadContent")
            .with_property("DownloadUrl", Value::Null)
            .into_ref();
        let content = UpdateDownloadContent::from_dispatch(&disp).unwrap();
        assert!(content.download_url.is_empty());
    }

    #[test]
    fn url_errors_propagate() {
        let disp = MemoryObject::new("UpdateDownloadContent")
            .with_error("DownloadUrl", "rpc server unavailable")
            .into_ref();
        assert!(matches!(
            UpdateDownloadContent::from_dispatch(&disp),
            Err(UpdateAgentError::Remote { .. })
        ));
    }
}

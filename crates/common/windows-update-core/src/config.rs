use bon::bon;

use crate::enums::{DownloadPriority, ServerSelection};
use crate::materialize::{Context, DEFAULT_MAX_CATEGORY_DEPTH};
use crate::{UpdateAgentError, UpdateResult};

const MAX_CLIENT_APPLICATION_ID_LEN: usize = 256;
const MAX_CATEGORY_DEPTH_LIMIT: usize = 256;

fn validate_client_application_id(id: String) -> UpdateResult<String> {
    if id.trim().is_empty() {
        return Err(UpdateAgentError::InvalidConfig {
            reason: "client application id cannot be empty".into(),
        });
    }
    if id.chars().count() > MAX_CLIENT_APPLICATION_ID_LEN {
        return Err(UpdateAgentError::InvalidConfig {
            reason: "client application id cannot be longer than 256 characters".into(),
        });
    }
    Ok(id)
}

fn validate_max_category_depth(depth: usize) -> UpdateResult<usize> {
    if depth == 0 {
        return Err(UpdateAgentError::InvalidConfig {
            reason: "max category depth cannot be zero".into(),
        });
    }
    if depth > MAX_CATEGORY_DEPTH_LIMIT {
        return Err(UpdateAgentError::InvalidConfig {
            reason: "max category depth cannot be greater than 256".into(),
        });
    }
    Ok(depth)
}

/// Options written to every searcher a session creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearcherConfig {
    pub server_selection: ServerSelection,
    pub service_id: Option<String>,
    pub online: bool,
    pub include_potentially_superseded_updates: bool,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            server_selection: ServerSelection::Default,
            service_id: None,
            online: true,
            include_potentially_superseded_updates: false,
        }
    }
}

#[bon]
impl SearcherConfig {
    /// Creates a searcher configuration using the builder pattern.
    ///
    /// `service_id` is required when `server_selection` is
    /// [`ServerSelection::Others`].
    ///
    /// # Example
    ///
    /// ```
    /// use windows_update_core::{SearcherConfig, ServerSelection};
    ///
    /// let config = SearcherConfig::builder()
    ///     .server_selection(ServerSelection::Others)
    ///     .service_id("7971f918-a847-4430-9279-4a52d1efe18d".to_owned())
    ///     .online(false)
    ///     .build()
    ///     .unwrap();
    /// assert!(!config.online);
    /// ```
    #[builder]
    pub fn new(
        #[builder(default = ServerSelection::Default)] server_selection: ServerSelection,
        service_id: Option<String>,
        #[builder(default = true)] online: bool,
        #[builder(default)] include_potentially_superseded_updates: bool,
    ) -> UpdateResult<Self> {
        let service_id = service_id.filter(|id| !id.trim().is_empty());
        if server_selection == ServerSelection::Others && service_id.is_none() {
            return Err(UpdateAgentError::InvalidConfig {
                reason: "service id is required when server selection is Others".into(),
            });
        }
        Ok(Self {
            server_selection,
            service_id,
            online,
            include_potentially_superseded_updates,
        })
    }
}

/// Session-wide options.
///
/// Unset options leave the agent's own defaults untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub client_application_id: Option<String>,
    pub searcher: Option<SearcherConfig>,
    pub download_priority: Option<DownloadPriority>,
    pub force_quiet: Option<bool>,
    pub allow_source_prompts: Option<bool>,
    pub max_category_depth: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client_application_id: None,
            searcher: None,
            download_priority: None,
            force_quiet: None,
            allow_source_prompts: None,
            max_category_depth: DEFAULT_MAX_CATEGORY_DEPTH,
        }
    }
}

#[bon]
impl SessionConfig {
    /// Creates a session configuration using the builder pattern.
    ///
    /// # Example
    ///
    /// ```
    /// use windows_update_core::{DownloadPriority, SessionConfig};
    ///
    /// let config = SessionConfig::builder()
    ///     .client_application_id("patch-agent".to_owned())
    ///     .unwrap()
    ///     .download_priority(DownloadPriority::High)
    ///     .max_category_depth(16)
    ///     .unwrap()
    ///     .build();
    /// assert_eq!(config.max_category_depth, 16);
    /// ```
    #[builder]
    pub fn new(
        #[builder(with = |id: String| -> Result<_, UpdateAgentError> {
            validate_client_application_id(id)
        })]
        client_application_id: Option<String>,
        searcher: Option<SearcherConfig>,
        download_priority: Option<DownloadPriority>,
        force_quiet: Option<bool>,
        allow_source_prompts: Option<bool>,
        #[builder(
            default = DEFAULT_MAX_CATEGORY_DEPTH,
            with = |depth: usize| -> Result<_, UpdateAgentError> {
                validate_max_category_depth(depth)
            },
        )]
        max_category_depth: usize,
    ) -> Self {
        Self {
            client_application_id,
            searcher,
            download_priority,
            force_quiet,
            allow_source_prompts,
            max_category_depth,
        }
    }
}

impl SessionConfig {
    /// Materialization context carrying this configuration's limits.
    #[must_use]
    pub fn context(&self) -> Context {
        Context::new(self.max_category_depth)
    }
}

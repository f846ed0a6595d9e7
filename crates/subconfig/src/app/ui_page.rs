//! State of the settings page for the active input-method user interface.
//!
//! The page starts with a placeholder label. The framework is asked for the
//! active UI name once; [`UiPage::on_current_ui`] is the completion callback
//! and moves the page to its final state.

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::addon::Addon;
use crate::domain::pattern::SubConfigParser;
use crate::infra::registry::{AddonRegistry, ConfigDescLoader};

/// Label shown until the active UI is known.
pub const PLACEHOLDER_LABEL: &str = "Cannot load currently used user interface info";

/// Addon whose skin option is linked to the skin page.
pub const CLASSIC_UI_ADDON: &str = "fcitx-classic-ui";

/// Failure of the input-method proxy call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProxyError {
    /// No connection to the input-method framework.
    #[error("input method proxy is unavailable")]
    Unavailable,
    /// The call failed or was cancelled by the transport.
    #[error("current UI request failed: {0}")]
    Call(String),
}

/// Source of the active UI name, usually the input-method proxy.
#[cfg_attr(test, mockall::automock)]
pub trait CurrentUiSource {
    /// Returns the addon name of the active user interface.
    ///
    /// # Errors
    /// Returns [`ProxyError`] when the framework cannot be reached or the call
    /// fails.
    fn current_ui(&self) -> Result<String, ProxyError>;
}

/// What the page shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiPageState {
    /// The active UI is unknown.
    Placeholder,
    /// The active UI has nothing to configure.
    NoOptions {
        /// Display name shown in the label.
        general_name: String,
    },
    /// The active UI can be configured.
    Configurable {
        /// Metadata of the active UI addon.
        addon: Addon,
        /// Sub-configurations the addon declares.
        sub_configs: SubConfigParser,
        /// Whether the skin option should drive the skin page.
        links_skin_page: bool,
    },
}

/// Settings page for the active user interface.
#[derive(Clone, Debug)]
pub struct UiPage {
    state: UiPageState,
}

impl Default for UiPage {
    fn default() -> Self {
        Self::new()
    }
}

impl UiPage {
    /// Creates a page showing the placeholder label.
    pub fn new() -> Self {
        Self {
            state: UiPageState::Placeholder,
        }
    }

    /// Current page state.
    pub fn state(&self) -> &UiPageState {
        &self.state
    }

    /// Text of the visible label, if the page shows one.
    pub fn label(&self) -> Option<String> {
        match &self.state {
            UiPageState::Placeholder => Some(PLACEHOLDER_LABEL.to_string()),
            UiPageState::NoOptions { general_name } => {
                Some(format!("No configuration options for {general_name}."))
            }
            UiPageState::Configurable { .. } => None,
        }
    }

    /// Asks `source` for the active UI and applies the reply.
    ///
    /// Without a source the page keeps its placeholder.
    pub fn request_current_ui(
        &mut self,
        source: Option<&dyn CurrentUiSource>,
        addons: &dyn AddonRegistry,
        descs: &dyn ConfigDescLoader,
    ) {
        let Some(source) = source else {
            debug!("no input method proxy, keeping placeholder");
            return;
        };

        self.on_current_ui(source.current_ui(), addons, descs);
    }

    /// Completion callback for the active-UI request.
    ///
    /// Failed replies and unknown addons leave the page unchanged.
    pub fn on_current_ui(
        &mut self,
        reply: Result<String, ProxyError>,
        addons: &dyn AddonRegistry,
        descs: &dyn ConfigDescLoader,
    ) {
        let name = match reply {
            Ok(name) => name,
            Err(error) => {
                warn!(%error, "keeping user interface placeholder");
                return;
            }
        };

        let Some(addon) = addons.find_addon_by_name(&name) else {
            debug!(%name, "active user interface is not a known addon");
            return;
        };

        let has_desc = descs.has_config_desc(&addon.config_desc_file());
        self.state = if has_desc || !addon.sub_config.is_empty() {
            UiPageState::Configurable {
                links_skin_page: addon.name == CLASSIC_UI_ADDON,
                sub_configs: SubConfigParser::parse(&addon.sub_config),
                addon,
            }
        } else {
            UiPageState::NoOptions {
                general_name: addon.general_name,
            }
        };
    }
}

use serde::Serialize;

/// Addon metadata the settings page needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Addon {
    /// Unique addon identifier, e.g. `fcitx-classic-ui`.
    pub name: String,
    /// Human-readable name shown in labels.
    pub general_name: String,
    /// Raw sub-configuration declaration; empty when none is declared.
    pub sub_config: String,
}

impl Addon {
    pub fn new(
        name: impl Into<String>,
        general_name: impl Into<String>,
        sub_config: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            general_name: general_name.into(),
            sub_config: sub_config.into(),
        }
    }

    /// File name of the addon's own config description.
    pub fn config_desc_file(&self) -> String {
        format!("{}.desc", self.name)
    }
}

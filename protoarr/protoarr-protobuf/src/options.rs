/// Name of the custom field option carrying a field's nullable default.
pub const DEFAULT_NULLABLE_OPTION: &str = "nullable";

/// Options controlling how schema views are derived from descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Custom field option read as the nullable default.
    ///
    /// Matched against the extension's short name or its fully qualified
    /// name, e.g. both `nullable` and `my.pkg.nullable` match
    /// `[(my.pkg.nullable) = "0"]`.
    pub nullable_option: String,
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nullable_option(mut self, name: impl Into<String>) -> Self {
        self.nullable_option = name.into();
        self
    }

    pub(crate) fn matches_option_name(&self, name: &str) -> bool {
        let name = name.trim_start_matches('.');
        let wanted = self.nullable_option.trim_start_matches('.');
        name == wanted
            || name
                .rsplit_once('.')
                .is_some_and(|(_, short)| short == wanted)
    }
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            nullable_option: DEFAULT_NULLABLE_OPTION.to_string(),
        }
    }
}

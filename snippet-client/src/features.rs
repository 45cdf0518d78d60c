/// Switches that select between the client variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Allow in-place editing from the detail view.
    pub edit_mode: bool,
    pub syntax_highlighting: bool,
    pub empty_state_illustration: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            edit_mode: true,
            syntax_highlighting: false,
            empty_state_illustration: true,
        }
    }
}

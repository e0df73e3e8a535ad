/// Loading state shared by every asynchronously loaded resource

/// Where a resource is in its loading lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadingState {
    /// Not loaded, or unloaded for a reload
    #[default]
    Unloaded,
    /// Loading is in progress
    Loading,
    /// Fully loaded and usable
    Loaded,
    /// Loading failed, the resource keeps its previous content
    Failed,
}

impl LoadingState {
    pub fn is_loaded(self) -> bool {
        self == LoadingState::Loaded
    }
}

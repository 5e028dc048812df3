//! Configuration for query composition and repository behavior

/// Options consumed by the query composer.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// When a specification carries no explicit order clause, issue a
    /// fallback sort by entity key ascending so `get_first` and row caps
    /// are deterministic across executions.
    pub deterministic_fallback: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            deterministic_fallback: true,
        }
    }
}

impl ComposeOptions {
    /// Disable the fallback ordering; result order is then entirely up to
    /// the specification (or the store, when no order is given).
    pub fn without_fallback() -> Self {
        Self {
            deterministic_fallback: false,
        }
    }
}

/// Configuration carried by a repository instance.
#[derive(Debug, Clone, Default)]
pub struct RepositoryConfig {
    pub compose: ComposeOptions,
}

impl RepositoryConfig {
    pub fn new(compose: ComposeOptions) -> Self {
        Self { compose }
    }
}

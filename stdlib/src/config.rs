//! Standard library configuration.

/// What `contracts.remove` does when the stored code cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnparsableCodePolicy {
    /// Unparsable code cannot declare an enum, so removal goes ahead.
    #[default]
    AllowRemoval,
    /// Refuse to remove contracts whose code does not parse.
    ForbidRemoval,
}

/// Settings shared by all capability functions of one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StdlibConfig {
    pub unparsable_code: UnparsableCodePolicy,
}

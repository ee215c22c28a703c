//! The execution environment capability functions run in.

use std::fmt;

use crate::config::StdlibConfig;
use crate::program::{DeclarationScanner, ProgramInspector};

static DEFAULT_INSPECTOR: DeclarationScanner = DeclarationScanner;

/// Host, program inspector and configuration of one execution.
///
/// Cheap to copy; every account object carries its own copy, so two
/// account values never share mutable state on this side of the host.
pub struct Environment<'h, H: ?Sized> {
    host: &'h H,
    inspector: &'h dyn ProgramInspector,
    config: StdlibConfig,
}

impl<'h, H: ?Sized> Environment<'h, H> {
    /// Environment with the built-in [`DeclarationScanner`] and default
    /// configuration.
    pub fn new(host: &'h H) -> Self {
        Self {
            host,
            inspector: &DEFAULT_INSPECTOR,
            config: StdlibConfig::default(),
        }
    }

    pub fn with_inspector(self, inspector: &'h dyn ProgramInspector) -> Self {
        Self { inspector, ..self }
    }

    pub fn with_config(self, config: StdlibConfig) -> Self {
        Self { config, ..self }
    }

    pub fn host(&self) -> &'h H {
        self.host
    }

    pub fn inspector(&self) -> &'h dyn ProgramInspector {
        self.inspector
    }

    pub fn config(&self) -> StdlibConfig {
        self.config
    }
}

impl<H: ?Sized> Clone for Environment<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: ?Sized> Copy for Environment<'_, H> {}

impl<H: ?Sized> fmt::Debug for Environment<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

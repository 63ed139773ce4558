use std::sync::Arc;

use super::engine_context::EngineContext;
use super::RTCModule;
use crate::error::Result;

/// ModuleSpec describes an extra module handed back to the host's own
/// module list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    pub name: String,
}

/// ModuleInstaller runs once per engine context creation and asks the RTC
/// module to install its script bindings into it.
pub struct ModuleInstaller {
    module: Arc<RTCModule>,
}

impl ModuleInstaller {
    pub fn new(module: Arc<RTCModule>) -> Self {
        ModuleInstaller { module }
    }

    /// install returns no extra modules. An error here means the engine is
    /// unusable for RTC and the host should abort startup.
    pub fn install(&self, engine: &mut dyn EngineContext) -> Result<Vec<ModuleSpec>> {
        if let Err(err) = self.module.install_bindings(engine) {
            log::error!("RTC module bindings not installed: {}", err);
            return Err(err);
        }

        Ok(vec![])
    }
}

use std::collections::BTreeMap;
use std::sync::OnceLock;

use docparse_config::{Backend, BackendsConfig};

static GLOBAL: OnceLock<CapabilityRegistry> = OnceLock::new();

/// Whether `backend` was compiled into this build.
pub fn compiled_in(backend: Backend) -> bool {
    match backend {
        Backend::Pdf => cfg!(feature = "backend-pdf"),
        Backend::Word => cfg!(feature = "backend-word"),
        Backend::Spreadsheet => cfg!(feature = "backend-spreadsheet"),
        Backend::Html => cfg!(feature = "backend-html"),
    }
}

/// Read-only record of which optional backends are usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRegistry {
    available: BTreeMap<Backend, bool>,
}

impl CapabilityRegistry {
    /// Availability as compiled into this build.
    pub fn detect() -> Self {
        CapabilityRegistry {
            available: Backend::ALL
                .into_iter()
                .map(|backend| (backend, compiled_in(backend)))
                .collect(),
        }
    }

    /// Compiled-in availability minus the backends the config disables.
    /// Configuration can only switch backends off, never on.
    pub fn from_config(config: &BackendsConfig) -> Self {
        let mut registry = Self::detect();
        for backend in &config.disabled {
            registry.available.insert(*backend, false);
        }
        registry
    }

    /// Explicit availability; backends not listed are unavailable.
    pub fn with_availability(entries: impl IntoIterator<Item = (Backend, bool)>) -> Self {
        let mut available: BTreeMap<Backend, bool> =
            Backend::ALL.into_iter().map(|b| (b, false)).collect();
        available.extend(entries);
        CapabilityRegistry { available }
    }

    /// Install the process-wide registry. The first call wins; later calls
    /// return the registry that is already installed.
    pub fn initialize(config: &BackendsConfig) -> &'static CapabilityRegistry {
        GLOBAL.get_or_init(|| Self::from_config(config))
    }

    /// The process-wide registry, initialized from compiled-in features if
    /// nothing was installed first.
    pub fn global() -> &'static CapabilityRegistry {
        GLOBAL.get_or_init(Self::detect)
    }

    pub fn is_available(&self, backend: Backend) -> bool {
        self.available.get(&backend).copied().unwrap_or(false)
    }

    /// Every backend with its availability, in reporting order.
    pub fn report(&self) -> Vec<(Backend, bool)> {
        Backend::ALL
            .into_iter()
            .map(|backend| (backend, self.is_available(backend)))
            .collect()
    }

    pub fn missing(&self) -> Vec<Backend> {
        self.report()
            .into_iter()
            .filter(|(_, available)| !available)
            .map(|(backend, _)| backend)
            .collect()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::detect()
    }
}

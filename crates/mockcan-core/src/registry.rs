//! Interface and plugin registry.
//!
//! Two levels of lookup:
//!
//! - Interfaces: the fixed set of simulated interface names a [`MockDevice`]
//!   can connect to (`mcan0`, `mcan1`). Enumeration order is stable.
//! - Plugins: [`DeviceRegistry`] maps a plugin name to a [`DeviceFactory`].
//!   Creating a device only requires a known plugin; whether the interface
//!   exists is checked later, by `connect`.

use std::collections::BTreeMap;

use crate::{config::MockConfig, device::BusDevice, error::RegistryError, mock::MockDevice};

/// Plugin name of the mock device factory.
pub const MOCK_PLUGIN: &str = "mockcan";

const MOCK_INTERFACE_NAMES: [&str; 2] = ["mcan0", "mcan1"];

/// Description of an available interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceInfo {
    name: String,
}

impl InterfaceInfo {
    /// Describe the interface called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Interface name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Simulated interfaces, in enumeration order.
pub fn mock_interfaces() -> Vec<InterfaceInfo> {
    MOCK_INTERFACE_NAMES.iter().copied().map(InterfaceInfo::new).collect()
}

/// Look up a simulated interface by name.
pub fn resolve(name: &str) -> Option<InterfaceInfo> {
    MOCK_INTERFACE_NAMES.iter().any(|known| *known == name).then(|| InterfaceInfo::new(name))
}

/// Creates devices for one plugin.
pub trait DeviceFactory {
    /// Interfaces this plugin can connect to.
    fn interfaces(&self) -> Vec<InterfaceInfo>;

    /// Create an unconnected device for `interface`.
    fn create(&self, interface: &str) -> Box<dyn BusDevice>;
}

/// Factory for [`MockDevice`]s.
#[derive(Debug, Clone, Default)]
pub struct MockDeviceFactory {
    config: MockConfig,
}

impl MockDeviceFactory {
    /// Factory whose devices start with `config`.
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }
}

impl DeviceFactory for MockDeviceFactory {
    fn interfaces(&self) -> Vec<InterfaceInfo> {
        mock_interfaces()
    }

    fn create(&self, interface: &str) -> Box<dyn BusDevice> {
        Box::new(MockDevice::with_config(interface, self.config.clone()))
    }
}

/// Plugin name → device factory.
#[derive(Default)]
pub struct DeviceRegistry {
    plugins: BTreeMap<String, Box<dyn DeviceFactory>>,
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry").field("plugins", &self.plugins()).finish()
    }
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the mock plugin registered under [`MOCK_PLUGIN`].
    pub fn with_mock() -> Self {
        let mut registry = Self::new();
        registry.register(MOCK_PLUGIN, MockDeviceFactory::default());
        registry
    }

    /// Register a factory. Returns the factory it replaced, if any.
    pub fn register(
        &mut self,
        plugin: impl Into<String>,
        factory: impl DeviceFactory + 'static,
    ) -> Option<Box<dyn DeviceFactory>> {
        self.plugins.insert(plugin.into(), Box::new(factory))
    }

    /// Registered plugin names, sorted.
    pub fn plugins(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    /// Interfaces offered by `plugin`. Empty for unknown plugins.
    pub fn available_devices(&self, plugin: &str) -> Vec<InterfaceInfo> {
        self.plugins.get(plugin).map(|factory| factory.interfaces()).unwrap_or_default()
    }

    /// Create a device for `interface` using `plugin`.
    ///
    /// # Errors
    ///
    /// - `RegistryError::NoSuchPlugin` if no factory is registered for `plugin`
    pub fn create_device(
        &self,
        plugin: &str,
        interface: &str,
    ) -> Result<Box<dyn BusDevice>, RegistryError> {
        let factory = self
            .plugins
            .get(plugin)
            .ok_or_else(|| RegistryError::NoSuchPlugin { plugin: plugin.to_string() })?;

        tracing::debug!(plugin, interface, "creating device");
        Ok(factory.create(interface))
    }
}

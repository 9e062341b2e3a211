//! Vendor table and live drivers.
//!
//! The factory table is fixed when the registry is built. Live drivers come
//! and go with switch registration.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::info;

use crate::cli_driver::CliFactory;
use crate::driver::{DriverFactory, SwitchDriver};
use crate::error::{DriverError, SchemaError};
use crate::mock::{MockFabric, MockFactory};
use crate::session::Connector;
use crate::vendor::{SwitchConfig, Vendor};

pub struct DriverRegistry {
    factories: HashMap<Vendor, Arc<dyn DriverFactory>>,
    drivers: RwLock<HashMap<String, Arc<dyn SwitchDriver>>>,
}

#[derive(Default)]
pub struct DriverRegistryBuilder {
    factories: HashMap<Vendor, Arc<dyn DriverFactory>>,
}

impl DriverRegistryBuilder {
    /// Install a factory. A later factory for the same vendor wins.
    pub fn factory(mut self, factory: Arc<dyn DriverFactory>) -> Self {
        self.factories.insert(factory.vendor(), factory);
        self
    }

    pub fn build(self) -> DriverRegistry {
        DriverRegistry {
            factories: self.factories,
            drivers: RwLock::new(HashMap::new()),
        }
    }
}

impl DriverRegistry {
    pub fn builder() -> DriverRegistryBuilder {
        DriverRegistryBuilder::default()
    }

    /// Every vendor: CLI families over `connector`, `mock` on `fabric`.
    pub fn with_defaults(
        connector: Arc<dyn Connector>,
        timeout: Duration,
        fabric: MockFabric,
    ) -> Self {
        let mut builder = Self::builder().factory(Arc::new(MockFactory::new(fabric)));
        for vendor in Vendor::ALL {
            if vendor != Vendor::Mock {
                builder = builder.factory(Arc::new(CliFactory::new(
                    vendor,
                    connector.clone(),
                    timeout,
                )));
            }
        }
        builder.build()
    }

    pub fn supports(&self, vendor: Vendor) -> bool {
        self.factories.contains_key(&vendor)
    }

    /// Build and install the live driver for a switch, replacing any
    /// driver already registered under `label`.
    pub fn register(&self, label: &str, config: &SwitchConfig) -> Result<(), SchemaError> {
        let vendor = config.vendor();
        let factory = self
            .factories
            .get(&vendor)
            .ok_or_else(|| SchemaError::UnknownVendor(vendor.to_string()))?;
        let driver = factory.create(label, config)?;

        self.drivers
            .write()
            .unwrap()
            .insert(label.to_string(), driver);
        info!(switch = %label, vendor = %vendor, "Registered switch driver");
        Ok(())
    }

    /// Drop the live driver. Returns whether one was registered.
    pub fn unregister(&self, label: &str) -> bool {
        let removed = self.drivers.write().unwrap().remove(label).is_some();
        if removed {
            info!(switch = %label, "Unregistered switch driver");
        }
        removed
    }

    pub fn driver(&self, label: &str) -> Result<Arc<dyn SwitchDriver>, DriverError> {
        self.drivers
            .read()
            .unwrap()
            .get(label)
            .cloned()
            .ok_or_else(|| DriverError::NotRegistered(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleConnector;

    fn mock_config() -> SwitchConfig {
        let args: Vec<String> = ["h", "u", "p"].iter().map(|s| s.to_string()).collect();
        SwitchConfig::from_args(Vendor::Mock, &args).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_drive() {
        let fabric = MockFabric::new();
        let registry = DriverRegistry::with_defaults(
            Arc::new(ConsoleConnector::default()),
            Duration::from_secs(5),
            fabric.clone(),
        );
        for vendor in Vendor::ALL {
            assert!(registry.supports(vendor));
        }

        registry.register("sw0", &mock_config()).unwrap();
        let driver = registry.driver("sw0").unwrap();
        assert_eq!(driver.vendor(), Vendor::Mock);
        driver.apply_vlan("gi1/0/1", 300).await.unwrap();
        assert_eq!(fabric.vlan_of("sw0", "gi1/0/1"), Some(300));

        assert!(registry.unregister("sw0"));
        assert!(!registry.unregister("sw0"));
        assert!(matches!(
            registry.driver("sw0"),
            Err(DriverError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_missing_factory_fails_closed() {
        let registry = DriverRegistry::builder().build();
        assert!(!registry.supports(Vendor::Mock));
        let err = registry.register("sw0", &mock_config()).unwrap_err();
        assert_eq!(err, SchemaError::UnknownVendor("mock".to_string()));
    }
}

//! Hardware-free driver backed by an inspectable in-memory fabric.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::commands::validate_port_name;
use crate::driver::{DriverFactory, SwitchDriver};
use crate::error::{DriverError, SchemaError};
use crate::vendor::{SwitchConfig, Vendor};

/// A driver call as seen by the fabric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Apply {
        switch: String,
        port: String,
        vlan: u16,
    },
    Revert {
        switch: String,
        port: String,
    },
}

#[derive(Default)]
struct FabricState {
    /// (switch, port) -> access VLAN. Absent means reverted.
    ports: BTreeMap<(String, String), u16>,
    failing: HashSet<(String, String)>,
    delays: BTreeMap<(String, String), Duration>,
    calls: Vec<MockCall>,
}

/// Port state of every mock switch, shared between drivers and tests.
#[derive(Clone, Default)]
pub struct MockFabric {
    state: Arc<Mutex<FabricState>>,
}

impl MockFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access VLAN currently carried by a port.
    pub fn vlan_of(&self, switch: &str, port: &str) -> Option<u16> {
        let state = self.state.lock().unwrap();
        state
            .ports
            .get(&(switch.to_string(), port.to_string()))
            .copied()
    }

    /// Ports of `switch` that carry a tenant VLAN.
    pub fn configured_ports(&self, switch: &str) -> Vec<(String, u16)> {
        let state = self.state.lock().unwrap();
        state
            .ports
            .iter()
            .filter(|((sw, _), _)| sw == switch)
            .map(|((_, port), vlan)| (port.clone(), *vlan))
            .collect()
    }

    /// Make every call on this port fail until [`MockFabric::heal_port`].
    pub fn fail_port(&self, switch: &str, port: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing.insert((switch.to_string(), port.to_string()));
    }

    pub fn heal_port(&self, switch: &str, port: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing.remove(&(switch.to_string(), port.to_string()));
    }

    /// Hold every call on this port for `delay` before it takes effect.
    pub fn slow_port(&self, switch: &str, port: &str, delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state
            .delays
            .insert((switch.to_string(), port.to_string()), delay);
    }

    fn delay_of(&self, switch: &str, port: &str) -> Option<Duration> {
        let state = self.state.lock().unwrap();
        state
            .delays
            .get(&(switch.to_string(), port.to_string()))
            .copied()
    }

    /// Every call received, including failed ones, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: MockCall) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let key = match &call {
            MockCall::Apply { switch, port, .. } | MockCall::Revert { switch, port } => {
                (switch.clone(), port.clone())
            }
        };
        let failing = state.failing.contains(&key);
        state.calls.push(call.clone());
        if failing {
            return Err(DriverError::Injected(key.1));
        }

        match call {
            MockCall::Apply { vlan, .. } => {
                state.ports.insert(key, vlan);
            }
            MockCall::Revert { .. } => {
                state.ports.remove(&key);
            }
        }
        Ok(())
    }
}

/// Driver for the `mock` vendor.
pub struct MockDriver {
    label: String,
    fabric: MockFabric,
}

impl MockDriver {
    pub fn new(label: &str, fabric: MockFabric) -> Self {
        Self {
            label: label.to_string(),
            fabric,
        }
    }

    async fn settle(&self, port: &str) {
        if let Some(delay) = self.fabric.delay_of(&self.label, port) {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SwitchDriver for MockDriver {
    fn vendor(&self) -> Vendor {
        Vendor::Mock
    }

    async fn apply_vlan(&self, port: &str, vlan: u16) -> Result<(), DriverError> {
        validate_port_name(port)?;
        debug!(switch = %self.label, port = %port, vlan, "Mock apply VLAN");
        self.settle(port).await;
        self.fabric.record(MockCall::Apply {
            switch: self.label.clone(),
            port: port.to_string(),
            vlan,
        })
    }

    async fn revert_port(&self, port: &str) -> Result<(), DriverError> {
        validate_port_name(port)?;
        debug!(switch = %self.label, port = %port, "Mock revert port");
        self.settle(port).await;
        self.fabric.record(MockCall::Revert {
            switch: self.label.clone(),
            port: port.to_string(),
        })
    }
}

pub struct MockFactory {
    fabric: MockFabric,
}

impl MockFactory {
    pub fn new(fabric: MockFabric) -> Self {
        Self { fabric }
    }
}

impl DriverFactory for MockFactory {
    fn vendor(&self) -> Vendor {
        Vendor::Mock
    }

    fn create(
        &self,
        label: &str,
        config: &SwitchConfig,
    ) -> Result<Arc<dyn SwitchDriver>, SchemaError> {
        if config.vendor() != Vendor::Mock {
            return Err(SchemaError::UnknownVendor(config.vendor().to_string()));
        }
        Ok(Arc::new(MockDriver::new(label, self.fabric.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_and_revert() {
        let fabric = MockFabric::new();
        let driver = MockDriver::new("sw0", fabric.clone());

        driver.apply_vlan("gi1/0/3", 101).await.unwrap();
        driver.apply_vlan("gi1/0/3", 101).await.unwrap();
        assert_eq!(fabric.vlan_of("sw0", "gi1/0/3"), Some(101));
        assert_eq!(fabric.configured_ports("sw0"), vec![("gi1/0/3".to_string(), 101)]);

        driver.revert_port("gi1/0/3").await.unwrap();
        assert_eq!(fabric.vlan_of("sw0", "gi1/0/3"), None);
        assert_eq!(fabric.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_port_untouched() {
        let fabric = MockFabric::new();
        let driver = MockDriver::new("sw0", fabric.clone());
        driver.apply_vlan("gi1/0/3", 101).await.unwrap();

        fabric.fail_port("sw0", "gi1/0/3");
        let err = driver.revert_port("gi1/0/3").await.unwrap_err();
        assert!(matches!(err, DriverError::Injected(_)));
        assert_eq!(fabric.vlan_of("sw0", "gi1/0/3"), Some(101));

        fabric.heal_port("sw0", "gi1/0/3");
        driver.revert_port("gi1/0/3").await.unwrap();
        assert_eq!(fabric.vlan_of("sw0", "gi1/0/3"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_port_takes_effect_after_delay() {
        let fabric = MockFabric::new();
        fabric.slow_port("sw0", "gi1/0/3", Duration::from_secs(5));
        let driver = Arc::new(MockDriver::new("sw0", fabric.clone()));

        let task = {
            let driver = driver.clone();
            tokio::spawn(async move { driver.apply_vlan("gi1/0/3", 101).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fabric.vlan_of("sw0", "gi1/0/3"), None);

        task.await.unwrap().unwrap();
        assert_eq!(fabric.vlan_of("sw0", "gi1/0/3"), Some(101));
    }
}

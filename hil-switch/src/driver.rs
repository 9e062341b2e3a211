//! The capability every switch driver provides.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{DriverError, SchemaError};
use crate::vendor::{SwitchConfig, Vendor};

/// Programs port VLAN membership on one physical switch.
#[async_trait]
pub trait SwitchDriver: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Put the port into access mode on `vlan`. Re-applying the VLAN the
    /// port already carries succeeds without change.
    async fn apply_vlan(&self, port: &str, vlan: u16) -> Result<(), DriverError>;

    /// Remove all tenant VLAN membership and restore the port default.
    async fn revert_port(&self, port: &str) -> Result<(), DriverError>;
}

/// Builds live drivers for one vendor.
pub trait DriverFactory: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Construct the driver for a switch. No session is opened here.
    fn create(
        &self,
        label: &str,
        config: &SwitchConfig,
    ) -> Result<Arc<dyn SwitchDriver>, SchemaError>;
}

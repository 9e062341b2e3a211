//! Driver for switches managed through their command line.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::commands::{Dialect, output_is_error, validate_port_name};
use crate::driver::{DriverFactory, SwitchDriver};
use crate::error::{DriverError, SchemaError};
use crate::session::{Connector, Session, Target};
use crate::vendor::{SwitchConfig, Vendor};

/// Sends per-vendor command scripts over a fresh session per operation.
pub struct CliDriver {
    label: String,
    vendor: Vendor,
    dialect: Dialect,
    target: Target,
    connector: Arc<dyn Connector>,
    timeout: Duration,
}

impl CliDriver {
    pub fn new(
        label: &str,
        config: &SwitchConfig,
        connector: Arc<dyn Connector>,
        timeout: Duration,
    ) -> Result<Self, SchemaError> {
        let dialect = Dialect::for_config(config)
            .ok_or_else(|| SchemaError::UnknownVendor(config.vendor().to_string()))?;
        Ok(Self {
            label: label.to_string(),
            vendor: config.vendor(),
            dialect,
            target: Target::from(config.credentials()),
            connector,
            timeout,
        })
    }

    async fn run_script(&self, commands: Vec<String>) -> Result<(), DriverError> {
        match tokio::time::timeout(self.timeout, self.run_script_inner(commands)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(switch = %self.label, timeout = ?self.timeout, "Switch operation timed out");
                Err(DriverError::Timeout(self.timeout))
            }
        }
    }

    async fn run_script_inner(&self, commands: Vec<String>) -> Result<(), DriverError> {
        let mut session = self.connector.connect(&self.target).await?;

        let result = self.send_all(session.as_mut(), commands).await;
        if let Err(e) = session.close().await {
            debug!(switch = %self.label, error = %e, "Error closing switch session");
        }
        result
    }

    async fn send_all(
        &self,
        session: &mut dyn Session,
        commands: Vec<String>,
    ) -> Result<(), DriverError> {
        for command in self.dialect.session_setup().into_iter().chain(commands) {
            debug!(switch = %self.label, command = %command, "Sending switch command");
            let output = session.run(&command).await?;
            if output_is_error(&output) {
                return Err(DriverError::Rejected {
                    command,
                    output: output.trim().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SwitchDriver for CliDriver {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    async fn apply_vlan(&self, port: &str, vlan: u16) -> Result<(), DriverError> {
        validate_port_name(port)?;
        self.run_script(self.dialect.apply_vlan(port, vlan)).await?;
        info!(switch = %self.label, port = %port, vlan, "Applied access VLAN");
        Ok(())
    }

    async fn revert_port(&self, port: &str) -> Result<(), DriverError> {
        validate_port_name(port)?;
        self.run_script(self.dialect.revert_port(port)).await?;
        info!(switch = %self.label, port = %port, "Reverted port");
        Ok(())
    }
}

/// Factory for one CLI-managed vendor.
pub struct CliFactory {
    vendor: Vendor,
    connector: Arc<dyn Connector>,
    timeout: Duration,
}

impl CliFactory {
    pub fn new(vendor: Vendor, connector: Arc<dyn Connector>, timeout: Duration) -> Self {
        Self {
            vendor,
            connector,
            timeout,
        }
    }
}

impl DriverFactory for CliFactory {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    fn create(
        &self,
        label: &str,
        config: &SwitchConfig,
    ) -> Result<Arc<dyn SwitchDriver>, SchemaError> {
        if config.vendor() != self.vendor {
            return Err(SchemaError::UnknownVendor(config.vendor().to_string()));
        }
        let driver = CliDriver::new(label, config, self.connector.clone(), self.timeout)?;
        Ok(Arc::new(driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every command and answers with canned output.
    #[derive(Default)]
    struct Recorder {
        sent: Arc<Mutex<Vec<String>>>,
        reject: Option<&'static str>,
        stall: bool,
    }

    struct RecordedSession {
        sent: Arc<Mutex<Vec<String>>>,
        reject: Option<&'static str>,
        stall: bool,
    }

    #[async_trait]
    impl Connector for Recorder {
        async fn connect(&self, _target: &Target) -> Result<Box<dyn Session>, DriverError> {
            Ok(Box::new(RecordedSession {
                sent: self.sent.clone(),
                reject: self.reject,
                stall: self.stall,
            }))
        }
    }

    #[async_trait]
    impl Session for RecordedSession {
        async fn run(&mut self, command: &str) -> Result<String, DriverError> {
            if self.stall {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            self.sent.lock().unwrap().push(command.to_string());
            if self.reject == Some(command) {
                return Ok("% Invalid input detected".to_string());
            }
            Ok("switch#".to_string())
        }

        async fn close(self: Box<Self>) -> Result<(), DriverError> {
            Ok(())
        }
    }

    fn nexus() -> SwitchConfig {
        let args: Vec<String> = ["sw0", "admin", "secret", "2222"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        SwitchConfig::from_args(Vendor::Nexus, &args).unwrap()
    }

    #[tokio::test]
    async fn test_apply_vlan_sends_script() {
        let recorder = Recorder::default();
        let sent = recorder.sent.clone();
        let driver =
            CliDriver::new("sw0", &nexus(), Arc::new(recorder), Duration::from_secs(5)).unwrap();

        driver.apply_vlan("Ethernet1/4", 101).await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0], "terminal length 0");
        assert!(sent.contains(&"interface Ethernet1/4".to_string()));
        assert!(sent.contains(&"switchport access vlan 101".to_string()));
    }

    #[tokio::test]
    async fn test_rejected_command() {
        let recorder = Recorder {
            reject: Some("switchport access vlan 101"),
            ..Default::default()
        };
        let driver =
            CliDriver::new("sw0", &nexus(), Arc::new(recorder), Duration::from_secs(5)).unwrap();

        let err = driver.apply_vlan("Ethernet1/4", 101).await.unwrap_err();
        assert!(matches!(err, DriverError::Rejected { ref command, .. } if command == "switchport access vlan 101"));
    }

    #[tokio::test]
    async fn test_invalid_port_opens_no_session() {
        let recorder = Recorder::default();
        let sent = recorder.sent.clone();
        let driver =
            CliDriver::new("sw0", &nexus(), Arc::new(recorder), Duration::from_secs(5)).unwrap();

        let err = driver.revert_port("eth1\nreload").await.unwrap_err();
        assert!(matches!(err, DriverError::InvalidPort(_)));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_closed() {
        let recorder = Recorder {
            stall: true,
            ..Default::default()
        };
        let driver =
            CliDriver::new("sw0", &nexus(), Arc::new(recorder), Duration::from_secs(1)).unwrap();

        let err = driver.apply_vlan("Ethernet1/4", 101).await.unwrap_err();
        assert!(matches!(err, DriverError::Timeout(_)));
    }

    #[test]
    fn test_factory_rejects_foreign_config() {
        let factory = CliFactory::new(
            Vendor::Brocade,
            Arc::new(Recorder::default()),
            Duration::from_secs(5),
        );
        assert!(factory.create("sw0", &nexus()).is_err());
    }
}

use chrono::Utc;
use hil_switch::{SchemaError, SwitchConfig, Vendor};
use serde_json::Value;
use tracing::{info, warn};

use super::{
    Orchestrator, PortAction, PortDetails, PortTarget, SwitchDetails, ensure_absent, labels,
    require, require_nic,
};
use crate::error::{ApiError, Result};
use crate::model::{Nic, Node, Port, Switch, new_id};
use crate::store::{StoreError, Tx};

fn require_port(tx: &Tx<'_>, switch: &Switch, label: &str) -> Result<Port> {
    tx.get_port(&switch.id, label)?.ok_or_else(|| {
        ApiError::NotFound(format!("port '{}' on switch '{}'", label, switch.label))
    })
}

impl Orchestrator {
    /// Register a switch. The vendor and its parameters are validated before
    /// the store is touched; the live driver is installed after commit.
    pub fn register_switch(&self, label: &str, vendor: &str, params: &Value) -> Result<()> {
        let vendor: Vendor = vendor.parse()?;
        if !self.registry.supports(vendor) {
            return Err(SchemaError::UnknownVendor(vendor.to_string()).into());
        }
        let config = SwitchConfig::validate(vendor, params)?;

        let _switches = self.switches.lock().unwrap();
        self.store.with_transaction(|tx| {
            ensure_absent::<Switch>(tx, label)?;
            tx.create(&Switch {
                id: new_id(),
                label: label.to_string(),
                config: config.clone(),
                created_at: Utc::now(),
            })?;
            Ok::<_, ApiError>(())
        })?;

        if let Err(e) = self.registry.register(label, &config) {
            warn!(switch = %label, error = %e, "Driver construction failed, removing switch");
            self.store.with_transaction(|tx| {
                if let Some(switch) = tx.get::<Switch>(label)? {
                    tx.delete(&switch)?;
                }
                Ok::<_, StoreError>(())
            })?;
            return Err(e.into());
        }

        info!(switch = %label, vendor = %vendor, "Registered switch");
        self.audit.switch_registered(label, vendor.as_str());
        Ok(())
    }

    /// Delete a switch. Blocked while it has ports.
    pub fn delete_switch(&self, label: &str) -> Result<()> {
        let _switches = self.switches.lock().unwrap();
        self.store.with_transaction(|tx| {
            let switch = require::<Switch>(tx, label)?;
            let ports = tx.ports_of_switch(&switch.id)?;
            if !ports.is_empty() {
                return Err(ApiError::Blocked(format!(
                    "switch '{}' still has ports: {}",
                    label,
                    labels(ports).join(", ")
                )));
            }
            tx.delete(&switch)?;
            Ok(())
        })?;

        self.registry.unregister(label);
        info!(switch = %label, "Deleted switch");
        self.audit.switch_deleted(label);
        Ok(())
    }

    pub fn register_port(&self, switch: &str, port: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let sw = require::<Switch>(tx, switch)?;
            if tx.get_port(&sw.id, port)?.is_some() {
                return Err(ApiError::Duplicate(format!(
                    "port '{}' on switch '{}'",
                    port, switch
                )));
            }
            tx.create(&Port {
                id: new_id(),
                label: port.to_string(),
                switch_id: sw.id,
                nic_id: None,
                created_at: Utc::now(),
            })?;
            Ok(())
        })?;

        info!(switch = %switch, port = %port, "Registered port");
        self.audit.port_registered(switch, port);
        Ok(())
    }

    /// Delete a port. Blocked while a nic is wired to it.
    pub fn delete_port(&self, switch: &str, port: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let sw = require::<Switch>(tx, switch)?;
            let p = require_port(tx, &sw, port)?;
            if p.nic_id.is_some() {
                return Err(ApiError::Blocked(format!(
                    "port '{}' on switch '{}' is wired to a nic",
                    port, switch
                )));
            }
            tx.delete(&p)?;
            Ok(())
        })?;

        info!(switch = %switch, port = %port, "Deleted port");
        self.audit.port_deleted(switch, port);
        Ok(())
    }

    /// Record that a nic is cabled to a port. The port is not programmed.
    pub fn connect_port_to_nic(
        &self,
        switch: &str,
        port: &str,
        node: &str,
        nic: &str,
    ) -> Result<()> {
        self.store.with_transaction(|tx| {
            let sw = require::<Switch>(tx, switch)?;
            let p = require_port(tx, &sw, port)?;
            let n = require::<Node>(tx, node)?;
            let nic_rec = require_nic(tx, &n, nic)?;

            if p.nic_id.is_some() {
                return Err(ApiError::Duplicate(format!(
                    "nic on port '{}' of switch '{}'",
                    port, switch
                )));
            }
            if let Some(occupied) = tx.port_for_nic(&nic_rec.id)? {
                return Err(ApiError::Duplicate(format!(
                    "port for nic '{}' on node '{}' ('{}')",
                    nic, node, occupied.label
                )));
            }
            tx.set_port_nic(&p.id, Some(&nic_rec.id))?;
            Ok(())
        })?;

        info!(switch = %switch, port = %port, node = %node, nic = %nic, "Wired port to nic");
        self.audit.port_connected(switch, port, node, nic);
        Ok(())
    }

    /// Unwire a port and revert it on the switch.
    pub async fn detach_port_from_nic(&self, switch: &str, port: &str) -> Result<()> {
        let target = PortTarget {
            switch: switch.to_string(),
            port: port.to_string(),
        };
        let _port = self.ports.lock(&target).await;

        let (port_id, nic_id) = self.store.with_transaction(|tx| {
            let sw = require::<Switch>(tx, switch)?;
            let p = require_port(tx, &sw, port)?;
            let Some(nic_id) = p.nic_id.clone() else {
                return Err(ApiError::NotFound(format!(
                    "nic on port '{}' of switch '{}'",
                    port, switch
                )));
            };
            tx.set_port_nic(&p.id, None)?;
            Ok((p.id, nic_id))
        })?;

        self.drive_or_compensate(&target, PortAction::Revert, |tx| {
            let port_free = tx
                .get_by_id::<Port>(&port_id)?
                .is_some_and(|p| p.nic_id.is_none());
            let nic_unwired = tx.get_by_id::<Nic>(&nic_id)?.is_some()
                && tx.port_for_nic(&nic_id)?.is_none();
            if !(port_free && nic_unwired) {
                return Ok(false);
            }
            tx.set_port_nic(&port_id, Some(&nic_id))?;
            Ok(true)
        })
        .await?;

        info!(switch = %switch, port = %port, "Unwired port");
        self.audit.port_detached(switch, port);
        Ok(())
    }

    /// Reset a port on the switch without touching the topology.
    pub async fn revert_port(&self, switch: &str, port: &str) -> Result<()> {
        let target = PortTarget {
            switch: switch.to_string(),
            port: port.to_string(),
        };
        let _port = self.ports.lock(&target).await;

        self.store.read(|tx| {
            let sw = require::<Switch>(tx, switch)?;
            require_port(tx, &sw, port)
        })?;
        self.drive(&target, PortAction::Revert).await?;

        info!(switch = %switch, port = %port, "Reverted port");
        self.audit.port_reverted(switch, port);
        Ok(())
    }

    pub fn list_switches(&self) -> Result<Vec<String>> {
        self.store.read(|tx| Ok(labels(tx.list::<Switch>()?)))
    }

    pub fn show_switch(&self, label: &str) -> Result<SwitchDetails> {
        self.store.read(|tx| {
            let sw = require::<Switch>(tx, label)?;
            Ok(SwitchDetails {
                vendor: sw.config.vendor().to_string(),
                ports: labels(tx.ports_of_switch(&sw.id)?),
                name: sw.label,
            })
        })
    }

    pub fn show_port(&self, switch: &str, port: &str) -> Result<PortDetails> {
        self.store.read(|tx| {
            let sw = require::<Switch>(tx, switch)?;
            let p = require_port(tx, &sw, port)?;

            let (node, nic) = match &p.nic_id {
                Some(nic_id) => match tx.get_by_id::<Nic>(nic_id)? {
                    Some(nic) => {
                        let node = tx.get_by_id::<Node>(&nic.node_id)?.map(|n| n.label);
                        (node, Some(nic.label))
                    }
                    None => (None, None),
                },
                None => (None, None),
            };

            Ok(PortDetails {
                switch: sw.label,
                port: p.label,
                node,
                nic,
            })
        })
    }
}

//! Topology orchestrator.
//!
//! Every operation validates and writes inside one store transaction. Port
//! programming runs after commit; when it fails, a compensating transaction
//! restores the attachment the operation wrote.
//!
//! Operations that program a port hold that port's lock from before their
//! transaction until the switch has answered, so the switch sees port
//! changes in commit order.

mod details;
mod headnodes;
mod networks;
mod nodes;
mod projects;
mod switches;
mod users;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hil_switch::DriverRegistry;
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, warn};

use crate::audit::AuditLogger;
use crate::error::{ApiError, Result};
use crate::model::{Nic, Node, Switch};
use crate::store::{Labelled, Store, StoreError, Tx};

pub use details::{
    HeadnodeDetails, HnicDetails, NetworkDetails, NetworkMember, NicDetails, NodeDetails,
    PortDetails, PortRef, SwitchDetails,
};

pub struct Orchestrator {
    store: Arc<Store>,
    registry: Arc<DriverRegistry>,
    audit: Arc<AuditLogger>,
    ports: PortLocks,
    /// Serializes switch registration and deletion with the driver registry.
    switches: Mutex<()>,
}

impl Orchestrator {
    /// Wire up the orchestrator and restore a live driver for every stored
    /// switch.
    pub fn new(
        store: Arc<Store>,
        registry: Arc<DriverRegistry>,
        audit: Arc<AuditLogger>,
    ) -> Result<Self> {
        let switches: Vec<Switch> = store.read(|tx| tx.list())?;
        for switch in &switches {
            registry.register(&switch.label, &switch.config)?;
        }
        info!(switches = switches.len(), "Restored switch drivers");

        Ok(Self {
            store,
            registry,
            audit,
            ports: PortLocks::default(),
            switches: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// Program one port, mapping any driver failure to [`ApiError::Driver`].
    async fn drive(&self, target: &PortTarget, action: PortAction) -> Result<()> {
        let result = match self.registry.driver(&target.switch) {
            Ok(driver) => match action {
                PortAction::Apply(vlan) => driver.apply_vlan(&target.port, vlan).await,
                PortAction::Revert => driver.revert_port(&target.port).await,
            },
            Err(e) => Err(e),
        };
        result.map_err(|source| ApiError::Driver {
            switch: target.switch.clone(),
            source,
        })
    }

    /// Program a port after a committed change, undoing the change if the
    /// switch refuses.
    ///
    /// `undo` runs in its own transaction and returns `false` when the
    /// attachment is no longer the one this operation wrote.
    async fn drive_or_compensate<F>(
        &self,
        target: &PortTarget,
        action: PortAction,
        undo: F,
    ) -> Result<()>
    where
        F: FnOnce(&Tx<'_>) -> std::result::Result<bool, StoreError>,
    {
        let err = match self.drive(target, action).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        warn!(
            switch = %target.switch,
            port = %target.port,
            error = %err,
            "Switch programming failed, rolling back"
        );
        match self.store.with_transaction(undo) {
            Ok(true) => Err(err),
            Ok(false) => {
                error!(
                    switch = %target.switch,
                    port = %target.port,
                    "Rollback skipped: attachment changed concurrently"
                );
                Err(ApiError::Inconsistent(format!(
                    "{}; rollback skipped because the attachment changed",
                    err
                )))
            }
            Err(e) => {
                error!(
                    switch = %target.switch,
                    port = %target.port,
                    error = %e,
                    "Rollback failed"
                );
                Err(ApiError::Inconsistent(format!("{}; rollback failed: {}", err, e)))
            }
        }
    }
}

/// A switch port, by labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PortTarget {
    switch: String,
    port: String,
}

/// One async lock per switch port, created on first use.
#[derive(Default)]
struct PortLocks {
    locks: Mutex<HashMap<PortTarget, Arc<tokio::sync::Mutex<()>>>>,
}

impl PortLocks {
    async fn lock(&self, target: &PortTarget) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            // Entries nobody holds or waits on are only referenced by the map.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(target.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    async fn lock_opt(&self, target: Option<&PortTarget>) -> Option<OwnedMutexGuard<()>> {
        match target {
            Some(target) => Some(self.lock(target).await),
            None => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PortAction {
    Apply(u16),
    Revert,
}

fn require<R: Labelled>(tx: &Tx<'_>, label: &str) -> Result<R> {
    tx.get::<R>(label)?
        .ok_or_else(|| ApiError::not_found(R::KIND, label))
}

fn ensure_absent<R: Labelled>(tx: &Tx<'_>, label: &str) -> Result<()> {
    match tx.get::<R>(label)? {
        Some(_) => Err(ApiError::duplicate(R::KIND, label)),
        None => Ok(()),
    }
}

fn require_nic(tx: &Tx<'_>, node: &Node, label: &str) -> Result<Nic> {
    tx.get_nic(&node.id, label)?
        .ok_or_else(|| ApiError::NotFound(format!("nic '{}' on node '{}'", label, node.label)))
}

/// The port a nic is wired to, if any.
fn port_target(tx: &Tx<'_>, nic_id: &str) -> Result<Option<PortTarget>> {
    let Some(port) = tx.port_for_nic(nic_id)? else {
        return Ok(None);
    };
    let switch: Switch = tx.get_by_id(&port.switch_id)?.ok_or_else(|| {
        ApiError::Internal(format!("port '{}' has no switch", port.label))
    })?;
    Ok(Some(PortTarget {
        switch: switch.label,
        port: port.label,
    }))
}

fn labels<R: crate::store::Record>(records: Vec<R>) -> Vec<String> {
    records.iter().map(|r| r.label().to_string()).collect()
}

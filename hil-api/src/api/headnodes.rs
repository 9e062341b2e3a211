use chrono::Utc;
use tracing::info;

use super::{HeadnodeDetails, HnicDetails, Orchestrator, ensure_absent, labels, require};
use crate::error::{ApiError, Result};
use crate::model::{Headnode, Hnic, Network, Project, new_id, parse_mac_address};
use crate::store::Tx;

fn require_hnic(tx: &Tx<'_>, headnode: &Headnode, label: &str) -> Result<Hnic> {
    tx.get_hnic(&headnode.id, label)?.ok_or_else(|| {
        ApiError::NotFound(format!(
            "hnic '{}' on headnode '{}'",
            label, headnode.label
        ))
    })
}

impl Orchestrator {
    /// Create the headnode of a project. A project has at most one.
    pub fn create_headnode(&self, label: &str, project: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let p = require::<Project>(tx, project)?;
            ensure_absent::<Headnode>(tx, label)?;
            if let Some(existing) = tx.headnode_of_project(&p.id)? {
                return Err(ApiError::Duplicate(format!(
                    "headnode of project '{}' ('{}')",
                    project, existing.label
                )));
            }
            tx.create(&Headnode {
                id: new_id(),
                label: label.to_string(),
                project_id: p.id,
                created_at: Utc::now(),
            })?;
            Ok(())
        })?;

        info!(headnode = %label, project = %project, "Created headnode");
        self.audit.headnode_created(label, project);
        Ok(())
    }

    /// Delete a headnode. Blocked while it owns hnics.
    pub fn delete_headnode(&self, label: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let headnode = require::<Headnode>(tx, label)?;
            let hnics = tx.hnics_of_headnode(&headnode.id)?;
            if !hnics.is_empty() {
                return Err(ApiError::Blocked(format!(
                    "headnode '{}' still has hnics: {}",
                    label,
                    labels(hnics).join(", ")
                )));
            }
            tx.delete(&headnode)?;
            Ok(())
        })?;

        info!(headnode = %label, "Deleted headnode");
        self.audit.headnode_deleted(label);
        Ok(())
    }

    pub fn create_hnic(&self, headnode: &str, hnic: &str, macaddr: &str) -> Result<()> {
        let macaddr = parse_mac_address(macaddr)
            .ok_or_else(|| ApiError::InvalidArgument(format!("invalid MAC address '{}'", macaddr)))?;

        self.store.with_transaction(|tx| {
            let h = require::<Headnode>(tx, headnode)?;
            ensure_absent::<Hnic>(tx, hnic)?;
            tx.create(&Hnic {
                id: new_id(),
                label: hnic.to_string(),
                headnode_id: h.id,
                macaddr,
                network_id: None,
                created_at: Utc::now(),
            })?;
            Ok::<_, ApiError>(())
        })?;

        info!(headnode = %headnode, hnic = %hnic, "Created hnic");
        self.audit.hnic_created(headnode, hnic);
        Ok(())
    }

    /// Delete an hnic. Blocked while it is on a network.
    pub fn delete_hnic(&self, headnode: &str, hnic: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let h = require::<Headnode>(tx, headnode)?;
            let hnic_rec = require_hnic(tx, &h, hnic)?;
            if hnic_rec.network_id.is_some() {
                return Err(ApiError::Blocked(format!(
                    "hnic '{}' on headnode '{}' is connected to a network",
                    hnic, headnode
                )));
            }
            tx.delete(&hnic_rec)?;
            Ok(())
        })?;

        info!(headnode = %headnode, hnic = %hnic, "Deleted hnic");
        self.audit.hnic_deleted(headnode, hnic);
        Ok(())
    }

    pub fn connect_headnode_to_network(
        &self,
        headnode: &str,
        hnic: &str,
        network: &str,
    ) -> Result<()> {
        self.store.with_transaction(|tx| {
            let h = require::<Headnode>(tx, headnode)?;
            let hnic_rec = require_hnic(tx, &h, hnic)?;
            let net = require::<Network>(tx, network)?;
            if h.project_id != net.project_id {
                return Err(ApiError::NotFound(format!(
                    "network '{}' in the project of headnode '{}'",
                    network, headnode
                )));
            }
            if hnic_rec.network_id.is_some() {
                return Err(ApiError::Duplicate(format!(
                    "network attachment of hnic '{}' on headnode '{}'",
                    hnic, headnode
                )));
            }
            tx.set_hnic_network(&hnic_rec.id, Some(&net.id))?;
            Ok(())
        })?;

        info!(headnode = %headnode, hnic = %hnic, network = %network, "Connected hnic to network");
        self.audit.hnic_connected(headnode, hnic, network);
        Ok(())
    }

    pub fn detach_headnode_from_network(&self, headnode: &str, hnic: &str) -> Result<()> {
        let network = self.store.with_transaction(|tx| {
            let h = require::<Headnode>(tx, headnode)?;
            let hnic_rec = require_hnic(tx, &h, hnic)?;
            let Some(network_id) = &hnic_rec.network_id else {
                return Err(ApiError::NotFound(format!(
                    "network attachment of hnic '{}' on headnode '{}'",
                    hnic, headnode
                )));
            };
            let net: Network = tx.get_by_id(network_id)?.ok_or_else(|| {
                ApiError::Internal(format!("hnic '{}' points at a missing network", hnic))
            })?;
            tx.set_hnic_network(&hnic_rec.id, None)?;
            Ok(net.label)
        })?;

        info!(headnode = %headnode, hnic = %hnic, network = %network, "Detached hnic from network");
        self.audit.hnic_detached(headnode, hnic, &network);
        Ok(())
    }

    pub fn show_headnode(&self, label: &str) -> Result<HeadnodeDetails> {
        self.store.read(|tx| {
            let headnode = require::<Headnode>(tx, label)?;
            let project: Project = tx.get_by_id(&headnode.project_id)?.ok_or_else(|| {
                ApiError::Internal(format!("headnode '{}' has no project", label))
            })?;

            let mut hnics = Vec::new();
            for hnic in tx.hnics_of_headnode(&headnode.id)? {
                let network = match &hnic.network_id {
                    Some(id) => tx.get_by_id::<Network>(id)?.map(|n| n.label),
                    None => None,
                };
                hnics.push(HnicDetails {
                    label: hnic.label,
                    macaddr: hnic.macaddr,
                    network,
                });
            }

            Ok(HeadnodeDetails {
                name: headnode.label,
                project: project.label,
                hnics,
            })
        })
    }
}

use chrono::Utc;
use tracing::info;

use super::{
    NicDetails, NodeDetails, Orchestrator, PortAction, PortRef, PortTarget, ensure_absent,
    labels, port_target, require, require_nic,
};
use crate::error::{ApiError, Result};
use crate::model::{Network, Nic, Node, Project, new_id, parse_mac_address};

impl Orchestrator {
    pub fn register_node(&self, label: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            ensure_absent::<Node>(tx, label)?;
            tx.create(&Node {
                id: new_id(),
                label: label.to_string(),
                project_id: None,
                created_at: Utc::now(),
            })?;
            Ok::<_, ApiError>(())
        })?;

        info!(node = %label, "Registered node");
        self.audit.node_registered(label);
        Ok(())
    }

    /// Delete a node. Blocked while it is in a project or still owns nics.
    pub fn delete_node(&self, label: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let node = require::<Node>(tx, label)?;
            if node.project_id.is_some() {
                return Err(ApiError::Blocked(format!(
                    "node '{}' is attached to a project",
                    label
                )));
            }
            let nics = tx.nics_of_node(&node.id)?;
            if !nics.is_empty() {
                return Err(ApiError::Blocked(format!(
                    "node '{}' still has nics: {}",
                    label,
                    labels(nics).join(", ")
                )));
            }
            tx.delete(&node)?;
            Ok(())
        })?;

        info!(node = %label, "Deleted node");
        self.audit.node_deleted(label);
        Ok(())
    }

    pub fn register_nic(&self, node: &str, nic: &str, macaddr: &str) -> Result<()> {
        let macaddr = parse_mac_address(macaddr)
            .ok_or_else(|| ApiError::InvalidArgument(format!("invalid MAC address '{}'", macaddr)))?;

        self.store.with_transaction(|tx| {
            let n = require::<Node>(tx, node)?;
            if tx.get_nic(&n.id, nic)?.is_some() {
                return Err(ApiError::Duplicate(format!(
                    "nic '{}' on node '{}'",
                    nic, node
                )));
            }
            tx.create(&Nic {
                id: new_id(),
                label: nic.to_string(),
                node_id: n.id,
                macaddr: macaddr.clone(),
                network_id: None,
                created_at: Utc::now(),
            })?;
            Ok(())
        })?;

        info!(node = %node, nic = %nic, macaddr = %macaddr, "Registered nic");
        self.audit.nic_registered(node, nic, &macaddr);
        Ok(())
    }

    /// Delete a nic. Blocked while it is on a network or wired to a port.
    pub fn delete_nic(&self, node: &str, nic: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let n = require::<Node>(tx, node)?;
            let nic_rec = require_nic(tx, &n, nic)?;
            if nic_rec.network_id.is_some() {
                return Err(ApiError::Blocked(format!(
                    "nic '{}' on node '{}' is connected to a network",
                    nic, node
                )));
            }
            if let Some(port) = tx.port_for_nic(&nic_rec.id)? {
                return Err(ApiError::Blocked(format!(
                    "nic '{}' on node '{}' is wired to port '{}'",
                    nic, node, port.label
                )));
            }
            tx.delete(&nic_rec)?;
            Ok(())
        })?;

        info!(node = %node, nic = %nic, "Deleted nic");
        self.audit.nic_deleted(node, nic);
        Ok(())
    }

    /// Put a nic on a network of the node's project and, if the nic is
    /// wired, give its port the network's VLAN.
    pub async fn connect_node_to_network(
        &self,
        node: &str,
        nic: &str,
        network: &str,
    ) -> Result<()> {
        loop {
            let expected = self.wired_port(node, nic)?;
            let _port = self.ports.lock_opt(expected.as_ref()).await;

            let attached = self.store.with_transaction(|tx| {
                let n = require::<Node>(tx, node)?;
                let nic_rec = require_nic(tx, &n, nic)?;
                let net = require::<Network>(tx, network)?;
                if n.project_id.as_deref() != Some(net.project_id.as_str()) {
                    return Err(ApiError::NotFound(format!(
                        "network '{}' in the project of node '{}'",
                        network, node
                    )));
                }
                if nic_rec.network_id.is_some() {
                    return Err(ApiError::Duplicate(format!(
                        "network attachment of nic '{}' on node '{}'",
                        nic, node
                    )));
                }
                // Rewired since the lock was chosen.
                if port_target(tx, &nic_rec.id)? != expected {
                    return Ok(None);
                }
                tx.set_nic_network(&nic_rec.id, Some(&net.id))?;
                Ok(Some((nic_rec.id, net.id, net.vlan_tag)))
            })?;
            let Some((nic_id, network_id, vlan)) = attached else {
                continue;
            };

            if let Some(target) = &expected {
                self.drive_or_compensate(target, PortAction::Apply(vlan), |tx| {
                    match tx.get_by_id::<Nic>(&nic_id)? {
                        Some(current)
                            if current.network_id.as_deref() == Some(network_id.as_str()) =>
                        {
                            tx.set_nic_network(&nic_id, None)?;
                            Ok(true)
                        }
                        _ => Ok(false),
                    }
                })
                .await?;
            }

            info!(node = %node, nic = %nic, network = %network, vlan, "Connected nic to network");
            self.audit.nic_connected(node, nic, network);
            return Ok(());
        }
    }

    /// Take a nic off its network and, if the nic is wired, revert its port.
    pub async fn detach_node_from_network(&self, node: &str, nic: &str) -> Result<()> {
        loop {
            let expected = self.wired_port(node, nic)?;
            let _port = self.ports.lock_opt(expected.as_ref()).await;

            let detached = self.store.with_transaction(|tx| {
                let n = require::<Node>(tx, node)?;
                let nic_rec = require_nic(tx, &n, nic)?;
                let network_id = nic_rec.network_id.clone().ok_or_else(|| {
                    ApiError::NotFound(format!(
                        "network attachment of nic '{}' on node '{}'",
                        nic, node
                    ))
                })?;
                let net: Network = tx.get_by_id(&network_id)?.ok_or_else(|| {
                    ApiError::Internal(format!("nic '{}' points at a missing network", nic))
                })?;
                if port_target(tx, &nic_rec.id)? != expected {
                    return Ok(None);
                }
                tx.set_nic_network(&nic_rec.id, None)?;
                Ok::<_, ApiError>(Some((nic_rec.id, network_id, net.label)))
            })?;
            let Some((nic_id, network_id, network_label)) = detached else {
                continue;
            };

            if let Some(target) = &expected {
                self.drive_or_compensate(target, PortAction::Revert, |tx| {
                    match tx.get_by_id::<Nic>(&nic_id)? {
                        Some(current) if current.network_id.is_none() => {
                            tx.set_nic_network(&nic_id, Some(&network_id))?;
                            Ok(true)
                        }
                        _ => Ok(false),
                    }
                })
                .await?;
            }

            info!(node = %node, nic = %nic, network = %network_label, "Detached nic from network");
            self.audit.nic_detached(node, nic, &network_label);
            return Ok(());
        }
    }

    /// The port a node's nic is currently wired to.
    fn wired_port(&self, node: &str, nic: &str) -> Result<Option<PortTarget>> {
        self.store.read(|tx| {
            let n = require::<Node>(tx, node)?;
            let nic_rec = require_nic(tx, &n, nic)?;
            port_target(tx, &nic_rec.id)
        })
    }

    pub fn list_free_nodes(&self) -> Result<Vec<String>> {
        self.store.read(|tx| Ok(labels(tx.free_nodes()?)))
    }

    pub fn show_node(&self, label: &str) -> Result<NodeDetails> {
        self.store.read(|tx| {
            let node = require::<Node>(tx, label)?;
            let project = match &node.project_id {
                Some(id) => tx.get_by_id::<Project>(id)?.map(|p| p.label),
                None => None,
            };

            let mut nics = Vec::new();
            for nic in tx.nics_of_node(&node.id)? {
                let network = match &nic.network_id {
                    Some(id) => tx.get_by_id::<Network>(id)?.map(|n| n.label),
                    None => None,
                };
                let port = port_target(tx, &nic.id)?.map(|t| PortRef {
                    switch: t.switch,
                    port: t.port,
                });
                nics.push(NicDetails {
                    label: nic.label,
                    macaddr: nic.macaddr,
                    network,
                    port,
                });
            }

            Ok(NodeDetails {
                name: node.label,
                project,
                nics,
            })
        })
    }
}

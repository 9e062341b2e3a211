use chrono::Utc;
use tracing::info;

use super::{NetworkDetails, NetworkMember, Orchestrator, ensure_absent, require};
use crate::error::{ApiError, Result};
use crate::model::{Headnode, Network, Node, Project, new_id};
use crate::store::VlanPool;

impl Orchestrator {
    /// Create a network in a project, taking a VLAN tag from the pool.
    pub fn create_network(&self, label: &str, project: &str) -> Result<u16> {
        let vlan = self.store.with_transaction(|tx| {
            let p = require::<Project>(tx, project)?;
            ensure_absent::<Network>(tx, label)?;
            let vlan = VlanPool::allocate(tx)?
                .ok_or_else(|| ApiError::ResourceExhausted("no free VLAN tags".to_string()))?;
            tx.create(&Network {
                id: new_id(),
                label: label.to_string(),
                project_id: p.id,
                vlan_tag: vlan,
                created_at: Utc::now(),
            })?;
            Ok::<_, ApiError>(vlan)
        })?;

        info!(network = %label, project = %project, vlan, "Created network");
        self.audit.network_created(label, project, vlan);
        Ok(vlan)
    }

    /// Delete a network and release its tag. Blocked while anything is
    /// connected to it.
    pub fn delete_network(&self, label: &str) -> Result<()> {
        let vlan = self.store.with_transaction(|tx| {
            let net = require::<Network>(tx, label)?;
            let nics = tx.nics_on_network(&net.id)?;
            let hnics = tx.hnics_on_network(&net.id)?;
            if !nics.is_empty() || !hnics.is_empty() {
                return Err(ApiError::Blocked(format!(
                    "network '{}' still has {} nic(s) and {} hnic(s) connected",
                    label,
                    nics.len(),
                    hnics.len()
                )));
            }
            tx.delete(&net)?;
            VlanPool::release(tx, net.vlan_tag)?;
            Ok(net.vlan_tag)
        })?;

        info!(network = %label, vlan, "Deleted network");
        self.audit.network_deleted(label, vlan);
        Ok(())
    }

    pub fn show_network(&self, label: &str) -> Result<NetworkDetails> {
        self.store.read(|tx| {
            let net = require::<Network>(tx, label)?;
            let project: Project = tx.get_by_id(&net.project_id)?.ok_or_else(|| {
                ApiError::Internal(format!("network '{}' has no project", label))
            })?;

            let mut nics = Vec::new();
            for nic in tx.nics_on_network(&net.id)? {
                let owner = tx
                    .get_by_id::<Node>(&nic.node_id)?
                    .map(|n| n.label)
                    .unwrap_or_default();
                nics.push(NetworkMember {
                    owner,
                    interface: nic.label,
                });
            }

            let mut hnics = Vec::new();
            for hnic in tx.hnics_on_network(&net.id)? {
                let owner = tx
                    .get_by_id::<Headnode>(&hnic.headnode_id)?
                    .map(|h| h.label)
                    .unwrap_or_default();
                hnics.push(NetworkMember {
                    owner,
                    interface: hnic.label,
                });
            }

            Ok(NetworkDetails {
                name: net.label,
                project: project.label,
                vlan: net.vlan_tag,
                nics,
                hnics,
            })
        })
    }
}

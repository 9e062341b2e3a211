use chrono::Utc;
use tracing::info;

use super::{Orchestrator, ensure_absent, labels, require};
use crate::error::{ApiError, Result};
use crate::model::{Group, Node, Project, new_id};

impl Orchestrator {
    pub fn create_project(&self, label: &str, group: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let group = require::<Group>(tx, group)?;
            ensure_absent::<Project>(tx, label)?;
            tx.create(&Project {
                id: new_id(),
                label: label.to_string(),
                group_id: group.id,
                created_at: Utc::now(),
            })?;
            Ok::<_, ApiError>(())
        })?;

        info!(project = %label, group = %group, "Created project");
        self.audit.project_created(label, group);
        Ok(())
    }

    /// Delete a project. Blocked while it has nodes, networks or a headnode.
    pub fn delete_project(&self, label: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let project = require::<Project>(tx, label)?;

            let mut holds = Vec::new();
            let nodes = tx.nodes_of_project(&project.id)?;
            if !nodes.is_empty() {
                holds.push(format!("nodes {}", labels(nodes).join(", ")));
            }
            let networks = tx.networks_of_project(&project.id)?;
            if !networks.is_empty() {
                holds.push(format!("networks {}", labels(networks).join(", ")));
            }
            if let Some(headnode) = tx.headnode_of_project(&project.id)? {
                holds.push(format!("headnode {}", headnode.label));
            }
            if !holds.is_empty() {
                return Err(ApiError::Blocked(format!(
                    "project '{}' still has {}",
                    label,
                    holds.join("; ")
                )));
            }

            tx.delete(&project)?;
            Ok(())
        })?;

        info!(project = %label, "Deleted project");
        self.audit.project_deleted(label);
        Ok(())
    }

    pub fn project_connect_node(&self, project: &str, node: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let p = require::<Project>(tx, project)?;
            let n = require::<Node>(tx, node)?;
            if n.project_id.is_some() {
                return Err(ApiError::Duplicate(format!(
                    "node '{}' is already attached to a project",
                    node
                )));
            }
            tx.set_node_project(&n.id, Some(&p.id))?;
            Ok(())
        })?;

        info!(project = %project, node = %node, "Attached node to project");
        self.audit.node_attached(project, node);
        Ok(())
    }

    /// Return a node to the free pool. Blocked while any of its nics is on
    /// a network.
    pub fn project_detach_node(&self, project: &str, node: &str) -> Result<()> {
        self.store.with_transaction(|tx| {
            let p = require::<Project>(tx, project)?;
            let n = require::<Node>(tx, node)?;
            if n.project_id.as_deref() != Some(p.id.as_str()) {
                return Err(ApiError::NotFound(format!(
                    "node '{}' in project '{}'",
                    node, project
                )));
            }

            let connected: Vec<String> = tx
                .nics_of_node(&n.id)?
                .into_iter()
                .filter(|nic| nic.network_id.is_some())
                .map(|nic| nic.label)
                .collect();
            if !connected.is_empty() {
                return Err(ApiError::Blocked(format!(
                    "node '{}' has nics on networks: {}",
                    node,
                    connected.join(", ")
                )));
            }

            tx.set_node_project(&n.id, None)?;
            Ok(())
        })?;

        info!(project = %project, node = %node, "Detached node from project");
        self.audit.node_detached(project, node);
        Ok(())
    }

    pub fn list_projects(&self) -> Result<Vec<String>> {
        self.store.read(|tx| Ok(labels(tx.list::<Project>()?)))
    }

    pub fn list_project_nodes(&self, project: &str) -> Result<Vec<String>> {
        self.store.read(|tx| {
            let p = require::<Project>(tx, project)?;
            Ok(labels(tx.nodes_of_project(&p.id)?))
        })
    }

    pub fn list_project_networks(&self, project: &str) -> Result<Vec<String>> {
        self.store.read(|tx| {
            let p = require::<Project>(tx, project)?;
            Ok(labels(tx.networks_of_project(&p.id)?))
        })
    }
}

use tracing::info;

/// Audit trail of successful mutations.
///
/// Each entry is a structured `tracing` event on the `audit` target, so the
/// subscriber decides where it ends up.
pub struct AuditLogger {
    enabled: bool,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn new_noop() -> Self {
        Self { enabled: false }
    }

    fn log(&self, action: &str, message: String, objects: &[&str]) {
        if !self.enabled {
            return;
        }
        info!(target: "audit", action, objects = ?objects, "{}", message);
    }

    // Users and groups
    pub fn user_created(&self, user: &str) {
        self.log("user_created", format!("User created: {}", user), &[user]);
    }

    pub fn user_deleted(&self, user: &str) {
        self.log("user_deleted", format!("User deleted: {}", user), &[user]);
    }

    pub fn group_created(&self, group: &str) {
        self.log("group_created", format!("Group created: {}", group), &[group]);
    }

    pub fn group_deleted(&self, group: &str) {
        self.log("group_deleted", format!("Group deleted: {}", group), &[group]);
    }

    pub fn group_member_added(&self, group: &str, user: &str) {
        self.log(
            "group_member_added",
            format!("User {} added to group {}", user, group),
            &[group, user],
        );
    }

    pub fn group_member_removed(&self, group: &str, user: &str) {
        self.log(
            "group_member_removed",
            format!("User {} removed from group {}", user, group),
            &[group, user],
        );
    }

    // Projects
    pub fn project_created(&self, project: &str, group: &str) {
        self.log(
            "project_created",
            format!("Project created: {} (group {})", project, group),
            &[project, group],
        );
    }

    pub fn project_deleted(&self, project: &str) {
        self.log("project_deleted", format!("Project deleted: {}", project), &[project]);
    }

    pub fn node_attached(&self, project: &str, node: &str) {
        self.log(
            "node_attached",
            format!("Node {} attached to project {}", node, project),
            &[project, node],
        );
    }

    pub fn node_detached(&self, project: &str, node: &str) {
        self.log(
            "node_detached",
            format!("Node {} detached from project {}", node, project),
            &[project, node],
        );
    }

    // Nodes
    pub fn node_registered(&self, node: &str) {
        self.log("node_registered", format!("Node registered: {}", node), &[node]);
    }

    pub fn node_deleted(&self, node: &str) {
        self.log("node_deleted", format!("Node deleted: {}", node), &[node]);
    }

    pub fn nic_registered(&self, node: &str, nic: &str, macaddr: &str) {
        self.log(
            "nic_registered",
            format!("Nic registered: {}/{} ({})", node, nic, macaddr),
            &[node, nic],
        );
    }

    pub fn nic_deleted(&self, node: &str, nic: &str) {
        self.log("nic_deleted", format!("Nic deleted: {}/{}", node, nic), &[node, nic]);
    }

    pub fn nic_connected(&self, node: &str, nic: &str, network: &str) {
        self.log(
            "nic_connected",
            format!("Nic {}/{} connected to network {}", node, nic, network),
            &[node, nic, network],
        );
    }

    pub fn nic_detached(&self, node: &str, nic: &str, network: &str) {
        self.log(
            "nic_detached",
            format!("Nic {}/{} detached from network {}", node, nic, network),
            &[node, nic, network],
        );
    }

    // Headnodes
    pub fn headnode_created(&self, headnode: &str, project: &str) {
        self.log(
            "headnode_created",
            format!("Headnode created: {} (project {})", headnode, project),
            &[headnode, project],
        );
    }

    pub fn headnode_deleted(&self, headnode: &str) {
        self.log(
            "headnode_deleted",
            format!("Headnode deleted: {}", headnode),
            &[headnode],
        );
    }

    pub fn hnic_created(&self, headnode: &str, hnic: &str) {
        self.log(
            "hnic_created",
            format!("Hnic created: {}/{}", headnode, hnic),
            &[headnode, hnic],
        );
    }

    pub fn hnic_deleted(&self, headnode: &str, hnic: &str) {
        self.log(
            "hnic_deleted",
            format!("Hnic deleted: {}/{}", headnode, hnic),
            &[headnode, hnic],
        );
    }

    pub fn hnic_connected(&self, headnode: &str, hnic: &str, network: &str) {
        self.log(
            "hnic_connected",
            format!("Hnic {}/{} connected to network {}", headnode, hnic, network),
            &[headnode, hnic, network],
        );
    }

    pub fn hnic_detached(&self, headnode: &str, hnic: &str, network: &str) {
        self.log(
            "hnic_detached",
            format!("Hnic {}/{} detached from network {}", headnode, hnic, network),
            &[headnode, hnic, network],
        );
    }

    // Networks
    pub fn network_created(&self, network: &str, project: &str, vlan: u16) {
        self.log(
            "network_created",
            format!("Network created: {} (project {}, VLAN {})", network, project, vlan),
            &[network, project],
        );
    }

    pub fn network_deleted(&self, network: &str, vlan: u16) {
        self.log(
            "network_deleted",
            format!("Network deleted: {} (VLAN {} released)", network, vlan),
            &[network],
        );
    }

    // Switches
    pub fn switch_registered(&self, switch: &str, vendor: &str) {
        self.log(
            "switch_registered",
            format!("Switch registered: {} ({})", switch, vendor),
            &[switch],
        );
    }

    pub fn switch_deleted(&self, switch: &str) {
        self.log("switch_deleted", format!("Switch deleted: {}", switch), &[switch]);
    }

    pub fn port_registered(&self, switch: &str, port: &str) {
        self.log(
            "port_registered",
            format!("Port registered: {}/{}", switch, port),
            &[switch, port],
        );
    }

    pub fn port_deleted(&self, switch: &str, port: &str) {
        self.log(
            "port_deleted",
            format!("Port deleted: {}/{}", switch, port),
            &[switch, port],
        );
    }

    pub fn port_connected(&self, switch: &str, port: &str, node: &str, nic: &str) {
        self.log(
            "port_connected",
            format!("Port {}/{} wired to nic {}/{}", switch, port, node, nic),
            &[switch, port, node, nic],
        );
    }

    pub fn port_detached(&self, switch: &str, port: &str) {
        self.log(
            "port_detached",
            format!("Port {}/{} unwired", switch, port),
            &[switch, port],
        );
    }

    pub fn port_reverted(&self, switch: &str, port: &str) {
        self.log(
            "port_reverted",
            format!("Port {}/{} reverted", switch, port),
            &[switch, port],
        );
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

use serde::Serialize;
use utoipa::ToSchema;

/// A switch port, by labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PortRef {
    pub switch: String,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NicDetails {
    pub label: String,
    pub macaddr: String,
    pub network: Option<String>,
    pub port: Option<PortRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NodeDetails {
    pub name: String,
    pub project: Option<String>,
    pub nics: Vec<NicDetails>,
}

/// An interface attached to a network: (owner, interface) labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NetworkMember {
    pub owner: String,
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NetworkDetails {
    pub name: String,
    pub project: String,
    pub vlan: u16,
    pub nics: Vec<NetworkMember>,
    pub hnics: Vec<NetworkMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HnicDetails {
    pub label: String,
    pub macaddr: String,
    pub network: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HeadnodeDetails {
    pub name: String,
    pub project: String,
    pub hnics: Vec<HnicDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SwitchDetails {
    pub name: String,
    pub vendor: String,
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PortDetails {
    pub switch: String,
    pub port: String,
    /// Node owning the wired nic.
    pub node: Option<String>,
    pub nic: Option<String>,
}

//! Records of the tenant topology.
//!
//! Relationships are held as record ids. Labels are what callers see.

use chrono::{DateTime, Utc};
use hil_switch::SwitchConfig;
use serde::Serialize;
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub label: String,
    /// Argon2 PHC string.
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: String,
    pub label: String,
    pub group_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Physical interface of a node. The label is unique within its node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nic {
    pub id: String,
    pub label: String,
    pub node_id: String,
    pub macaddr: String,
    pub network_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Network {
    pub id: String,
    pub label: String,
    pub project_id: String,
    pub vlan_tag: u16,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headnode {
    pub id: String,
    pub label: String,
    pub project_id: String,
    pub created_at: DateTime<Utc>,
}

/// Virtual interface of a headnode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hnic {
    pub id: String,
    pub label: String,
    pub headnode_id: String,
    pub macaddr: String,
    pub network_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub id: String,
    pub label: String,
    pub config: SwitchConfig,
    pub created_at: DateTime<Utc>,
}

/// Switch port. The label is unique within its switch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Port {
    pub id: String,
    pub label: String,
    pub switch_id: String,
    pub nic_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parse a MAC address written with `:` or `-` separators into canonical
/// upper-case colon form.
pub fn parse_mac_address(s: &str) -> Option<String> {
    let sep = if s.contains('-') { '-' } else { ':' };
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 6 {
        return None;
    }

    let mut mac = [0u8; 6];
    for (i, part) in parts.iter().enumerate() {
        if part.len() != 2 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        mac[i] = u8::from_str_radix(part, 16).ok()?;
    }
    Some(
        mac.iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(":"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mac_address() {
        assert_eq!(
            parse_mac_address("de:ad:be:ef:20:14").as_deref(),
            Some("DE:AD:BE:EF:20:14")
        );
        assert_eq!(
            parse_mac_address("DE-AD-BE-EF-20-14").as_deref(),
            Some("DE:AD:BE:EF:20:14")
        );
        assert_eq!(parse_mac_address("de:ad:be:ef:20"), None);
        assert_eq!(parse_mac_address("de:ad:be:ef:20:1g"), None);
        assert_eq!(parse_mac_address("de:ad:be:ef:20:+1"), None);
        assert_eq!(parse_mac_address("de:ad-be:ef:20:14"), None);
    }
}

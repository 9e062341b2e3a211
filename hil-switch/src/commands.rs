//! CLI command builders for each switch family.
//!
//! Builders are pure: they return the exact lines a driver sends, which
//! keeps vendor syntax testable without a switch.

use crate::error::DriverError;
use crate::vendor::SwitchConfig;

/// CLI dialect of a switch family, carrying the vendor extras it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    Nexus { dummy_vlan: u16 },
    DellN3000 { dummy_vlan: u16 },
    DellNos9 { interface_type: String },
    Brocade { interface_type: String },
    PowerConnect55xx,
}

impl Dialect {
    /// Dialect for a CLI-managed switch. The mock vendor has none.
    pub fn for_config(config: &SwitchConfig) -> Option<Self> {
        let dialect = match config {
            SwitchConfig::Nexus(c) => Dialect::Nexus {
                dummy_vlan: c.dummy_vlan,
            },
            SwitchConfig::DellN3000(c) => Dialect::DellN3000 {
                dummy_vlan: c.dummy_vlan,
            },
            SwitchConfig::DellNos9(c) => Dialect::DellNos9 {
                interface_type: c.interface_type.clone(),
            },
            SwitchConfig::Brocade(c) => Dialect::Brocade {
                interface_type: c.interface_type.clone(),
            },
            SwitchConfig::PowerConnect55xx(_) => Dialect::PowerConnect55xx,
            SwitchConfig::Mock(_) => return None,
        };
        Some(dialect)
    }

    /// Commands sent once after login (disable paging).
    pub fn session_setup(&self) -> Vec<String> {
        match self {
            Dialect::PowerConnect55xx => vec!["terminal datadump".to_string()],
            _ => vec!["terminal length 0".to_string()],
        }
    }

    /// Put `port` in access mode on `vlan`.
    pub fn apply_vlan(&self, port: &str, vlan: u16) -> Vec<String> {
        match self {
            Dialect::Nexus { .. } => vec![
                "configure terminal".to_string(),
                format!("interface {}", port),
                "switchport".to_string(),
                "switchport mode access".to_string(),
                format!("switchport access vlan {}", vlan),
                "no shutdown".to_string(),
                "end".to_string(),
            ],
            Dialect::DellN3000 { .. } | Dialect::PowerConnect55xx => vec![
                "configure".to_string(),
                format!("interface {}", port),
                "switchport mode access".to_string(),
                format!("switchport access vlan {}", vlan),
                "exit".to_string(),
                "exit".to_string(),
            ],
            Dialect::DellNos9 { interface_type } => vec![
                "configure".to_string(),
                format!("interface {} {}", interface_type, port),
                "switchport".to_string(),
                "no shutdown".to_string(),
                "exit".to_string(),
                format!("interface vlan {}", vlan),
                format!("untagged {} {}", interface_type, port),
                "exit".to_string(),
                "exit".to_string(),
            ],
            Dialect::Brocade { interface_type } => vec![
                "configure terminal".to_string(),
                format!("interface {} {}", interface_type, port),
                "switchport".to_string(),
                "switchport mode access".to_string(),
                format!("switchport access vlan {}", vlan),
                "no shutdown".to_string(),
                "end".to_string(),
            ],
        }
    }

    /// Remove all tenant VLAN membership from `port`.
    ///
    /// Families with a dummy VLAN park the port there; the others fall back
    /// to the switch default VLAN.
    pub fn revert_port(&self, port: &str) -> Vec<String> {
        match self {
            Dialect::Nexus { dummy_vlan } => vec![
                "configure terminal".to_string(),
                format!("interface {}", port),
                "switchport".to_string(),
                "switchport mode access".to_string(),
                format!("switchport access vlan {}", dummy_vlan),
                "end".to_string(),
            ],
            Dialect::DellN3000 { dummy_vlan } => vec![
                "configure".to_string(),
                format!("interface {}", port),
                "switchport mode access".to_string(),
                format!("switchport access vlan {}", dummy_vlan),
                "exit".to_string(),
                "exit".to_string(),
            ],
            Dialect::DellNos9 { interface_type } => vec![
                "configure".to_string(),
                format!("interface {} {}", interface_type, port),
                "shutdown".to_string(),
                "no switchport".to_string(),
                "switchport".to_string(),
                "exit".to_string(),
                "exit".to_string(),
            ],
            Dialect::Brocade { interface_type } => vec![
                "configure terminal".to_string(),
                format!("interface {} {}", interface_type, port),
                "no switchport access vlan".to_string(),
                "end".to_string(),
            ],
            Dialect::PowerConnect55xx => vec![
                "configure".to_string(),
                format!("interface {}", port),
                "no switchport access vlan".to_string(),
                "exit".to_string(),
                "exit".to_string(),
            ],
        }
    }
}

/// Reject port names that could smuggle extra CLI input.
pub fn validate_port_name(port: &str) -> Result<(), DriverError> {
    let valid = !port.is_empty()
        && port
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | ':' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(DriverError::InvalidPort(port.to_string()))
    }
}

/// Heuristic error detection on CLI output.
pub fn output_is_error(output: &str) -> bool {
    output.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with('%') || line.contains("Error") || line.contains("Invalid input")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nexus_apply_vlan() {
        let cmds = Dialect::Nexus { dummy_vlan: 2222 }.apply_vlan("Ethernet1/4", 101);
        assert_eq!(cmds[1], "interface Ethernet1/4");
        assert!(cmds.contains(&"switchport access vlan 101".to_string()));
        assert_eq!(cmds.last().unwrap(), "end");
    }

    #[test]
    fn test_nexus_revert_parks_on_dummy_vlan() {
        let cmds = Dialect::Nexus { dummy_vlan: 2222 }.revert_port("Ethernet1/4");
        assert!(cmds.contains(&"switchport access vlan 2222".to_string()));
    }

    #[test]
    fn test_nos9_uses_interface_type() {
        let dialect = Dialect::DellNos9 {
            interface_type: "TenGigabitEthernet".to_string(),
        };
        let cmds = dialect.apply_vlan("1/3", 300);
        assert!(cmds.contains(&"interface TenGigabitEthernet 1/3".to_string()));
        assert!(cmds.contains(&"interface vlan 300".to_string()));
        assert!(cmds.contains(&"untagged TenGigabitEthernet 1/3".to_string()));

        let revert = dialect.revert_port("1/3");
        assert!(revert.contains(&"no switchport".to_string()));
    }

    #[test]
    fn test_brocade_revert() {
        let dialect = Dialect::Brocade {
            interface_type: "TenGigabitEthernet".to_string(),
        };
        let cmds = dialect.revert_port("1/0/7");
        assert_eq!(cmds[1], "interface TenGigabitEthernet 1/0/7");
        assert!(cmds.contains(&"no switchport access vlan".to_string()));
    }

    #[test]
    fn test_powerconnect_setup_disables_paging() {
        assert_eq!(
            Dialect::PowerConnect55xx.session_setup(),
            vec!["terminal datadump".to_string()]
        );
    }

    #[test]
    fn test_validate_port_name() {
        assert!(validate_port_name("gi1/0/3").is_ok());
        assert!(validate_port_name("Ethernet1/4").is_ok());
        assert!(validate_port_name("").is_err());
        assert!(validate_port_name("gi1/0/3\nreload").is_err());
        assert!(validate_port_name("gi1/0/3 ; reload").is_err());
    }

    #[test]
    fn test_output_is_error() {
        assert!(output_is_error("% Invalid input detected at '^' marker."));
        assert!(output_is_error("Error: VLAN 5000 out of range"));
        assert!(!output_is_error("switch(config-if)#"));
    }
}

//! Switch vendors and their declared configuration schemas.
//!
//! Every vendor declares an ordered parameter list. Validation is driven by
//! that table alone: the same checks run for every vendor, and the typed
//! [`SwitchConfig`] variant is only built once the parameters match.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// Prefix of the schema URLs older clients send as the switch type.
pub const SCHEMA_URL_PREFIX: &str = "http://schema.massopencloud.org/haas/v0/switches/";

const CREDENTIALS: &[&str] = &["hostname", "username", "password"];
const WITH_DUMMY_VLAN: &[&str] = &["hostname", "username", "password", "dummy_vlan"];
const WITH_INTERFACE_TYPE: &[&str] = &["hostname", "username", "password", "interface_type"];

/// Supported switch families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    Nexus,
    DellN3000,
    DellNos9,
    Brocade,
    PowerConnect55xx,
    Mock,
}

impl Vendor {
    pub const ALL: [Vendor; 6] = [
        Vendor::Nexus,
        Vendor::DellN3000,
        Vendor::DellNos9,
        Vendor::Brocade,
        Vendor::PowerConnect55xx,
        Vendor::Mock,
    ];

    /// Identifier used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Nexus => "nexus",
            Vendor::DellN3000 => "delln3000",
            Vendor::DellNos9 => "dellnos9",
            Vendor::Brocade => "brocade",
            Vendor::PowerConnect55xx => "powerconnect55xx",
            Vendor::Mock => "mock",
        }
    }

    /// Ordered parameter names this vendor requires.
    pub fn parameters(&self) -> &'static [&'static str] {
        match self {
            Vendor::Nexus | Vendor::DellN3000 => WITH_DUMMY_VLAN,
            Vendor::DellNos9 | Vendor::Brocade => WITH_INTERFACE_TYPE,
            Vendor::PowerConnect55xx | Vendor::Mock => CREDENTIALS,
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = SchemaError;

    /// Accepts the short identifier or the legacy schema URL. Anything else
    /// is rejected; there is no default vendor shape.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = s.strip_prefix(SCHEMA_URL_PREFIX).unwrap_or(s);
        Vendor::ALL
            .into_iter()
            .find(|v| v.as_str() == short)
            .ok_or_else(|| SchemaError::UnknownVendor(s.to_string()))
    }
}

/// Management credentials shared by every vendor.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Config for families that park reverted ports on a placeholder VLAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DummyVlanConfig {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub dummy_vlan: u16,
}

/// Config for families that address ports as `<interface_type> <port>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Port speed family, e.g. `TenGigabitEthernet`.
    pub interface_type: String,
}

/// A validated, vendor-specific switch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "vendor", rename_all = "lowercase")]
pub enum SwitchConfig {
    Nexus(DummyVlanConfig),
    DellN3000(DummyVlanConfig),
    DellNos9(InterfaceConfig),
    Brocade(InterfaceConfig),
    PowerConnect55xx(Credentials),
    Mock(Credentials),
}

impl SwitchConfig {
    /// Validate a parameter mapping against the vendor's declared schema.
    pub fn validate(vendor: Vendor, params: &Value) -> Result<Self, SchemaError> {
        let obj = params.as_object().ok_or(SchemaError::NotAnObject)?;
        let declared = vendor.parameters();

        if let Some(unknown) = obj.keys().find(|k| !declared.contains(&k.as_str())) {
            return Err(SchemaError::UnknownField(unknown.clone()));
        }

        let mut fields = HashMap::with_capacity(declared.len());
        for name in declared {
            let value = obj
                .get(*name)
                .ok_or_else(|| SchemaError::MissingField(name.to_string()))?;
            let value = value
                .as_str()
                .ok_or_else(|| SchemaError::WrongType(name.to_string()))?;
            fields.insert(*name, value);
        }

        Self::build(vendor, &fields)
    }

    /// Build a config from positional arguments in declared order.
    pub fn from_args(vendor: Vendor, args: &[String]) -> Result<Self, SchemaError> {
        let declared = vendor.parameters();
        if args.len() != declared.len() {
            return Err(SchemaError::Arity {
                vendor: vendor.to_string(),
                expected: declared.len(),
                actual: args.len(),
                fields: declared.join("> <"),
            });
        }

        let fields = declared
            .iter()
            .copied()
            .zip(args.iter().map(String::as_str))
            .collect();
        Self::build(vendor, &fields)
    }

    fn build(vendor: Vendor, fields: &HashMap<&str, &str>) -> Result<Self, SchemaError> {
        let field = |name: &str| -> Result<String, SchemaError> {
            let value = fields
                .get(name)
                .ok_or_else(|| SchemaError::MissingField(name.to_string()))?;
            if value.trim().is_empty() {
                return Err(SchemaError::InvalidValue {
                    field: name.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            Ok(value.to_string())
        };

        let credentials = Credentials {
            hostname: field("hostname")?,
            username: field("username")?,
            password: field("password")?,
        };

        let config = match vendor {
            Vendor::Nexus | Vendor::DellN3000 => {
                let raw = field("dummy_vlan")?;
                let dummy_vlan = parse_vlan(&raw).ok_or_else(|| SchemaError::InvalidValue {
                    field: "dummy_vlan".to_string(),
                    reason: format!("'{}' is not a VLAN id in 1..=4094", raw),
                })?;
                let cfg = DummyVlanConfig {
                    credentials,
                    dummy_vlan,
                };
                if vendor == Vendor::Nexus {
                    SwitchConfig::Nexus(cfg)
                } else {
                    SwitchConfig::DellN3000(cfg)
                }
            }
            Vendor::DellNos9 | Vendor::Brocade => {
                let interface_type = field("interface_type")?;
                if interface_type.chars().any(char::is_whitespace) {
                    return Err(SchemaError::InvalidValue {
                        field: "interface_type".to_string(),
                        reason: "must be a single word such as TenGigabitEthernet".to_string(),
                    });
                }
                let cfg = InterfaceConfig {
                    credentials,
                    interface_type,
                };
                if vendor == Vendor::DellNos9 {
                    SwitchConfig::DellNos9(cfg)
                } else {
                    SwitchConfig::Brocade(cfg)
                }
            }
            Vendor::PowerConnect55xx => SwitchConfig::PowerConnect55xx(credentials),
            Vendor::Mock => SwitchConfig::Mock(credentials),
        };
        Ok(config)
    }

    pub fn vendor(&self) -> Vendor {
        match self {
            SwitchConfig::Nexus(_) => Vendor::Nexus,
            SwitchConfig::DellN3000(_) => Vendor::DellN3000,
            SwitchConfig::DellNos9(_) => Vendor::DellNos9,
            SwitchConfig::Brocade(_) => Vendor::Brocade,
            SwitchConfig::PowerConnect55xx(_) => Vendor::PowerConnect55xx,
            SwitchConfig::Mock(_) => Vendor::Mock,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        match self {
            SwitchConfig::Nexus(c) | SwitchConfig::DellN3000(c) => &c.credentials,
            SwitchConfig::DellNos9(c) | SwitchConfig::Brocade(c) => &c.credentials,
            SwitchConfig::PowerConnect55xx(c) | SwitchConfig::Mock(c) => c,
        }
    }

    pub fn dummy_vlan(&self) -> Option<u16> {
        match self {
            SwitchConfig::Nexus(c) | SwitchConfig::DellN3000(c) => Some(c.dummy_vlan),
            _ => None,
        }
    }

    pub fn interface_type(&self) -> Option<&str> {
        match self {
            SwitchConfig::DellNos9(c) | SwitchConfig::Brocade(c) => Some(&c.interface_type),
            _ => None,
        }
    }
}

/// Parse an 802.1Q VLAN id, excluding the reserved 0 and 4095.
pub fn parse_vlan(s: &str) -> Option<u16> {
    s.trim()
        .parse::<u16>()
        .ok()
        .filter(|id| (1..=4094).contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_vendor_from_str() {
        assert_eq!("nexus".parse::<Vendor>().unwrap(), Vendor::Nexus);
        assert_eq!("dellnos9".parse::<Vendor>().unwrap(), Vendor::DellNos9);
        assert_eq!(
            format!("{}brocade", SCHEMA_URL_PREFIX)
                .parse::<Vendor>()
                .unwrap(),
            Vendor::Brocade
        );
    }

    #[test]
    fn test_unknown_vendor_fails_closed() {
        // Unrecognised subtypes must not fall through to the brocade shape.
        let err = "juniper".parse::<Vendor>().unwrap_err();
        assert_eq!(err, SchemaError::UnknownVendor("juniper".to_string()));
    }

    #[test]
    fn test_validate_nexus() {
        let cfg = SwitchConfig::validate(
            Vendor::Nexus,
            &json!({
                "hostname": "sw0.example.com",
                "username": "admin",
                "password": "secret",
                "dummy_vlan": "2222"
            }),
        )
        .unwrap();
        assert_eq!(cfg.vendor(), Vendor::Nexus);
        assert_eq!(cfg.dummy_vlan(), Some(2222));
        assert_eq!(cfg.credentials().hostname, "sw0.example.com");
    }

    #[test]
    fn test_validate_rejects_unknown_field() {
        let err = SwitchConfig::validate(
            Vendor::Mock,
            &json!({
                "hostname": "h",
                "username": "u",
                "password": "p",
                "dummy_vlan": "10"
            }),
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::UnknownField("dummy_vlan".to_string()));
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let err = SwitchConfig::validate(
            Vendor::Brocade,
            &json!({"hostname": "h", "username": "u", "password": "p"}),
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::MissingField("interface_type".to_string()));
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let err = SwitchConfig::validate(
            Vendor::PowerConnect55xx,
            &json!({"hostname": "h", "username": "u", "password": 42}),
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::WrongType("password".to_string()));

        let err = SwitchConfig::validate(Vendor::Mock, &json!(["h", "u", "p"])).unwrap_err();
        assert_eq!(err, SchemaError::NotAnObject);
    }

    #[test]
    fn test_validate_rejects_bad_dummy_vlan() {
        let err = SwitchConfig::validate(
            Vendor::DellN3000,
            &json!({
                "hostname": "h",
                "username": "u",
                "password": "p",
                "dummy_vlan": "4095"
            }),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { ref field, .. } if field == "dummy_vlan"));
    }

    #[test]
    fn test_from_args_arity() {
        let err = SwitchConfig::from_args(Vendor::Nexus, &args(&["h", "u", "p"])).unwrap_err();
        match err {
            SchemaError::Arity {
                expected, actual, ..
            } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let cfg = SwitchConfig::from_args(
            Vendor::DellNos9,
            &args(&["h", "u", "p", "TenGigabitEthernet"]),
        )
        .unwrap();
        assert_eq!(cfg.interface_type(), Some("TenGigabitEthernet"));
    }

    #[test]
    fn test_config_storage_format() {
        let cfg = SwitchConfig::from_args(Vendor::Nexus, &args(&["h", "u", "p", "100"])).unwrap();
        let stored = serde_json::to_value(&cfg).unwrap();
        assert_eq!(stored["vendor"], "nexus");
        assert_eq!(stored["dummy_vlan"], 100);
        let restored: SwitchConfig = serde_json::from_value(stored).unwrap();
        assert_eq!(restored, cfg);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let cfg = SwitchConfig::from_args(Vendor::Mock, &args(&["h", "u", "hunter2"])).unwrap();
        assert!(!format!("{:?}", cfg).contains("hunter2"));
    }
}

//! Row mapping for every record type.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use rusqlite::types::{Type, Value};

use super::error::Result;
use crate::model::{Group, Headnode, Hnic, Network, Nic, Node, Port, Project, Switch, User};

/// A record stored in its own table, keyed by `id`.
pub trait Record: Sized {
    const TABLE: &'static str;
    /// Name used in caller-facing messages.
    const KIND: &'static str;
    /// Column order shared by `from_row` and `to_values`. `id` and `label`
    /// always come first.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;
    fn label(&self) -> &str;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn to_values(&self) -> Result<Vec<Value>>;
}

/// Records whose label is unique across the whole system.
pub trait Labelled: Record {}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn opt_text(s: &Option<String>) -> Value {
    match s {
        Some(s) => text(s),
        None => Value::Null,
    }
}

fn time(t: &DateTime<Utc>) -> Value {
    Value::Text(t.to_rfc3339())
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl Record for User {
    const TABLE: &'static str = "users";
    const KIND: &'static str = "user";
    const COLUMNS: &'static [&'static str] = &["id", "label", "password_hash", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: timestamp(row, 3)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            text(&self.password_hash),
            time(&self.created_at),
        ])
    }
}

impl Labelled for User {}

impl Record for Group {
    const TABLE: &'static str = "access_groups";
    const KIND: &'static str = "group";
    const COLUMNS: &'static [&'static str] = &["id", "label", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            created_at: timestamp(row, 2)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            time(&self.created_at),
        ])
    }
}

impl Labelled for Group {}

impl Record for Project {
    const TABLE: &'static str = "projects";
    const KIND: &'static str = "project";
    const COLUMNS: &'static [&'static str] = &["id", "label", "group_id", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            group_id: row.get(2)?,
            created_at: timestamp(row, 3)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            text(&self.group_id),
            time(&self.created_at),
        ])
    }
}

impl Labelled for Project {}

impl Record for Node {
    const TABLE: &'static str = "nodes";
    const KIND: &'static str = "node";
    const COLUMNS: &'static [&'static str] = &["id", "label", "project_id", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            project_id: row.get(2)?,
            created_at: timestamp(row, 3)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            opt_text(&self.project_id),
            time(&self.created_at),
        ])
    }
}

impl Labelled for Node {}

impl Record for Nic {
    const TABLE: &'static str = "nics";
    const KIND: &'static str = "nic";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "label",
        "node_id",
        "macaddr",
        "network_id",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            node_id: row.get(2)?,
            macaddr: row.get(3)?,
            network_id: row.get(4)?,
            created_at: timestamp(row, 5)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            text(&self.node_id),
            text(&self.macaddr),
            opt_text(&self.network_id),
            time(&self.created_at),
        ])
    }
}

impl Record for Network {
    const TABLE: &'static str = "networks";
    const KIND: &'static str = "network";
    const COLUMNS: &'static [&'static str] =
        &["id", "label", "project_id", "vlan_tag", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            project_id: row.get(2)?,
            vlan_tag: row.get(3)?,
            created_at: timestamp(row, 4)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            text(&self.project_id),
            Value::Integer(i64::from(self.vlan_tag)),
            time(&self.created_at),
        ])
    }
}

impl Labelled for Network {}

impl Record for Headnode {
    const TABLE: &'static str = "headnodes";
    const KIND: &'static str = "headnode";
    const COLUMNS: &'static [&'static str] = &["id", "label", "project_id", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            project_id: row.get(2)?,
            created_at: timestamp(row, 3)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            text(&self.project_id),
            time(&self.created_at),
        ])
    }
}

impl Labelled for Headnode {}

impl Record for Hnic {
    const TABLE: &'static str = "hnics";
    const KIND: &'static str = "hnic";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "label",
        "headnode_id",
        "macaddr",
        "network_id",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            headnode_id: row.get(2)?,
            macaddr: row.get(3)?,
            network_id: row.get(4)?,
            created_at: timestamp(row, 5)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            text(&self.headnode_id),
            text(&self.macaddr),
            opt_text(&self.network_id),
            time(&self.created_at),
        ])
    }
}

impl Labelled for Hnic {}

impl Record for Switch {
    const TABLE: &'static str = "switches";
    const KIND: &'static str = "switch";
    const COLUMNS: &'static [&'static str] = &["id", "label", "vendor", "config", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let raw: String = row.get(3)?;
        let config = serde_json::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            config,
            created_at: timestamp(row, 4)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            text(self.config.vendor().as_str()),
            Value::Text(serde_json::to_string(&self.config)?),
            time(&self.created_at),
        ])
    }
}

impl Labelled for Switch {}

impl Record for Port {
    const TABLE: &'static str = "ports";
    const KIND: &'static str = "port";
    const COLUMNS: &'static [&'static str] = &["id", "label", "switch_id", "nic_id", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            switch_id: row.get(2)?,
            nic_id: row.get(3)?,
            created_at: timestamp(row, 4)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.id),
            text(&self.label),
            text(&self.switch_id),
            opt_text(&self.nic_id),
            time(&self.created_at),
        ])
    }
}

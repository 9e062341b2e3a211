//! SQLite-backed entity store.

use std::path::Path;
use std::sync::Mutex;

use refinery::embed_migrations;
use rusqlite::{Connection, OptionalExtension, Params, params, params_from_iter};
use tracing::info;

use super::error::Result;
use super::records::{Labelled, Record};
use crate::model::{Group, Headnode, Hnic, Network, Nic, Node, Port, Project, User};

embed_migrations!("migrations");

/// SQLite storage for the whole topology.
///
/// One connection behind a mutex: every transaction is serialized, so a
/// read-check-write sequence inside [`Store::with_transaction`] never
/// observes a concurrent writer.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened store");
        Self::init(conn)
    }

    /// Create an in-memory store (for testing and dev mode).
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::runner().run(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` in one transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn with_transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Tx<'_>) -> std::result::Result<T, E>,
        E: From<super::StoreError>,
    {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| E::from(super::StoreError::from(e)))?;
        let out = f(&Tx { conn: &tx })?;
        tx.commit()
            .map_err(|e| E::from(super::StoreError::from(e)))?;
        Ok(out)
    }

    /// Run a read-only closure under the store lock.
    pub fn read<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Tx<'_>) -> std::result::Result<T, E>,
    {
        let conn = self.conn.lock().unwrap();
        f(&Tx { conn: &conn })
    }
}

/// Handle to an open transaction.
pub struct Tx<'a> {
    conn: &'a Connection,
}

impl<'a> Tx<'a> {
    pub(crate) fn conn(&self) -> &Connection {
        self.conn
    }

    // ========== Generic record access ==========

    pub fn create<R: Record>(&self, record: &R) -> Result<()> {
        let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders.join(", ")
        );
        self.conn
            .execute(&sql, params_from_iter(record.to_values()?))?;
        Ok(())
    }

    /// Look up a globally labelled record. Absence is not an error.
    pub fn get<R: Labelled>(&self, label: &str) -> Result<Option<R>> {
        self.select_one::<R, _>("label = ?1", params![label])
    }

    pub fn get_by_id<R: Record>(&self, id: &str) -> Result<Option<R>> {
        self.select_one::<R, _>("id = ?1", params![id])
    }

    pub fn delete<R: Record>(&self, record: &R) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);
        self.conn.execute(&sql, params![record.id()])?;
        Ok(())
    }

    /// All records of a type, ordered by label.
    pub fn list<R: Record>(&self) -> Result<Vec<R>> {
        self.select::<R, _>("1 = 1", params![])
    }

    fn select<R: Record, P: Params>(&self, clause: &str, params: P) -> Result<Vec<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY label",
            R::COLUMNS.join(", "),
            R::TABLE,
            clause
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params, |row| R::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn select_one<R: Record, P: Params>(&self, clause: &str, params: P) -> Result<Option<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            R::COLUMNS.join(", "),
            R::TABLE,
            clause
        );
        let record = self
            .conn
            .query_row(&sql, params, |row| R::from_row(row))
            .optional()?;
        Ok(record)
    }

    // ========== Scoped lookups ==========

    pub fn get_nic(&self, node_id: &str, label: &str) -> Result<Option<Nic>> {
        self.select_one("node_id = ?1 AND label = ?2", params![node_id, label])
    }

    pub fn get_hnic(&self, headnode_id: &str, label: &str) -> Result<Option<Hnic>> {
        self.select_one("headnode_id = ?1 AND label = ?2", params![headnode_id, label])
    }

    pub fn get_port(&self, switch_id: &str, label: &str) -> Result<Option<Port>> {
        self.select_one("switch_id = ?1 AND label = ?2", params![switch_id, label])
    }

    pub fn port_for_nic(&self, nic_id: &str) -> Result<Option<Port>> {
        self.select_one("nic_id = ?1", params![nic_id])
    }

    pub fn headnode_of_project(&self, project_id: &str) -> Result<Option<Headnode>> {
        self.select_one("project_id = ?1", params![project_id])
    }

    // ========== Listings ==========

    pub fn nics_of_node(&self, node_id: &str) -> Result<Vec<Nic>> {
        self.select("node_id = ?1", params![node_id])
    }

    pub fn hnics_of_headnode(&self, headnode_id: &str) -> Result<Vec<Hnic>> {
        self.select("headnode_id = ?1", params![headnode_id])
    }

    pub fn ports_of_switch(&self, switch_id: &str) -> Result<Vec<Port>> {
        self.select("switch_id = ?1", params![switch_id])
    }

    pub fn nodes_of_project(&self, project_id: &str) -> Result<Vec<Node>> {
        self.select("project_id = ?1", params![project_id])
    }

    pub fn networks_of_project(&self, project_id: &str) -> Result<Vec<Network>> {
        self.select("project_id = ?1", params![project_id])
    }

    pub fn projects_of_group(&self, group_id: &str) -> Result<Vec<Project>> {
        self.select("group_id = ?1", params![group_id])
    }

    /// Nodes not attached to any project.
    pub fn free_nodes(&self) -> Result<Vec<Node>> {
        self.select("project_id IS NULL", params![])
    }

    pub fn nics_on_network(&self, network_id: &str) -> Result<Vec<Nic>> {
        self.select("network_id = ?1", params![network_id])
    }

    pub fn hnics_on_network(&self, network_id: &str) -> Result<Vec<Hnic>> {
        self.select("network_id = ?1", params![network_id])
    }

    // ========== Relationship updates ==========

    fn set_column(&self, table: &str, column: &str, id: &str, value: Option<&str>) -> Result<()> {
        let sql = format!("UPDATE {} SET {} = ?1 WHERE id = ?2", table, column);
        self.conn.execute(&sql, params![value, id])?;
        Ok(())
    }

    pub fn set_node_project(&self, node_id: &str, project_id: Option<&str>) -> Result<()> {
        self.set_column(Node::TABLE, "project_id", node_id, project_id)
    }

    pub fn set_nic_network(&self, nic_id: &str, network_id: Option<&str>) -> Result<()> {
        self.set_column(Nic::TABLE, "network_id", nic_id, network_id)
    }

    pub fn set_hnic_network(&self, hnic_id: &str, network_id: Option<&str>) -> Result<()> {
        self.set_column(Hnic::TABLE, "network_id", hnic_id, network_id)
    }

    pub fn set_port_nic(&self, port_id: &str, nic_id: Option<&str>) -> Result<()> {
        self.set_column(Port::TABLE, "nic_id", port_id, nic_id)
    }

    // ========== Group membership ==========

    pub fn add_membership(&self, user_id: &str, group_id: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO group_members (user_id, group_id) VALUES (?1, ?2)",
            params![user_id, group_id],
        )?;
        Ok(())
    }

    /// Returns whether a membership was removed.
    pub fn remove_membership(&self, user_id: &str, group_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM group_members WHERE user_id = ?1 AND group_id = ?2",
            params![user_id, group_id],
        )?;
        Ok(removed > 0)
    }

    pub fn is_member(&self, user_id: &str, group_id: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM group_members WHERE user_id = ?1 AND group_id = ?2",
                params![user_id, group_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn users_of_group(&self, group_id: &str) -> Result<Vec<User>> {
        self.select(
            "id IN (SELECT user_id FROM group_members WHERE group_id = ?1)",
            params![group_id],
        )
    }

    pub fn groups_of_user(&self, user_id: &str) -> Result<Vec<Group>> {
        self.select(
            "id IN (SELECT group_id FROM group_members WHERE user_id = ?1)",
            params![user_id],
        )
    }
}

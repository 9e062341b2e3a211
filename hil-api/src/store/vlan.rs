//! VLAN tag pool.
//!
//! Tags live in the `vlans` table with an availability flag, so allocation
//! and release commit together with the network row that holds the tag.

use std::fmt;
use std::str::FromStr;

use rusqlite::{OptionalExtension, params};
use thiserror::Error;
use tracing::{debug, error};

use super::error::{Result, StoreError};
use super::sqlite::Tx;

pub const MIN_VLAN: u16 = 1;
pub const MAX_VLAN: u16 = 4094;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VlanRangeError {
    #[error("empty VLAN range")]
    Empty,

    #[error("invalid VLAN id '{0}' (expected 1..=4094)")]
    InvalidTag(String),

    #[error("VLAN range {0}-{1} is reversed")]
    Reversed(u16, u16),
}

/// Inclusive range of VLAN tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanRange {
    pub start: u16,
    pub end: u16,
}

impl VlanRange {
    /// Parse a comma-separated list such as `"100-199,300,400-410"`.
    pub fn parse_list(s: &str) -> std::result::Result<Vec<VlanRange>, VlanRangeError> {
        let ranges = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<std::result::Result<Vec<VlanRange>, _>>()?;
        if ranges.is_empty() {
            return Err(VlanRangeError::Empty);
        }
        Ok(ranges)
    }

    pub fn tags(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

fn parse_tag(s: &str) -> std::result::Result<u16, VlanRangeError> {
    s.trim()
        .parse::<u16>()
        .ok()
        .filter(|t| (MIN_VLAN..=MAX_VLAN).contains(t))
        .ok_or_else(|| VlanRangeError::InvalidTag(s.trim().to_string()))
}

impl FromStr for VlanRange {
    type Err = VlanRangeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (start, end) = match s.split_once('-') {
            Some((a, b)) => (parse_tag(a)?, parse_tag(b)?),
            None => {
                let tag = parse_tag(s)?;
                (tag, tag)
            }
        };
        if start > end {
            return Err(VlanRangeError::Reversed(start, end));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for VlanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Allocation and release of VLAN tags inside a store transaction.
pub struct VlanPool;

impl VlanPool {
    /// Add tags to the pool. Tags already known keep their state.
    pub fn seed(tx: &Tx<'_>, ranges: &[VlanRange]) -> Result<usize> {
        let mut stmt = tx
            .conn()
            .prepare("INSERT OR IGNORE INTO vlans (tag, available) VALUES (?1, 1)")?;
        let mut added = 0;
        for range in ranges {
            for tag in range.tags() {
                added += stmt.execute(params![tag])?;
            }
        }
        Ok(added)
    }

    /// Take the lowest available tag, or `None` when the pool is exhausted.
    pub fn allocate(tx: &Tx<'_>) -> Result<Option<u16>> {
        let tag: Option<u16> = tx
            .conn()
            .query_row(
                "SELECT tag FROM vlans WHERE available = 1 ORDER BY tag LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(tag) = tag {
            tx.conn()
                .execute("UPDATE vlans SET available = 0 WHERE tag = ?1", params![tag])?;
            debug!(vlan = tag, "Allocated VLAN");
        }
        Ok(tag)
    }

    /// Return a tag to the pool.
    ///
    /// Releasing a tag that is not currently allocated means the bookkeeping
    /// is broken; the enclosing transaction must abort.
    pub fn release(tx: &Tx<'_>, tag: u16) -> Result<()> {
        let changed = tx.conn().execute(
            "UPDATE vlans SET available = 1 WHERE tag = ?1 AND available = 0",
            params![tag],
        )?;
        if changed == 0 {
            error!(vlan = tag, "Released VLAN that was not allocated");
            return Err(StoreError::Inconsistent(format!(
                "VLAN {} released but not allocated",
                tag
            )));
        }
        debug!(vlan = tag, "Released VLAN");
        Ok(())
    }

    pub fn available_count(tx: &Tx<'_>) -> Result<usize> {
        let count: i64 = tx.conn().query_row(
            "SELECT COUNT(*) FROM vlans WHERE available = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

//! Management sessions to a switch CLI.
//!
//! Drivers only see these traits. How bytes reach the switch (console,
//! SSH, a recorded script in tests) is decided by the [`Connector`] the
//! registry was built with.

use async_trait::async_trait;

use crate::error::DriverError;
use crate::vendor::Credentials;

/// Where and how to log in.
#[derive(Debug, Clone)]
pub struct Target {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl From<&Credentials> for Target {
    fn from(c: &Credentials) -> Self {
        Self {
            hostname: c.hostname.clone(),
            username: c.username.clone(),
            password: c.password.clone(),
        }
    }
}

/// Opens authenticated sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, target: &Target) -> Result<Box<dyn Session>, DriverError>;
}

/// A logged-in CLI session.
#[async_trait]
pub trait Session: Send {
    /// Run one command line and return its output.
    async fn run(&mut self, command: &str) -> Result<String, DriverError>;

    /// Log out and release the connection.
    async fn close(self: Box<Self>) -> Result<(), DriverError>;
}

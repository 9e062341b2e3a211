//! Line-oriented TCP console transport.
//!
//! Logs in on the username/password prompts, then writes one command per
//! line and collects output until the CLI prompt (a last line ending in `#`
//! or `>`) comes back. No telnet option negotiation is performed.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::DriverError;
use crate::session::{Connector, Session, Target};

pub const DEFAULT_CONSOLE_PORT: u16 = 23;

const READ_CHUNK: usize = 4096;

/// Opens console sessions on a fixed TCP port unless the hostname names one.
#[derive(Debug, Clone)]
pub struct ConsoleConnector {
    port: u16,
}

impl ConsoleConnector {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    fn address(&self, host: &str) -> String {
        if host.parse::<SocketAddr>().is_ok() {
            return host.to_string();
        }
        match host.rsplit_once(':') {
            Some((name, port)) if !name.contains(':') && port.parse::<u16>().is_ok() => {
                host.to_string()
            }
            _ if host.contains(':') => format!("[{}]:{}", host, self.port),
            _ => format!("{}:{}", host, self.port),
        }
    }
}

impl Default for ConsoleConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONSOLE_PORT)
    }
}

#[async_trait]
impl Connector for ConsoleConnector {
    async fn connect(&self, target: &Target) -> Result<Box<dyn Session>, DriverError> {
        let addr = self.address(&target.hostname);
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| DriverError::Connect {
                host: target.hostname.clone(),
                source,
            })?;
        debug!(host = %target.hostname, addr = %addr, "Console connected");

        let mut session = ConsoleSession {
            host: target.hostname.clone(),
            stream,
            buf: String::new(),
        };
        session.login(&target.username, &target.password).await?;
        Ok(Box::new(session))
    }
}

struct ConsoleSession {
    host: String,
    stream: TcpStream,
    buf: String,
}

fn last_line(text: &str) -> &str {
    text.trim_end().rsplit('\n').next().unwrap_or("").trim()
}

fn is_cli_prompt(text: &str) -> bool {
    let line = last_line(text);
    !line.is_empty() && (line.ends_with('#') || line.ends_with('>'))
}

fn is_username_prompt(text: &str) -> bool {
    let line = last_line(text).to_ascii_lowercase();
    line.ends_with("username:") || line.ends_with("login:") || line.ends_with("user name:")
}

fn is_password_prompt(text: &str) -> bool {
    last_line(text).to_ascii_lowercase().ends_with("password:")
}

fn is_login_refused(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("denied") || lower.contains("failed") || lower.contains("incorrect")
}

impl ConsoleSession {
    async fn login(&mut self, username: &str, password: &str) -> Result<(), DriverError> {
        let banner = self.read_until(|t| is_username_prompt(t) || is_cli_prompt(t)).await?;
        if is_cli_prompt(&banner) {
            // Console is already logged in.
            return Ok(());
        }

        self.write_line(username).await?;
        self.read_until(is_password_prompt).await?;
        self.write_line(password).await?;

        let reply = self
            .read_until(|t| is_cli_prompt(t) || is_username_prompt(t) || is_login_refused(t))
            .await?;
        if !is_cli_prompt(&reply) || is_login_refused(&reply) {
            return Err(DriverError::Authentication(self.host.clone()));
        }
        debug!(host = %self.host, "Console login succeeded");
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> Result<(), DriverError> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.write_all(b"\n").await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Read until `done` accepts everything received since the last call.
    async fn read_until<F>(&mut self, done: F) -> Result<String, DriverError>
    where
        F: Fn(&str) -> bool,
    {
        self.buf.clear();
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if done(&self.buf) {
                return Ok(std::mem::take(&mut self.buf));
            }
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(DriverError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("console on {} closed the connection", self.host),
                )));
            }
            self.buf.push_str(&String::from_utf8_lossy(&chunk[..n]));
        }
    }
}

#[async_trait]
impl Session for ConsoleSession {
    async fn run(&mut self, command: &str) -> Result<String, DriverError> {
        self.write_line(command).await?;
        let raw = self.read_until(is_cli_prompt).await?;

        // Drop the echoed command and the trailing prompt.
        let mut lines: Vec<&str> = raw.trim_end().lines().collect();
        lines.pop();
        if lines.first().map(|l| l.trim()) == Some(command) {
            lines.remove(0);
        }
        Ok(lines.join("\n"))
    }

    async fn close(mut self: Box<Self>) -> Result<(), DriverError> {
        // The switch may drop the connection before we finish writing.
        let _ = self.write_line("exit").await;
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_detection() {
        assert!(is_cli_prompt("banner\nswitch#"));
        assert!(is_cli_prompt("switch(config-if)# "));
        assert!(is_cli_prompt("console>"));
        assert!(!is_cli_prompt("Building configuration..."));
        assert!(is_username_prompt("Welcome\r\nUser Name:"));
        assert!(is_username_prompt("switch login: "));
        assert!(is_password_prompt("Password:"));
    }

    #[test]
    fn test_address() {
        let c = ConsoleConnector::new(23);
        assert_eq!(c.address("sw0.example.com"), "sw0.example.com:23");
        assert_eq!(c.address("127.0.0.1:2323"), "127.0.0.1:2323");
        assert_eq!(c.address("sw0:2323"), "sw0:2323");
        assert_eq!(c.address("fd00::1"), "[fd00::1]:23");
    }
}

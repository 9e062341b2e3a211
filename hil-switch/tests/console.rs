//! CLI driver over the console transport against a fake switch.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hil_switch::{CliDriver, ConsoleConnector, DriverError, SwitchConfig, SwitchDriver, Vendor};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

const PASSWORD: &str = "secret";

/// Serves a minimal switch CLI. Any command mentioning `vlan 999` is
/// rejected. Returns the listen address and the log of received commands.
async fn fake_switch() -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let log = log.clone();
            tokio::spawn(async move {
                let (read, mut write) = stream.into_split();
                let mut lines = BufReader::new(read).lines();

                write.write_all(b"Welcome\r\nUser Name:").await.unwrap();
                let Ok(Some(_user)) = lines.next_line().await else {
                    return;
                };
                write.write_all(b"Password:").await.unwrap();
                let Ok(Some(password)) = lines.next_line().await else {
                    return;
                };
                if password.trim() != PASSWORD {
                    write.write_all(b"\r\nAccess denied\r\nUser Name:").await.unwrap();
                    return;
                }
                write.write_all(b"\r\nswitch#").await.unwrap();

                while let Ok(Some(line)) = lines.next_line().await {
                    let line = line.trim().to_string();
                    log.lock().unwrap().push(line.clone());
                    if line == "exit" {
                        return;
                    }
                    let mut reply = format!("{}\r\n", line);
                    if line.contains("vlan 999") {
                        reply.push_str("% Invalid input detected at '^' marker.\r\n");
                    }
                    reply.push_str("switch#");
                    if write.write_all(reply.as_bytes()).await.is_err() {
                        return;
                    }
                }
            });
        }
    });

    (addr, received)
}

fn nexus(hostname: &str, password: &str) -> SwitchConfig {
    let args: Vec<String> = [hostname, "admin", password, "2222"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    SwitchConfig::from_args(Vendor::Nexus, &args).unwrap()
}

fn driver(config: &SwitchConfig) -> CliDriver {
    CliDriver::new(
        "sw0",
        config,
        Arc::new(ConsoleConnector::default()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_apply_vlan_over_console() {
    let (addr, received) = fake_switch().await;
    let driver = driver(&nexus(&addr, PASSWORD));

    driver.apply_vlan("Ethernet1/4", 101).await.unwrap();

    let received = received.lock().unwrap().clone();
    assert_eq!(received.first().map(String::as_str), Some("terminal length 0"));
    assert!(received.contains(&"interface Ethernet1/4".to_string()));
    assert!(received.contains(&"switchport access vlan 101".to_string()));
}

#[tokio::test]
async fn test_revert_parks_on_dummy_vlan() {
    let (addr, received) = fake_switch().await;
    let driver = driver(&nexus(&addr, PASSWORD));

    driver.revert_port("Ethernet1/4").await.unwrap();

    let received = received.lock().unwrap().clone();
    assert!(received.contains(&"switchport access vlan 2222".to_string()));
}

#[tokio::test]
async fn test_switch_rejection_is_reported() {
    let (addr, _) = fake_switch().await;
    let driver = driver(&nexus(&addr, PASSWORD));

    let err = driver.apply_vlan("Ethernet1/4", 999).await.unwrap_err();
    match err {
        DriverError::Rejected { command, output } => {
            assert_eq!(command, "switchport access vlan 999");
            assert!(output.starts_with('%'));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_password() {
    let (addr, _) = fake_switch().await;
    let driver = driver(&nexus(&addr, "wrong"));

    let err = driver.apply_vlan("Ethernet1/4", 101).await.unwrap_err();
    assert!(matches!(err, DriverError::Authentication(_)));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let driver = driver(&nexus(&addr, PASSWORD));
    let err = driver.revert_port("Ethernet1/4").await.unwrap_err();
    assert!(matches!(err, DriverError::Connect { .. }));
}

//! Single-instance enforcement
//!
//! The first process binds a loopback port and listens on it. A later launch
//! finds the port taken, asks the running instance to show itself, and exits.

use std::io::{self, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener as StdListener, TcpStream};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedSender;

use crate::business::AppEvent;

pub const INSTANCE_PORT: u16 = 47_163;

const SHOW_REQUEST: &str = "show";
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

pub enum InstanceRole {
    /// This process owns the instance lock.
    Primary(InstanceGuard),
    /// Another instance is running and has been asked to show itself.
    Secondary,
}

/// Holds the instance lock for as long as it lives.
pub struct InstanceGuard {
    listener: Option<StdListener>,
}

/// Claim the single-instance lock on `port`.
///
/// If the port is held by something that does not answer like a running
/// instance, the lock is skipped and this process runs as primary.
pub fn acquire(port: u16) -> InstanceRole {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

    match StdListener::bind(addr) {
        Ok(listener) => {
            tracing::debug!("Instance lock held on {}", addr);
            InstanceRole::Primary(InstanceGuard {
                listener: Some(listener),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => match signal_running(addr) {
            Ok(()) => {
                tracing::info!("Another instance is running, asked it to show");
                InstanceRole::Secondary
            }
            Err(e) => {
                tracing::warn!("Port {} busy but no instance answered: {}", port, e);
                InstanceRole::Primary(InstanceGuard { listener: None })
            }
        },
        Err(e) => {
            tracing::warn!("Cannot take instance lock on {}: {}", addr, e);
            InstanceRole::Primary(InstanceGuard { listener: None })
        }
    }
}

fn signal_running(addr: SocketAddr) -> io::Result<()> {
    let mut stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)?;
    writeln!(stream, "{}", SHOW_REQUEST)?;
    stream.flush()
}

/// Whether a line received from a later launch asks to show the view.
pub fn is_show_request(line: &str) -> bool {
    line.trim() == SHOW_REQUEST
}

impl InstanceGuard {
    /// Forward show requests from later launches as [`AppEvent::ShowWindow`].
    pub fn listen(&mut self, events: UnboundedSender<AppEvent>) {
        let Some(listener) = self.listener.take() else {
            return;
        };

        let listener = match listener
            .set_nonblocking(true)
            .and_then(|()| TcpListener::from_std(listener))
        {
            Ok(listener) => listener,
            Err(e) => {
                tracing::warn!("Cannot listen for other instances: {}", e);
                return;
            }
        };

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!("Instance listener failed: {}", e);
                        break;
                    }
                };

                let mut line = String::new();
                let mut reader = BufReader::new(stream);
                if reader.read_line(&mut line).await.is_ok() && is_show_request(&line) {
                    tracing::info!("Second launch detected, showing timer");
                    if events.send(AppEvent::ShowWindow).is_err() {
                        break;
                    }
                }
            }
        });
    }
}

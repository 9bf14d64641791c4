//! Local network discovery shown by the menu and `info`.
//!
//! Both lookups are best effort and return `None` on any failure.

use std::net::Ipv4Addr;
use tokio::net::UdpSocket;
use tokio::process::Command;
use tracing::debug;

/// Address of the interface that routes to the internet.
///
/// Connecting a UDP socket sends nothing; it only selects a route.
pub async fn local_address() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    socket.connect("8.8.8.8:80").await.ok()?;

    match socket.local_addr().ok()?.ip() {
        std::net::IpAddr::V4(addr) if !addr.is_unspecified() => Some(addr),
        _ => None,
    }
}

/// Default gateway as reported by the platform's routing tools.
pub async fn default_gateway() -> Option<Ipv4Addr> {
    if cfg!(windows) {
        let out = command_output("ipconfig", &[]).await?;
        return parse_ipconfig(&out);
    }

    if let Some(gw) = command_output("ip", &["route"])
        .await
        .and_then(|out| parse_ip_route(&out))
    {
        return Some(gw);
    }

    command_output("route", &["-n", "get", "default"])
        .await
        .and_then(|out| parse_route_get(&out))
}

async fn command_output(program: &str, args: &[&str]) -> Option<String> {
    match Command::new(program).args(args).output().await {
        Ok(out) => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
        Err(e) => {
            debug!(program, error = %e, "gateway lookup command failed");
            None
        }
    }
}

/// Third field of the first `default` line of `ip route`.
pub fn parse_ip_route(output: &str) -> Option<Ipv4Addr> {
    output
        .lines()
        .filter(|line| line.contains("default"))
        .find_map(|line| line.split_whitespace().nth(2)?.parse().ok())
}

/// `gateway:` line of BSD `route -n get default`.
pub fn parse_route_get(output: &str) -> Option<Ipv4Addr> {
    output.lines().find_map(|line| {
        let (_, value) = line.split_once("gateway:")?;
        value.trim().parse().ok()
    })
}

/// `Default Gateway` line of Windows `ipconfig`.
pub fn parse_ipconfig(output: &str) -> Option<Ipv4Addr> {
    output
        .lines()
        .filter(|line| line.contains("Default Gateway"))
        .find_map(|line| {
            let (_, value) = line.split_once(':')?;
            value.trim().parse().ok()
        })
}

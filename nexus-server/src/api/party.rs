//! Party mode: advertise the server's LAN address
//!
//! Phones on the same network join by URL; this endpoint tells the
//! front-end what to show in the QR code.

use axum::{extract::State, Json};
use serde::Serialize;
use std::net::IpAddr;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PartyInfo {
    pub ip: String,
    pub port: u16,
    pub url: String,
}

/// GET /api/party_info
pub async fn party_info(State(state): State<AppState>) -> Json<PartyInfo> {
    let ip = local_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    Json(PartyInfo {
        url: format!("http://{}:{}", ip, state.port),
        ip,
        port: state.port,
    })
}

/// Routing-table lookup of the outbound interface address; connecting a
/// UDP socket sends no packets
fn local_ip() -> Option<IpAddr> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

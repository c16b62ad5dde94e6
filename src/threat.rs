//! Quad9 threat-intelligence probe.
//!
//! Quad9 blocks names it considers malicious by synthesizing NXDOMAIN with
//! the recursion-available flag cleared, whereas a genuine NXDOMAIN from a
//! recursive resolver carries RA=1. That two-bit pattern is the
//! discriminator: RCODE=3 together with RA=0 means "blocked".
//!
//! The probe is a single recursion-desired A question over UDP, built
//! directly from protocol primitives; only the header flags of the response
//! matter, never its answer section.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use tokio::net::UdpSocket;

use crate::config::{DEFAULT_LOOKUP_TIMEOUT, THREAT_INTEL_RESOLVER};

/// Checks a domain against Quad9 threat intelligence.
///
/// Only domains that already resolved through the regular upstreams are
/// probed; for anything else the answer is `false` without a query. Any
/// transport problem also yields `false`: absence of a block signal, not a
/// block signal.
pub async fn check_malicious_domain(
    domain: &str,
    primary_resolved: bool,
    timeout: Duration,
) -> bool {
    if !primary_resolved {
        return false;
    }
    let timeout = if timeout.is_zero() {
        DEFAULT_LOOKUP_TIMEOUT
    } else {
        timeout
    };
    probe_blocked_signal(THREAT_INTEL_RESOLVER, domain, timeout)
        .await
        .unwrap_or(false)
}

async fn probe_blocked_signal(server: &str, domain: &str, timeout: Duration) -> Result<bool> {
    let name = Name::from_str(domain)?;
    let mut query = Query::new();
    query.set_name(name);
    query.set_query_type(RecordType::A);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new();
    message.set_id(fastrand::u16(..));
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    let request = message.to_vec()?;

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.send_to(&request, server).await?;

    let mut buf = [0u8; 4096];
    let (len, _) = tokio::time::timeout(timeout, socket.recv_from(&mut buf)).await??;
    let response = Message::from_vec(&buf[..len])?;
    if response.id() != message.id() {
        return Ok(false);
    }

    Ok(response.response_code() == ResponseCode::NXDomain && !response.recursion_available())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    /// One-shot UDP responder that answers the first query with the given
    /// header flags.
    async fn spawn_responder(rcode: ResponseCode, recursion_available: bool) -> SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 4096];
            let (len, peer) = socket.recv_from(&mut buf).await.unwrap();
            let request = Message::from_vec(&buf[..len]).unwrap();

            let mut response = Message::new();
            response.set_id(request.id());
            response.set_message_type(MessageType::Response);
            response.set_op_code(OpCode::Query);
            response.set_recursion_desired(request.recursion_desired());
            response.set_recursion_available(recursion_available);
            response.set_response_code(rcode);
            for query in request.queries() {
                response.add_query(query.clone());
            }
            let bytes = response.to_vec().unwrap();
            socket.send_to(&bytes, peer).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_nxdomain_without_recursion_is_blocked() {
        let addr = spawn_responder(ResponseCode::NXDomain, false).await;
        let blocked = probe_blocked_signal(&addr.to_string(), "blocked.test", Duration::from_secs(2))
            .await
            .unwrap();
        assert!(blocked);
    }

    #[tokio::test]
    async fn test_genuine_nxdomain_is_not_blocked() {
        let addr = spawn_responder(ResponseCode::NXDomain, true).await;
        let blocked = probe_blocked_signal(&addr.to_string(), "missing.test", Duration::from_secs(2))
            .await
            .unwrap();
        assert!(!blocked);
    }

    #[tokio::test]
    async fn test_clean_answer_is_not_blocked() {
        let addr = spawn_responder(ResponseCode::NoError, true).await;
        let blocked = probe_blocked_signal(&addr.to_string(), "good.test", Duration::from_secs(2))
            .await
            .unwrap();
        assert!(!blocked);
    }

    #[tokio::test]
    async fn test_servfail_is_not_blocked() {
        let addr = spawn_responder(ResponseCode::ServFail, false).await;
        let blocked = probe_blocked_signal(&addr.to_string(), "flaky.test", Duration::from_secs(2))
            .await
            .unwrap();
        assert!(!blocked);
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        // Bind a socket that never answers.
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();

        let result =
            probe_blocked_signal(&addr.to_string(), "slow.test", Duration::from_millis(50)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unresolved_domain_is_never_probed() {
        // No server involved at all; must return immediately.
        let malicious =
            check_malicious_domain("whatever.test", false, Duration::from_millis(1)).await;
        assert!(!malicious);
    }
}

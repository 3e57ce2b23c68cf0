//! One request/response cycle, independent of the socket.

use bytes::Bytes;

use crate::error::{ErrorStatus, Result};
use crate::message::{CommunityMessage, MessageHeader};
use crate::pdu::{Pdu, PduType};
use crate::util::HexDump;

use super::Mib;

/// Turn one request datagram into at most one response datagram.
///
/// `communities` is the allowlist; when empty every community is accepted.
/// Returns `None` when nothing should be sent back:
/// - the datagram is too broken to recover a request id
/// - the community is not on the allowlist
/// - it carries a RESPONSE or TRAP, which are never answered
/// - the response could not be encoded
///
/// A datagram that fails to decode but still yields version, community and
/// request id is answered with `genErr` and the decode error as diagnostic.
pub fn handle_datagram(mib: &Mib, communities: &[Vec<u8>], data: Bytes) -> Option<Bytes> {
    tracing::trace!(target: "tiny_snmp_agent::agent", { snmp.bytes = data.len() }, "request\n{}", HexDump(&data));

    let response = match CommunityMessage::decode(data.clone()) {
        Ok(mut msg) => {
            if !community_allowed(communities, &msg.community) {
                tracing::debug!(target: "tiny_snmp_agent::agent", { snmp.request_id = msg.pdu.request_id }, "invalid community string");
                return None;
            }

            tracing::debug!(target: "tiny_snmp_agent::agent", "got {}", msg.pdu);
            if !expects_response(Some(msg.pdu.pdu_type)) {
                tracing::debug!(target: "tiny_snmp_agent::agent", { snmp.request_id = msg.pdu.request_id, snmp.pdu_type = %msg.pdu.pdu_type }, "ignoring unconfirmed pdu");
                return None;
            }
            mib.dispatch(&mut msg.pdu);
            msg.pdu.pdu_type = PduType::Response;
            msg
        }
        Err(e) => {
            let Some(header) = MessageHeader::peek(&data) else {
                tracing::debug!(target: "tiny_snmp_agent::agent", { snmp.offset = e.position(), error = %e }, "dropping undecodable request");
                return None;
            };
            if !community_allowed(communities, &header.community)
                || !expects_response(header.pdu_type)
            {
                return None;
            }

            tracing::debug!(target: "tiny_snmp_agent::agent", { snmp.request_id = header.request_id, error = %e }, "answering undecodable request with genErr");
            error_response(header, &e.to_string())
        }
    };

    match encode_response(&response) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(target: "tiny_snmp_agent::agent", { snmp.request_id = response.pdu.request_id, snmp.offset = e.position(), error = %e }, "failed to encode response");
            None
        }
    }
}

fn community_allowed(communities: &[Vec<u8>], community: &[u8]) -> bool {
    communities.is_empty() || communities.iter().any(|c| c.as_slice() == community)
}

/// RESPONSE and TRAP are unconfirmed; answering them lets two agents bounce
/// datagrams forever. Unknown command tags still get a `genErr` reply.
fn expects_response(pdu_type: Option<PduType>) -> bool {
    !matches!(pdu_type, Some(PduType::Response | PduType::Trap))
}

fn error_response(header: MessageHeader, message: &str) -> CommunityMessage {
    let mut pdu = Pdu::new(PduType::Response, header.request_id, Vec::new());
    pdu.add_error(ErrorStatus::GenErr, message);
    CommunityMessage::new(header.version, header.community, pdu)
}

fn encode_response(msg: &CommunityMessage) -> Result<Bytes> {
    let bytes = msg.encode()?;
    tracing::debug!(target: "tiny_snmp_agent::agent", "send {}", msg.pdu);
    tracing::trace!(target: "tiny_snmp_agent::agent", { snmp.bytes = bytes.len() }, "response\n{}", HexDump(&bytes));
    Ok(bytes)
}

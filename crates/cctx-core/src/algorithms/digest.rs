//! # Vote Digest
//!
//! Ballot keys for observer votes. Every field is written into a canonical
//! byte encoding (length-prefixed strings, big-endian integers, one-byte enum
//! tags) and hashed with Keccak-256, so the result never depends on local
//! state or map ordering.
//!
//! Excluded from the preimage:
//! - inbound: `creator`, `inbound_block_height`
//! - outbound: `creator`; `status` and `confirmation_mode` are normalized so
//!   success and failure observations of one event share a ballot.

use crate::domain::{ConfirmationMode, MsgVoteInbound, MsgVoteOutbound, ReceiveStatus};
use primitive_types::U256;
use sha3::{Digest, Keccak256};

const INBOUND_DOMAIN: &[u8] = b"cctx/vote-inbound/v1";
const OUTBOUND_DOMAIN: &[u8] = b"cctx/vote-outbound/v1";

/// Canonical byte encoder used as digest preimage.
#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    /// Encoder starting with a domain separator.
    pub fn with_domain(domain: &[u8]) -> Self {
        let mut encoder = Self::default();
        encoder.put_bytes(domain);
        encoder
    }

    /// Length-prefixed bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Length-prefixed UTF-8 string.
    pub fn put_str(&mut self, s: &str) -> &mut Self {
        self.put_bytes(s.as_bytes())
    }

    /// Big-endian u64.
    pub fn put_u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Big-endian i64.
    pub fn put_i64(&mut self, v: i64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// 32-byte big-endian U256.
    pub fn put_u256(&mut self, v: U256) -> &mut Self {
        let mut bytes = [0u8; 32];
        v.to_big_endian(&mut bytes);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Optional U256: presence byte, then the value.
    pub fn put_opt_u256(&mut self, v: Option<U256>) -> &mut Self {
        match v {
            Some(v) => {
                self.put_u8(1);
                self.put_u256(v)
            }
            None => self.put_u8(0),
        }
    }

    /// Single byte.
    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    /// Keccak-256 of the encoded bytes as `0x` + 64 hex characters.
    pub fn finish(&self) -> String {
        keccak_hex(&self.buf)
    }
}

/// Keccak-256 of `data` rendered as `0x` + 64 lowercase hex characters.
pub fn keccak_hex(data: &[u8]) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    format!("0x{}", hex::encode(hasher.finalize()))
}

/// Ballot key of an inbound vote.
pub fn inbound_vote_digest(vote: &MsgVoteInbound) -> String {
    let mut enc = CanonicalEncoder::with_domain(INBOUND_DOMAIN);
    enc.put_str(&vote.sender)
        .put_i64(vote.sender_chain_id)
        .put_str(&vote.tx_origin)
        .put_str(&vote.receiver)
        .put_i64(vote.receiver_chain)
        .put_opt_u256(vote.amount)
        .put_str(&vote.message)
        .put_str(&vote.inbound_hash)
        .put_u64(vote.gas_limit)
        .put_u8(vote.coin_type.tag())
        .put_str(&vote.asset)
        .put_u64(vote.event_index)
        .put_u8(vote.confirmation_mode.tag());
    enc.finish()
}

/// Ballot key of an outbound vote.
pub fn outbound_vote_digest(vote: &MsgVoteOutbound) -> String {
    let mut enc = CanonicalEncoder::with_domain(OUTBOUND_DOMAIN);
    enc.put_str(&vote.cctx_hash)
        .put_str(&vote.observed_outbound_hash)
        .put_u64(vote.observed_outbound_block_height)
        .put_u64(vote.observed_outbound_gas_used)
        .put_u256(vote.observed_outbound_effective_gas_price)
        .put_u64(vote.observed_outbound_effective_gas_limit)
        .put_u256(vote.value_received)
        .put_u8(ReceiveStatus::Created.tag())
        .put_i64(vote.outbound_chain)
        .put_u64(vote.outbound_tss_nonce)
        .put_u8(vote.coin_type.tag())
        .put_u8(ConfirmationMode::Safe.tag());
    enc.finish()
}

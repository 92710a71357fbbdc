//! E2AP (E2 Application Protocol) library
//!
//! Implements aligned PER encoding/decoding for the E2AP messages exchanged
//! between an E2 node and the RIC.
//!
//! # Modules
//!
//! - `per` - Aligned PER primitives
//! - `codec` - Constraint-checked encode/decode of whole ASN.1 values
//! - `ies` - Information element values (causes, identities, action items)
//! - `messages` - Message bodies and the protocol IE container
//! - `pdu` - The top-level E2AP-PDU
//! - `procedures` - Builders and parsers per elementary procedure

pub mod codec;
pub mod ies;
pub mod messages;
pub mod pdu;
pub mod per;
pub mod procedures;

pub use codec::{AsnType, CodecError};
pub use ies::{Cause, RanFunctionId, RicActionId, RicRequestId};
pub use pdu::{decode_e2ap_pdu, encode_e2ap_pdu, E2apPdu, OutcomeKind, ProcedureCode};

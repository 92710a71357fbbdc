//! E2AP Procedures
//!
//! Builders and parsers for the elementary procedures the simulator drives,
//! as defined in O-RAN E2AP v2 Section 8.

pub mod e2_removal;
pub mod e2_setup;
pub mod ric_control;
pub mod ric_indication;
pub mod ric_subscription;
pub mod ric_subscription_delete;

pub use e2_removal::*;
pub use e2_setup::*;
pub use ric_control::*;
pub use ric_indication::*;
pub use ric_subscription::*;
pub use ric_subscription_delete::*;

use tracing::warn;

use crate::codec::AsnType;
use crate::pdu::E2apPdu;

/// Runs the constraint check on a freshly built PDU.
///
/// Violations are logged and the PDU is returned unchanged; encoding it
/// later reports the violation again as a codec error.
pub(crate) fn checked(pdu: E2apPdu) -> E2apPdu {
    if let Err(e) = pdu.check_constraints() {
        warn!("Built {} violates its constraints: {}", pdu.message_name(), e);
    }
    pdu
}

/// Short description of a PDU for error messages
pub(crate) fn describe(pdu: &E2apPdu) -> String {
    format!("{} {}", pdu.procedure_code(), pdu.outcome())
}

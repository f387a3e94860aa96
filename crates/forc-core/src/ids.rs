//! Newtype identifiers so the compiler rejects crossing entity boundaries,
//! e.g. passing a `WaveId` where an `OrderId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(OrderId);
id_type!(PathId);
id_type!(StationId);
id_type!(ReservationId);
id_type!(AssignmentId);
id_type!(WaveId);
id_type!(WorkerId);
id_type!(WorkflowId);

/// Namespace for deterministic reservation ids so the same
/// `(orderId, step, attempt)` always derives the same id, letting retries
/// and replay reuse an idempotency key rather than minting a fresh one
/// (spec §4.4 step 4 "reservationId=deterministic(orderId, attempt)").
const RESERVATION_NAMESPACE: Uuid = Uuid::from_bytes([
    0x7c, 0x2e, 0x41, 0x90, 0x3b, 0x5a, 0x4f, 0x0d, 0x9e, 0x61, 0x2d, 0x8a, 0x4b, 0x77, 0xc3, 0x01,
]);

impl ReservationId {
    pub fn deterministic(order_id: OrderId, step: &str, attempt: u32) -> Self {
        let name = format!("{}:{}:{}", order_id.as_uuid(), step, attempt);
        Self(Uuid::new_v5(&RESERVATION_NAMESPACE, name.as_bytes()))
    }
}

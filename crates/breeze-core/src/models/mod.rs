//! Data models for Breeze API payloads.
//!
//! - `Envelope`: the `{Status, Success, Error}` wrapper around every response
//! - `Funds`: account balance and allocation
//! - `Holding`: a demat holding
//! - `Order`, `OrderStatus`: order book entries
//!
//! Fields the models do not name, or cannot read as the expected type, are
//! kept in an `extra` map.

mod de;
pub mod envelope;
pub mod funds;
pub mod holding;
pub mod order;

pub use envelope::{Envelope, ENVELOPE_OK};
pub use funds::Funds;
pub use holding::Holding;
pub use order::{Order, OrderStatus};

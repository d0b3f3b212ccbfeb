//! Generic value model exchanged with the document store
//!
//! Every document crossing the store boundary is a `ValueMap`: an ordered map
//! of field names to tagged `Value` cells. The mapping engine coerces these
//! cells into typed slots on decode and reads them back out on encode.
//!
//! # Tags
//!
//! - `Null`, `String`, `Integer`, `Float`, `Boolean`
//! - `Timestamp`: store-native seconds + nanos
//! - `Reference`: path of another document
//! - `List`, `Map`: nested containers

mod errors;
mod json;
mod reference;
mod timestamp;
mod types;

pub use errors::{ValueError, ValueResult};
pub use reference::DocumentRef;
pub use timestamp::Timestamp;
pub use types::{Value, ValueMap, ValueTag};

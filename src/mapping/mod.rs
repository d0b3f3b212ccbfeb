//! Mapping engine
//!
//! Decode turns a raw field map into a typed [`Record`]: each declared field
//! is looked up, checked against its nullability and coerced into its slot
//! through the [`coerce`] table. Failures become incidents, never panics,
//! and the loop always runs to the end before incidents are reported.
//!
//! Encode reads every declared field of the runtime type, nulls included,
//! through the encoder compiled at registration.

mod coerce;
mod context;
mod errors;
mod record;

pub use coerce::{coerce, to_integer, CoercionFailure};
pub use context::MappingContext;
pub use errors::{MappingError, MappingResult};
pub use record::Record;

//! Decode incidents and the reporting policy
//!
//! An incident is a data-shape defect found while decoding one document: a
//! required field that is absent or null, or a present value that cannot be
//! coerced into its slot. Decode collects every incident of a document first
//! and only then hands them, in discovery order, to the [`IncidentReporter`].
//!
//! The reporter applies the global [`MappingBehavior`]:
//!
//! - `Strict`: the first reported incident aborts the operation
//! - `Lenient`: incidents are logged and fanned out to subscribers

mod behavior;
mod reporter;
mod types;

pub use behavior::MappingBehavior;
pub use reporter::{IncidentReceiver, IncidentReporter};
pub use types::{Incident, IncidentKind};

//! Core type definitions using newtype patterns for type safety.
//!
//! These types make invalid ports and targets unrepresentable once a run
//! has been configured.

mod port;
mod run_id;
mod target;

pub use port::{Port, PortError, PortRange};
pub use run_id::{RunId, RunIdError};
pub use target::{
    is_dotted_quad, normalize_base_url, normalize_domain, preferred_address, ScanTarget,
    TargetSpec,
};

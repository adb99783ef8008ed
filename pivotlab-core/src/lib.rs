//! pivotlab Core - Numeric primitives, configuration, errors and protocols
//!
//! This crate provides the foundational pieces shared by the pivotlab engines:
//! - Epsilon-tolerant comparisons, fractional parts and number formatting
//! - [`SolverConfig`] with the tunable constants of every engine
//! - The [`PivotError`] taxonomy returned by all fallible operations
//! - The append-only derivation [`Protocol`] recorded while computing
//!
//! # Examples
//!
//! ## Recording a protocol
//!
//! ```
//! use pivotlab_core::protocol::{Protocol, ProtocolSink};
//!
//! let mut protocol = Protocol::new();
//! protocol.heading(2, "Matrix rank");
//! protocol.paragraph("Column 1: pivot 3.00 in row 2.");
//!
//! assert_eq!(protocol.len(), 2);
//! let text = protocol.render_text(2);
//! assert!(text.contains("Matrix rank"));
//! ```
//!
//! ## Fractional parts
//!
//! ```
//! use pivotlab_core::numeric::{fractional_part, EPSILON};
//!
//! assert!((fractional_part(4.25, EPSILON) - 0.25).abs() < 1e-12);
//! assert!((fractional_part(-0.25, EPSILON) - 0.75).abs() < 1e-12);
//! assert_eq!(fractional_part(3.0000000000001, EPSILON), 0.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod numeric;
pub mod protocol;

pub use config::{FeasibilityRule, InitialBasis, SolverConfig};
pub use error::{PivotError, Result, Stage};
pub use numeric::{
    EPSILON, approx_eq, format_number, fractional_part, is_integral, is_zero, snap_to_zero,
};
pub use protocol::{NullProtocol, Protocol, ProtocolEntry, ProtocolSink, TableSnapshot};

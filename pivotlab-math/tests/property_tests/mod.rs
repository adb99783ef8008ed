//! Property-based tests for pivotlab-math
//!
//! This module contains property tests for:
//! - Inverse round trips
//! - Rank bounds

mod gauss_jordan_properties;

//! Property-based tests for pivotlab-lp
//!
//! This module contains property tests for:
//! - The MJE pivot
//! - Phase I and phase II invariants
//! - Gomory cuts against brute-force enumeration
//! - Agreement of the two initial bases and strong duality

mod simplex_properties;

//! pivotlab Math - Dense matrices and Gauss-Jordan elimination
//!
//! This crate provides the direct linear-algebra engine of pivotlab:
//! - Row-major [`Matrix`] helpers (identity, products, transpose, validation)
//! - [`GaussJordan`] inverse, rank and linear solve with partial pivoting,
//!   each recording a step-by-step protocol
//!
//! All routines are generic over [`num_traits::Float`].
//!
//! # Examples
//!
//! ```
//! use pivotlab_core::Protocol;
//! use pivotlab_math::GaussJordan;
//!
//! let a: Vec<Vec<f64>> = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
//! let mut protocol = Protocol::new();
//! let x = GaussJordan::new().solve(&a, &[3.0, 5.0], &mut protocol).unwrap();
//!
//! assert!((x[0] - 0.8).abs() < 1e-9);
//! assert!((x[1] - 1.4).abs() < 1e-9);
//! assert!(protocol.tables().count() >= 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod gauss_jordan;
pub mod matrix;

pub use gauss_jordan::GaussJordan;
pub use matrix::{Matrix, identity, mat_vec, multiply, transpose};

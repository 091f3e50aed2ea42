//! Test harness for scripted studio sessions.
//!
//! Drives the real `studio_bridge::dispatch` path the way the page would,
//! playing the host's part (texture loads, scene loads) deterministically.
//!
//! # Key Components
//!
//! - [`StudioBuilder`]: fluent API for building and checking a session
//! - [`report`]: plain-text session descriptions
//! - [`helpers`]: fixtures, mesh sets and the harness error type
//! - [`assertions`]: material assertions with diagnostics

pub mod assertions;
pub mod helpers;
pub mod report;
pub mod workflow;

pub use helpers::HarnessError;
pub use report::StudioReport;
pub use workflow::StudioBuilder;

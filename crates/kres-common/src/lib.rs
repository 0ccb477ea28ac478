//! Common types and utilities for the kres resolution core.
//!
//! This crate provides foundational types used across all kres crates:
//! - Names and declaration identifiers (`Name`, `FqName`, `ClassId`, `CallableId`)
//! - Source spans (`Span`)
//! - Language version settings and feature flags
//! - Centralized limits

// Names and declaration identifiers
pub mod name;
pub use name::{CallableId, ClassId, FqName, Name};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Language features and analysis flags
pub mod language;
pub use language::{AnalysisFlags, LanguageFeature, LanguageFeatures, LanguageVersionSettings};

// Centralized limits and thresholds
pub mod limits;

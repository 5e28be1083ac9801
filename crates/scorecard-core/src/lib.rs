//! scorecard-core — CSV ingestion, normalization and analytics for class
//! gradebooks.
//!
//! Uploads go through tokenizing, header resolution, field mapping,
//! validation and normalization (see [`ingest`]); accepted records live in a
//! [`state::Dashboard`] and are summarized by [`statistics`] and
//! [`aggregate`].

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingest;
pub mod layout;
pub mod mapper;
pub mod model;
pub mod normalizer;
pub mod report;
pub mod state;
pub mod statistics;
pub mod tokenizer;
pub mod traits;
pub mod validator;

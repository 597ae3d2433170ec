//! Medivault Database Library
//!
//! Repository layer over Postgres. Every image and analysis query is scoped
//! by owner id; a record owned by another user is indistinguishable from a
//! missing one.

pub mod db;

pub use db::{AnalysisRepository, ImageRepository, StartAnalysisError, UserRepository};

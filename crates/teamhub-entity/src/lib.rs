//! # teamhub-entity
//!
//! Domain entity models for TeamHub file storage. Every struct in this
//! crate is either a persisted document or a value object handed to the
//! storage engine. All persisted entities derive `Debug`, `Clone`,
//! `Serialize`, and `Deserialize`.

pub mod file;

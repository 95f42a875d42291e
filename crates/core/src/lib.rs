//! Core types and shared functionality for the wayback proxy.
//!
//! This crate provides:
//! - In-memory cache tiers (images, documents, known failures)
//! - Domain mapping model and its JSON file store
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod mapping;

pub use cache::{CacheTiers, FailureCache, MemoryTier, RenderedDocument, document_key};
pub use config::{AppConfig, ConfigError, NotifierKind};
pub use error::Error;
pub use mapping::{DomainMapping, MappingEntry, MappingStore, MappingTable};

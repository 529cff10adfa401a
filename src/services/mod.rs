// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod catalog_service;
pub mod record_resolver;
pub mod title_locks;


pub use catalog_service::CatalogService;
pub use record_resolver::{reconcile, CodePair, RecordResolver, Resolution};
pub use title_locks::{TitleGuard, TitleKey, TitleLocks};

//! Lost & Found - institutional lost-and-found reporting
//!
//! Core library of a campus lost-and-found app: members of one institution
//! sign in with their institutional account, post lost or found items with
//! photos and contact details, and browse or search what others reported.
//!
//! # Features
//!
//! - Remote repository over a schema-less document database, auth and blob storage
//! - Embedded SQLite store with live queries
//! - Observable view-state holders with task scopes
//! - Headless screens binding view state to renderable structs
//! - Sign-in restricted to one institutional email domain

/// Backend service seams and in-memory implementations
pub mod backend;
/// Configuration management
pub mod config;
/// Embedded store and live queries
pub mod db;
/// Error types
pub mod error;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Remote repository
pub mod repository;
/// Embedded store schema definitions
pub mod schema;
/// Screens
pub mod screens;
/// Observables and task scopes
pub mod state;
/// Input validation and sanitization
pub mod validation;
/// View-state holders
pub mod viewmodel;

// Re-export key components for easier access
pub use config::{AppConfig, EnvironmentConfig};
pub use db::{LiveQuery, LocalFilter, LocalStore};
pub use error::{LostFoundError, Result};
pub use models::{Category, Item, ItemQuery, ItemStatus, ItemType, LocalItem, NewLocalItem, User};
pub use repository::{ItemRepository, RemoteRepository};
pub use viewmodel::{AuthState, AuthViewModel, ItemViewModel};

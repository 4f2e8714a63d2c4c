//! # incubator-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **JSON control surface**: latest reading (`/api/data`),
//!   controller status (`/api/status`), mode switching (`/api/mode`),
//!   profile selection (`/api/profile`) and manual actuators
//!   (`/api/actuators`)
//! - Map HTTP requests into `IncubatorService` calls (driving adapter)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `incubator-app` (for port traits and services) and
//! `incubator-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

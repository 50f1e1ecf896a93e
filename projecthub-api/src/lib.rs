//! # ProjectHub API Server Library
//!
//! HTTP surface of ProjectHub: configuration, error mapping, middleware and
//! route handlers. Domain rules live in `projecthub_shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body and path extractors with JSON rejections
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

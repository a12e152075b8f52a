//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, authorizer and exporter calls into use-case APIs.
//! - Keep CLI layers decoupled from storage details.

pub mod phonebook_service;

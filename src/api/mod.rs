//! HTTP dispatch module for the FICS gateway.
//!
//! This module provides the `GatewayClient` for sending one JSON request to
//! the vendor and classifying the outcome, plus the closed `HttpMethod` verb
//! set and the `ApiCallSuccessful` envelope gate.
//!
//! Authentication is carried inside the JSON body as a `Token` field, not as
//! an HTTP header; that is the vendor's contract and callers supply it.

pub mod client;

pub use client::{require_successful, GatewayClient, HttpMethod};

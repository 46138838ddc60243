//! # SOAP invocation
//!
//! - [`build_soap_request`] : SOAP 1.1 envelope for one UPnP action call
//! - [`SoapRequest`] / [`invoke`] : POST to a service control URL
//! - [`SoapResponse`] : status and raw body, left to the caller to interpret

mod builder;
mod client;

pub use builder::build_soap_request;
pub use client::{SoapRequest, SoapResponse, invoke};

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.1 encoding style.
pub const SOAP_ENCODING_NS: &str = "http://schemas.xmlsoap.org/soap/encoding/";

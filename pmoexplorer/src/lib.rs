//! # pmoexplorer - UPnP control point explorer
//!
//! Blocking, single-threaded building blocks to discover UPnP devices, read
//! their descriptions and invoke their actions:
//!
//! - [`ssdp`] and [`discovery`]: one-shot `M-SEARCH` and the resulting [`ServerRegistry`]
//! - [`description`]: root and service descriptions, absolute control/SCPD URLs
//! - [`xml`]: parsed documents and the [`Query`](xml::Query) matcher every lookup uses
//! - [`actions`] and [`inference`]: argument resolution and default values
//! - [`soap`]: envelope construction and the HTTP POST
//! - [`explorer`]: the [`UpnpExplorer`] facade chaining all of the above

pub mod actions;
pub mod config;
pub mod description;
pub mod discovery;
pub mod errors;
pub mod explorer;
pub mod inference;
pub mod soap;
pub mod ssdp;
pub mod transport;
pub mod xml;

pub use actions::{
    ActionContext, ActionSignature, ArgumentDescriptor, Direction, StateVariableDescriptor,
};
pub use config::ExplorerConfig;
pub use description::{DeviceDescription, ServiceDescriptor};
pub use discovery::{ServerRecord, ServerRegistry, discover};
pub use errors::{ExplorerError, LookupKind, Result};
pub use explorer::{ServiceDescription, UpnpExplorer};
pub use inference::{ArgValue, infer_default};
pub use soap::{SoapRequest, SoapResponse};
pub use transport::{HttpTransport, UreqTransport};

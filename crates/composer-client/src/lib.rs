//! Composer Client - transport for the automation backend
//!
//! [`BackendClient`] posts each workflow step to its webhook and implements
//! [`composer_core::AutomationBackend`]. [`ProgressSocket`] streams progress
//! frames from the backend into a [`composer_core::ProgressChannel`].

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod endpoint;
pub mod socket;

pub use client::BackendClient;
pub use config::ClientConfig;
pub use endpoint::Endpoint;
pub use socket::ProgressSocket;

//! Client for the Relatics SOAP web services
//!
//! ```rust,no_run
//! use relatics_api::api::{EndpointIdentity, RelaticsClient, read_data, HttpTransport};
//! use relatics_api::auth::Credentials;
//! use relatics_api::config::TransportSettings;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = TransportSettings::default();
//! let transport = HttpTransport::new(&settings)?;
//! let response = read_data(&transport, "acme", "W1", "GetItems", "E1").await?;
//! println!("{}", response.text());
//!
//! let client = RelaticsClient::connect_http(
//!     EndpointIdentity::new("acme", "env-id", "workspace-id"),
//!     Credentials::from_env()?,
//!     &settings,
//! )
//! .await?;
//! let invocation = client.call("GetInstances", "type-id").await?;
//! println!("{}", invocation.response.text());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod testing;

pub use error::{RelaticsError, Result};

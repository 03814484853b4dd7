//! Channel connectors for the Stock Sync Gateway.
//!
//! One [`stock_sync_engine::traits::ChannelClient`] implementation per marketplace family:
//!
//! * [`AllegroApi`] — the Allegro marketplace. The gateway runs three Allegro accounts (main, outlet, brand) as
//!   three channel instances sharing one developer application.
//! * [`ErliApi`] — the Erli marketplace.
//! * [`EmpikApi`] — the Empik marketplace. Empik forbids automated stock changes for live offers, so every
//!   positive-quantity push reports a policy restriction and the operator is alerted instead; offer withdrawal
//!   (stock reached zero) is allowed.
//! * [`StorefrontApi`] — the merchant's own storefront, authenticated with a static API key.
//!
//! Clients are stateless with respect to tokens: every call takes the access token from the engine's credential
//! store, and the refresh exchange is just another channel call.
mod allegro;
mod config;
mod data_objects;
mod empik;
mod erli;
mod error;
mod helpers;
mod registry;
mod storefront;

pub use allegro::AllegroApi;
pub use config::{AllegroConfig, EmpikConfig, ErliConfig, StorefrontConfig};
pub use empik::EmpikApi;
pub use erli::ErliApi;
pub use error::ConnectorError;
pub use registry::standard_registry_from_env;
pub use storefront::StorefrontApi;

/// The channel ids of the standard six-channel deployment.
pub const ALLEGRO_MAIN: &str = "allegro-main";
pub const ALLEGRO_OUTLET: &str = "allegro-outlet";
pub const ALLEGRO_BRAND: &str = "allegro-brand";
pub const ERLI: &str = "erli";
pub const EMPIK: &str = "empik";
pub const STOREFRONT: &str = "storefront";

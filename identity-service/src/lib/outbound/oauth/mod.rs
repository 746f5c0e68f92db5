pub mod broker;
pub mod endpoints;

pub use broker::OAuthBroker;
pub use endpoints::ProviderEndpoints;
pub use endpoints::ProviderRegistry;

// Infrastructure layer - External dependencies and adapters
pub mod anthropic_client;
pub mod config;
pub mod eia_client;
pub mod fred_client;
pub mod http;
pub mod weather_client;

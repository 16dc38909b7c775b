use crate::figure::FigSize;
use serde::Deserialize;
use std::net::IpAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
	pub telemetry: TelemetryConfig,
	pub server: ServerConfig,
	pub figure: FigureConfig,
}

impl AppConfig {
	/// Loads the embedded defaults, an optional `config.toml` and `PLOT_RST_*` environment
	/// variables, in increasing order of precedence.
	pub fn new() -> Result<Self, config::ConfigError> {
		Self::builder()
			.add_source(config::File::with_name("config.toml").required(false))
			.add_source(
				config::Environment::with_prefix("PLOT_RST")
					.prefix_separator("_")
					.separator("__"),
			)
			.build()?
			.try_deserialize()
	}

	fn builder() -> config::ConfigBuilder<config::builder::DefaultState> {
		config::Config::builder().add_source(config::File::from_str(
			include_str!("defaults.toml"),
			config::FileFormat::Toml,
		))
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
	// Configurable logging level. Also configurable via env vars RUST_LOG and PLOT_RST_TELEMETRY__LEVEL
	pub level: String,
	/// Sentry DSN. Error tracking is disabled when unset.
	pub sentry: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
	pub http: HttpServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
	// The interface the server will be listening on
	pub interface: IpAddr,
	// The port for the server
	pub port: u16,
	/// Seconds before a request is aborted.
	pub request_timeout: u64,
	pub graceful_shutdown: bool,
}

/// Application wide settings of the figure plugin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FigureConfig {
	/// Name of the handler argument that receives the figure.
	pub keyword: String,
	pub figsize: Option<FigSize>,
	pub dpi: f64,
}

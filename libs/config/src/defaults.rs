//! Default values shared by the config loader and the server binary

/// HTTP callback server defaults
pub mod server {
    /// Bind address for the callback server
    pub const BIND_ADDRESS: &str = "127.0.0.1";

    /// Port the sidecar calls back on
    pub const PORT: u16 = 8080;

    /// Log filter when neither RUST_LOG nor the config sets one
    pub const LOG_LEVEL: &str = "info";
}

/// Actor runtime defaults
pub mod actors {
    /// Serializer for actor method payloads
    pub const SERIALIZER: &str = "json";
}

/// Prefix for environment overrides, e.g. `APPHOST_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "APPHOST";

/// Separator between nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

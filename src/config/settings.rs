use serde::Deserialize;

/// Top-level configuration for the client and the `pusu` binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

/// Where to connect and how long to wait for acknowledgments.
#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
    /// Sent by `authorize` in the command line tools.
    pub authorization: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub client: Option<PartialClientSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialClientSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_ms: Option<u64>,
    pub authorization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client: ClientSettings {
                host: "127.0.0.1".to_string(),
                port: 55000,
                timeout_ms: 5000,
                authorization: "foo".to_string(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Overlays the values that were present onto `defaults`.
    pub fn merge(self, defaults: Settings) -> Settings {
        let client = self.client;
        let logging = self.logging;
        let Settings {
            client: default_client,
            logging: default_logging,
        } = defaults;

        Settings {
            client: ClientSettings {
                host: client
                    .as_ref()
                    .and_then(|c| c.host.clone())
                    .unwrap_or(default_client.host),
                port: client
                    .as_ref()
                    .and_then(|c| c.port)
                    .unwrap_or(default_client.port),
                timeout_ms: client
                    .as_ref()
                    .and_then(|c| c.timeout_ms)
                    .unwrap_or(default_client.timeout_ms),
                authorization: client
                    .as_ref()
                    .and_then(|c| c.authorization.clone())
                    .unwrap_or(default_client.authorization),
            },
            logging: LoggingSettings {
                level: logging
                    .and_then(|l| l.level)
                    .unwrap_or(default_logging.level),
            },
        }
    }
}

use serde::Deserialize;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-probe timeout applied when `udpTimeoutMs` is not configured.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Offset between an institution's UDP port and its default HTTP port.
const HTTP_PORT_OFFSET: u16 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("property 'libraries' is empty")]
    NoLibraries,

    #[error("library '{0}' is listed more than once")]
    DuplicateLibrary(String),

    #[error("library '{0}' has no configuration section")]
    MissingLibrary(String),

    #[error("udp port {port} is used by both '{first}' and '{second}'")]
    DuplicatePort {
        port: u16,
        first: String,
        second: String,
    },

    #[error("udp message delimiter must not be empty")]
    EmptyDelimiter,

    #[error("invalid initial host '{0}'")]
    InvalidHost(String),

    #[error("unknown institution '{0}'")]
    UnknownInstitution(String),
}

/// Settings scoped to one institution (`<inst>.udpPort`, `<inst>.studentsFile`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionSettings {
    pub udp_port: u16,
    pub students_file: PathBuf,
    pub books_file: PathBuf,
    #[serde(default)]
    pub http_port: Option<u16>,
}

impl InstitutionSettings {
    pub fn new(udp_port: u16, students_file: impl Into<PathBuf>, books_file: impl Into<PathBuf>) -> Self {
        Self {
            udp_port,
            students_file: students_file.into(),
            books_file: books_file.into(),
            http_port: None,
        }
    }

    /// Port of the client gateway. Defaults to the UDP port shifted by 1000.
    pub fn http_port(&self) -> u16 {
        self.http_port
            .unwrap_or_else(|| self.udp_port.saturating_add(HTTP_PORT_OFFSET))
    }
}

/// On-disk shape of the configuration file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    libraries: String,
    udp_msg_split: String,
    udp_initial_host: String,
    #[serde(default)]
    udp_timeout_ms: Option<u64>,
    #[serde(flatten)]
    sections: HashMap<String, InstitutionSettings>,
}

/// Validated, immutable configuration of the whole federation.
#[derive(Debug, Clone)]
pub struct FederationConfig {
    libraries: Vec<String>,
    delimiter: String,
    initial_host: IpAddr,
    probe_timeout: Duration,
    institutions: HashMap<String, InstitutionSettings>,
}

impl FederationConfig {
    /// Builds a configuration from already-parsed parts and validates it.
    pub fn new(
        libraries: Vec<String>,
        delimiter: impl Into<String>,
        initial_host: &str,
        probe_timeout: Duration,
        institutions: HashMap<String, InstitutionSettings>,
    ) -> Result<Self, ConfigError> {
        let delimiter = delimiter.into();
        if delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }

        let initial_host = resolve_host(initial_host)?;

        if libraries.is_empty() {
            return Err(ConfigError::NoLibraries);
        }

        let mut ports: HashMap<u16, &str> = HashMap::new();
        for (idx, name) in libraries.iter().enumerate() {
            if libraries[..idx].contains(name) {
                return Err(ConfigError::DuplicateLibrary(name.clone()));
            }

            let settings = institutions
                .get(name)
                .ok_or_else(|| ConfigError::MissingLibrary(name.clone()))?;

            if let Some(first) = ports.insert(settings.udp_port, name) {
                return Err(ConfigError::DuplicatePort {
                    port: settings.udp_port,
                    first: first.to_string(),
                    second: name.clone(),
                });
            }
        }

        Ok(Self {
            libraries,
            delimiter,
            initial_host,
            probe_timeout,
            institutions,
        })
    }

    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents)?;

        let libraries = raw
            .libraries
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        let probe_timeout = raw
            .udp_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT);

        Self::new(
            libraries,
            raw.udp_msg_split,
            &raw.udp_initial_host,
            probe_timeout,
            raw.sections,
        )
    }

    /// Institution names in configuration order.
    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn initial_host(&self) -> IpAddr {
        self.initial_host
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn institution(&self, name: &str) -> Result<&InstitutionSettings, ConfigError> {
        self.institutions
            .get(name)
            .filter(|_| self.libraries.iter().any(|lib| lib == name))
            .ok_or_else(|| ConfigError::UnknownInstitution(name.to_string()))
    }

    /// UDP endpoint of an institution: every peer lives on the initial host.
    pub fn udp_endpoint(&self, name: &str) -> Result<SocketAddr, ConfigError> {
        let settings = self.institution(name)?;
        Ok(SocketAddr::new(self.initial_host, settings.udp_port))
    }

    pub fn http_endpoint(&self, name: &str) -> Result<SocketAddr, ConfigError> {
        let settings = self.institution(name)?;
        Ok(SocketAddr::new(self.initial_host, settings.http_port()))
    }
}

/// Accepts an IP literal or a host name, preferring an IPv4 address when the name has several.
fn resolve_host(host: &str) -> Result<IpAddr, ConfigError> {
    let host = host.trim();
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let invalid = || ConfigError::InvalidHost(host.to_string());
    let addrs: Vec<SocketAddr> = (host, 0)
        .to_socket_addrs()
        .map_err(|_| invalid())?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .map(|addr| addr.ip())
        .ok_or_else(invalid)
}

use super::types::Peer;
use crate::config::types::{ConfigError, FederationConfig};

pub struct PeerDirectory {
    local: String,
    peers: Vec<Peer>,
}

impl PeerDirectory {
    /// Builds the directory for `local` from the whole configured institution list.
    pub fn from_config(config: &FederationConfig, local: &str) -> Result<Self, ConfigError> {
        config.institution(local)?;

        let peers = config
            .libraries()
            .iter()
            .map(|name| {
                Ok(Peer {
                    institution: name.clone(),
                    endpoint: config.udp_endpoint(name)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            local: local.to_string(),
            peers,
        })
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Every institution, self included, in configuration order.
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Every institution except self, in configuration order.
    pub fn others(&self) -> impl Iterator<Item = &Peer> {
        self.peers
            .iter()
            .filter(move |peer| peer.institution != self.local)
    }

    pub fn local(&self) -> Option<&Peer> {
        self.get(&self.local)
    }

    pub fn get(&self, institution: &str) -> Option<&Peer> {
        self.peers
            .iter()
            .find(|peer| peer.institution == institution)
    }

    pub fn is_local(&self, institution: &str) -> bool {
        self.local == institution
    }
}

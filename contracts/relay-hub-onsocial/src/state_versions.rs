use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use near_sdk::AccountId;
use semver::Version;

use crate::{HubConfig, HubError, Relay, RelayHub};

#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub(crate) struct VersionedHubState {
    pub version: String,
    pub config: HubConfig,
    pub relays: BTreeMap<AccountId, Relay>,
    pub balances: BTreeMap<AccountId, u128>,
}

impl VersionedHubState {
    pub fn latest_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Older states are retagged; newer ones cannot be read by this build.
    fn migrate(&mut self) -> Result<(), HubError> {
        let stored = parse_version(&self.version)?;
        let latest = parse_version(&Self::latest_version())?;
        if stored > latest {
            return Err(HubError::InvalidStateBytes(format!(
                "state version {stored} is newer than {latest}"
            )));
        }
        self.version = latest.to_string();
        Ok(())
    }
}

fn parse_version(version: &str) -> Result<Version, HubError> {
    Version::parse(version).map_err(|e| HubError::InvalidStateBytes(format!("{version}: {e}")))
}

impl RelayHub {
    /// Serialize relays, balances and config. The event log is not persisted.
    pub fn to_state_bytes(&self) -> Result<Vec<u8>, HubError> {
        let state = VersionedHubState {
            version: self.version.clone(),
            config: self.config.clone(),
            relays: self.relays.clone(),
            balances: self.balances.clone(),
        };
        borsh::to_vec(&state).map_err(|e| HubError::InvalidStateBytes(e.to_string()))
    }

    pub fn from_state_bytes(bytes: &[u8]) -> Result<Self, HubError> {
        if bytes.is_empty() {
            return Err(HubError::InvalidStateBytes("state bytes are empty".into()));
        }
        let mut state = borsh::from_slice::<VersionedHubState>(bytes)
            .map_err(|e| HubError::InvalidStateBytes(e.to_string()))?;
        state.migrate()?;
        state.config.validate()?;

        let mut hub = RelayHub::from_parts(state.config, state.relays, state.balances);
        hub.version = state.version;
        Ok(hub)
    }
}

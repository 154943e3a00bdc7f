//! Read-only aggregation of service, config, and network state.
//!
//! Each part is queried on its own; a failing part is recorded as
//! `Probe::Unavailable` and the rest of the snapshot is still returned.

use crate::core::credentials::CredentialManager;
use crate::core::service::Supervisor;
use crate::error::Result;
use crate::models::status::{DashboardSnapshot, NetworkSnapshot, Probe};

/// Host network inspection, consumed by the dashboard.
pub trait NetworkInspector {
    fn inspect(&self) -> Result<NetworkSnapshot>;
}

pub struct StatusAggregator<'a, S, N> {
    manager: &'a CredentialManager<S>,
    network: N,
}

impl<'a, S: Supervisor, N: NetworkInspector> StatusAggregator<'a, S, N> {
    pub fn new(manager: &'a CredentialManager<S>, network: N) -> Self {
        Self { manager, network }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let service = Probe::from_result(self.manager.service().status());
        let store = self.manager.store();
        let doc = store.load();
        let listen_address = doc.as_ref().ok().and_then(|d| d.listen_address());
        let config = Probe::from_result(match &doc {
            Ok(d) => store.metadata_of(d).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        });
        let credential_count = Probe::from_result(doc.map(|d| d.credentials().len()));
        let network = Probe::from_result(self.network.inspect());

        warn_if_unavailable("service", &service);
        warn_if_unavailable("credentials", &credential_count);
        warn_if_unavailable("config", &config);
        warn_if_unavailable("network", &network);

        DashboardSnapshot {
            service,
            credential_count,
            config,
            listen_address,
            network,
        }
    }
}

fn warn_if_unavailable<T>(part: &str, probe: &Probe<T>) {
    if let Probe::Unavailable(reason) = probe {
        tracing::warn!(part, reason = %reason, "dashboard part unavailable");
    }
}

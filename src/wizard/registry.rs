//! Wizard registry: in-memory map of live wizard sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::DiscoveryCatalog;
use crate::gateway::ProposalGateway;

use super::controller::WizardController;

/// Owns every session. Sessions share the gateway and catalog but nothing
/// else.
pub struct WizardRegistry {
    wizards: RwLock<HashMap<Uuid, Arc<WizardController>>>,
    gateway: Arc<dyn ProposalGateway>,
    catalog: Arc<DiscoveryCatalog>,
    generation_timeout: Duration,
}

impl WizardRegistry {
    pub fn new(
        gateway: Arc<dyn ProposalGateway>,
        catalog: Arc<DiscoveryCatalog>,
        generation_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            wizards: RwLock::new(HashMap::new()),
            gateway,
            catalog,
            generation_timeout,
        })
    }

    pub fn catalog(&self) -> &DiscoveryCatalog {
        &self.catalog
    }

    /// Start a new session at the first step.
    pub async fn create(&self) -> Arc<WizardController> {
        let wizard = Arc::new(WizardController::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.catalog),
            self.generation_timeout,
        ));
        let mut wizards = self.wizards.write().await;
        wizards.insert(wizard.id(), Arc::clone(&wizard));
        info!(wizard_id = %wizard.id(), live = wizards.len(), "Wizard created");
        wizard
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<WizardController>> {
        self.wizards.read().await.get(&id).cloned()
    }

    /// Drop a session. Any request it still has in flight finishes against
    /// the detached state and is never observed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.wizards.write().await.remove(&id).is_some();
        if removed {
            info!(wizard_id = %id, "Wizard removed");
        }
        removed
    }

    /// Drop every session idle for at least `ttl`. Returns how many went.
    pub async fn expire_idle(&self, ttl: Duration) -> usize {
        let mut idle = Vec::new();
        for (id, wizard) in self.wizards.read().await.iter() {
            if wizard.idle_for().await >= ttl {
                idle.push(*id);
            }
        }
        if idle.is_empty() {
            return 0;
        }

        let mut wizards = self.wizards.write().await;
        let mut expired = 0;
        for id in idle {
            // Re-check: the session may have been used since the scan.
            let still_idle = match wizards.get(&id) {
                Some(wizard) => wizard.idle_for().await >= ttl,
                None => false,
            };
            if still_idle {
                wizards.remove(&id);
                expired += 1;
                debug!(wizard_id = %id, "Wizard expired");
            }
        }
        if expired > 0 {
            info!(expired, live = wizards.len(), "Expired idle wizards");
        }
        expired
    }

    /// Periodically drop sessions idle for longer than `ttl`.
    pub fn spawn_sweeper(self: &Arc<Self>, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            info!(ttl_secs = ttl.as_secs(), "Wizard expiry sweep started");
            let mut tick = tokio::time::interval(every);
            tick.tick().await;
            loop {
                tick.tick().await;
                registry.expire_idle(ttl).await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.wizards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

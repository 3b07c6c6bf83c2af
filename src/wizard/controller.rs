//! WizardController: coordinates one session's state, collector validation,
//! and the generation gateway.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::DiscoveryCatalog;
use crate::collectors::{CollectorInput, InputMode};
use crate::config::BrandConfig;
use crate::error::{ExportError, GatewayError, Result, WizardError};
use crate::gateway::ProposalGateway;
use crate::profile::{PartialProfile, Proposal};
use crate::render::{ExportedDocument, export_file_name, render_proposal, render_proposal_pdf};

use super::state::{PendingRequest, Resolution, WizardState};

/// Point-in-time view of a wizard session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Request id whose result may still commit, while generating.
    pub active_request: Option<u64>,
    #[serde(flatten)]
    pub state: WizardState,
}

/// Handle to a dispatched generation request.
#[derive(Debug)]
pub struct RequestTicket {
    pub request_id: u64,
    /// Resolves once the outcome has been committed or discarded.
    pub handle: JoinHandle<Resolution>,
}

/// A finished proposal prepared for on-screen viewing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    pub proposal: Proposal,
    pub markdown: String,
    pub file_name: String,
}

/// One wizard session.
pub struct WizardController {
    id: Uuid,
    created_at: DateTime<Utc>,
    state: Arc<RwLock<WizardState>>,
    /// Bumped by every user-driven call; read by the idle sweep.
    last_activity: RwLock<DateTime<Utc>>,
    gateway: Arc<dyn ProposalGateway>,
    catalog: Arc<DiscoveryCatalog>,
    generation_timeout: Duration,
}

impl WizardController {
    pub fn new(
        gateway: Arc<dyn ProposalGateway>,
        catalog: Arc<DiscoveryCatalog>,
        generation_timeout: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            state: Arc::new(RwLock::new(WizardState::default())),
            last_activity: RwLock::new(now),
            gateway,
            catalog,
            generation_timeout,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.read().await
    }

    /// How long since the session was last used.
    pub async fn idle_for(&self) -> Duration {
        (Utc::now() - self.last_activity().await)
            .to_std()
            .unwrap_or_default()
    }

    async fn touch(&self) {
        *self.last_activity.write().await = Utc::now();
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        self.touch().await;
        let state = self.state.read().await;
        self.snapshot_of(&state)
    }

    fn snapshot_of(&self, state: &WizardState) -> WizardSnapshot {
        WizardSnapshot {
            id: self.id,
            created_at: self.created_at,
            active_request: state.active_request(),
            state: state.clone(),
        }
    }

    /// Validate the pair against the catalog and advance to mode selection.
    pub async fn select_industry(&self, industry: &str, sub_industry: &str) -> Result<WizardSnapshot> {
        self.touch().await;
        let selection = self.catalog.select(industry, sub_industry)?;
        let mut state = self.state.write().await;
        state.select_industry(selection)?;
        info!(
            wizard_id = %self.id,
            industry = %industry.trim(),
            sub_industry = %sub_industry.trim(),
            "Industry selected"
        );
        Ok(self.snapshot_of(&state))
    }

    pub async fn choose_mode(&self, mode: InputMode) -> Result<WizardSnapshot> {
        self.touch().await;
        let mut state = self.state.write().await;
        state.choose_mode(mode)?;
        info!(wizard_id = %self.id, %mode, "Input mode chosen");
        Ok(self.snapshot_of(&state))
    }

    pub async fn back(&self) -> Result<WizardSnapshot> {
        self.touch().await;
        let mut state = self.state.write().await;
        let from = state.step();
        let to = state.back()?;
        info!(wizard_id = %self.id, %from, %to, "Stepped back");
        Ok(self.snapshot_of(&state))
    }

    pub async fn restart(&self) -> WizardSnapshot {
        self.touch().await;
        let mut state = self.state.write().await;
        state.restart();
        info!(wizard_id = %self.id, "Wizard restarted");
        self.snapshot_of(&state)
    }

    /// Validate collector input and dispatch a generation request.
    ///
    /// Mode and validation failures leave the state untouched. Submitting
    /// again while generating supersedes the request already in flight.
    pub async fn submit(&self, input: CollectorInput) -> Result<RequestTicket> {
        self.touch().await;
        let mut state = self.state.write().await;
        state.accepts(input.mode())?;
        let partial = input.collect(&self.catalog)?;
        let pending = state.begin_submission(partial)?;
        drop(state);
        Ok(self.dispatch(pending))
    }

    /// Dispatch a generation request from an already-assembled payload.
    pub async fn submit_profile(&self, partial: PartialProfile) -> Result<RequestTicket> {
        self.touch().await;
        let pending = self.state.write().await.begin_submission(partial)?;
        Ok(self.dispatch(pending))
    }

    fn dispatch(&self, pending: PendingRequest) -> RequestTicket {
        let request_id = pending.id;
        let wizard_id = self.id;
        let state = Arc::clone(&self.state);
        let gateway = Arc::clone(&self.gateway);
        let timeout = self.generation_timeout;

        info!(
            %wizard_id,
            request_id,
            provider = gateway.name(),
            sub_industry = %pending.profile.sub_industry,
            "Dispatching proposal generation"
        );

        let handle = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, gateway.generate(&pending.profile)).await {
                Ok(result) => result,
                Err(_) => Err(GatewayError::Timeout(timeout)),
            };
            if let Err(e) = &outcome {
                warn!(%wizard_id, request_id, error = %e, "Proposal generation failed");
            }

            let resolution = state
                .write()
                .await
                .resolve(request_id, outcome.map_err(|e| e.to_string()));
            match resolution {
                Resolution::Committed => info!(%wizard_id, request_id, "Generation result committed"),
                Resolution::Stale => debug!(%wizard_id, request_id, "Discarding stale generation result"),
            }
            resolution
        });

        RequestTicket { request_id, handle }
    }

    /// The ready proposal rendered for viewing.
    pub async fn proposal_view(&self, brand: &BrandConfig) -> Result<ProposalView> {
        self.touch().await;
        let state = self.state.read().await;
        let (Some(proposal), Some(selection)) = (state.proposal(), state.selection()) else {
            return Err(WizardError::NoProposal.into());
        };
        Ok(ProposalView {
            markdown: render_proposal(proposal, selection, brand),
            file_name: export_file_name(brand, &selection.sub_industry),
            proposal: proposal.clone(),
        })
    }

    /// Render the ready proposal to PDF on the blocking pool.
    pub async fn export_pdf(&self, brand: &BrandConfig) -> Result<ExportedDocument> {
        self.touch().await;
        let (proposal, selection) = {
            let state = self.state.read().await;
            match (state.proposal(), state.selection()) {
                (Some(p), Some(s)) => (p.clone(), s.clone()),
                _ => return Err(WizardError::NoProposal.into()),
            }
        };
        let file_name = export_file_name(brand, &selection.sub_industry);
        let brand = brand.clone();

        let bytes = tokio::task::spawn_blocking(move || {
            render_proposal_pdf(&proposal, &selection, &brand)
        })
        .await
        .map_err(|e| ExportError::Join(e.to_string()))??;

        info!(wizard_id = %self.id, %file_name, size = bytes.len(), "Proposal exported");
        Ok(ExportedDocument { file_name, bytes })
    }
}

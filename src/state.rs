use std::sync::Arc;

use anyhow::Result;

use crate::api::ApiClient;
use crate::artifacts::ArtifactFetcher;
use crate::config::ClientConfig;
use crate::docs::upload::UploadCoordinator;
use crate::docs::DocumentRegistry;
use crate::qa::{QaClient, QaPanel};
use crate::session::orchestrator::Orchestrator;

/// Everything a command handler can reach.
pub struct AppState {
    pub config: ClientConfig,
    pub session: Orchestrator,
    pub qa: QaClient,
    pub qa_panel: QaPanel,
}

impl AppState {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);
        let session = Orchestrator::new(
            DocumentRegistry::new(api.clone()),
            ArtifactFetcher::new(api.clone()),
            UploadCoordinator::new(api.clone(), config.upload_flags),
            config.auto_select_uploads,
        );
        let qa = QaClient::new(api, config.qa_top_k);

        Ok(Self {
            config,
            session,
            qa,
            qa_panel: QaPanel::default(),
        })
    }
}

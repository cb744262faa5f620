use std::sync::Arc;

use crate::clients::chat::ChatClient;
use crate::clients::storage::build_blob_store;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    ApplicantService, AuthService, SeaOrmApplicantService, SeaOrmAuthService, SeaOrmUserService,
    TokenIssuer, UserService,
};

/// Build a shared HTTP client for the blob store and chat API.
/// Reused across requests so connections are pooled.
fn build_shared_http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(
            config.http.request_timeout_seconds,
        ))
        .user_agent(config.http.user_agent.clone())
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Every long-lived handle, built once at start-up.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub chat: Arc<ChatClient>,

    pub tokens: Arc<TokenIssuer>,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub applicant_service: Arc<dyn ApplicantService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires services around an already opened store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        config.validate()?;

        let http_client = build_shared_http_client(&config)?;

        let blobs = build_blob_store(http_client.clone(), &config.storage);
        let chat = Arc::new(ChatClient::new(http_client, &config.ai));
        let tokens = Arc::new(TokenIssuer::from_config(&config.security));

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), tokens.clone()))
            as Arc<dyn AuthService + Send + Sync + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn UserService + Send + Sync + 'static>;

        let applicant_service = Arc::new(SeaOrmApplicantService::new(
            store.clone(),
            blobs,
            config.storage.max_upload_bytes,
        )) as Arc<dyn ApplicantService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            chat,
            tokens,
            auth_service,
            user_service,
            applicant_service,
        })
    }
}

//! Application state

use std::sync::Arc;

use tracing::{info, warn};

use checkin_core::checkin::{
    CheckInEngine, CheckInNotifier, CheckInPolicy, LogNotifier, WebhookNotifier,
};
use checkin_core::event::EventService;
use checkin_core::organization::OrganizationService;
use checkin_core::phone::PhoneHasher;
use checkin_core::registration::RegistrationService;
use checkin_core::stats::StatsService;
use checkin_core::store::Stores;
use checkin_core::upload::{BlobStore, UploadBroker, UploadSigner};

use crate::audit::{AuditEvent, AuditStore};
use crate::auth::AdminAuth;
use crate::config::ServiceConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServiceConfig,
    organizations: OrganizationService,
    events: EventService,
    registrations: RegistrationService,
    checkins: CheckInEngine,
    uploads: UploadBroker,
    stats: StatsService,
    audit: AuditStore,
    auth: AdminAuth,
}

impl AppState {
    /// Open the stores under `config.data_dir` and wire the services.
    pub async fn new(config: ServiceConfig) -> checkin_core::Result<Self> {
        let stores = Stores::open(&config.data_dir).await?;
        let hasher = PhoneHasher::new(config.phone_hash_salt.clone());
        if !hasher.is_hashing() {
            warn!("PHONE_HASH_SALT is not set; phone numbers are stored as plain digits");
        }

        let notifier: Arc<dyn CheckInNotifier> = match &config.webhook_url {
            Some(url) => {
                info!(url = %url, "Check-in webhook enabled");
                Arc::new(WebhookNotifier::new(url.clone()))
            }
            None => Arc::new(LogNotifier),
        };

        let registrations = RegistrationService::new(stores.clone(), hasher.clone());
        let checkins = CheckInEngine::new(
            stores.clone(),
            hasher,
            CheckInPolicy {
                fuzzy_phone_match: config.fuzzy_phone_match,
            },
            notifier,
        );
        let uploads = UploadBroker::new(
            stores.clone(),
            UploadSigner::new(&config.upload_signing_secret),
            config.public_base_url.clone(),
            BlobStore::new(config.data_dir.join("blobs")),
            registrations.clone(),
        );
        let audit = AuditStore::new(config.data_dir.join("audit")).await?;
        let auth = AdminAuth::new(
            config.admin_username.clone(),
            &config.admin_password,
            config.jwt_secret.clone(),
            config.token_ttl_seconds,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                organizations: OrganizationService::new(stores.clone()),
                events: EventService::new(stores.clone(), config.client_url.clone()),
                registrations,
                checkins,
                uploads,
                stats: StatsService::new(stores),
                audit,
                auth,
                config,
            }),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    pub fn organizations(&self) -> &OrganizationService {
        &self.inner.organizations
    }

    pub fn events(&self) -> &EventService {
        &self.inner.events
    }

    pub fn registrations(&self) -> &RegistrationService {
        &self.inner.registrations
    }

    pub fn checkins(&self) -> &CheckInEngine {
        &self.inner.checkins
    }

    pub fn uploads(&self) -> &UploadBroker {
        &self.inner.uploads
    }

    pub fn stats(&self) -> &StatsService {
        &self.inner.stats
    }

    pub fn audit(&self) -> &AuditStore {
        &self.inner.audit
    }

    pub fn auth(&self) -> &AdminAuth {
        &self.inner.auth
    }

    /// Append to the audit trail. A failed write is logged, never surfaced.
    pub async fn record(&self, event: AuditEvent) {
        let action = event.action.clone();
        if let Err(err) = self.inner.audit.append(event).await {
            warn!(action = %action, error = %err, "Failed to record audit event");
        }
    }
}

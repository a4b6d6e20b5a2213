pub mod apply;
pub mod remove;
pub mod status;
pub mod validate;

use std::sync::Arc;

use anyhow::Result;

use slipway_admission::{AdmissionGate, SubdomainRegistry};
use slipway_platform::HttpPlatformClient;
use slipway_reconciler::{Reconciler, ReconcilerSettings, SecretStore};

use crate::settings::Settings;

pub(crate) fn gate_from(settings: &Settings) -> AdmissionGate {
    AdmissionGate::new(
        settings.domain.suffix.clone(),
        SubdomainRegistry::new(
            settings.registry.reserved.iter().cloned(),
            settings.registry.blocked_prefixes.iter().cloned(),
        ),
    )
}

pub(crate) fn client_from(settings: &Settings) -> Result<Arc<HttpPlatformClient>> {
    let token = settings.platform_token()?;
    Ok(Arc::new(HttpPlatformClient::new(
        &settings.platform.base_url,
        token,
    )?))
}

pub(crate) fn reconciler_from(settings: &Settings) -> Result<Reconciler> {
    let client = client_from(settings)?;
    let reconciler_settings =
        ReconcilerSettings::new(&settings.platform.project, &settings.domain.suffix)
            .with_github_app_owners(settings.sources.github_app_owners.iter().cloned())
            .with_deploy_key_owners(settings.sources.deploy_key_owners.iter().cloned())
            .with_auto_deploy_owners(settings.autodeploy.allowed_owners.iter().cloned());
    Ok(Reconciler::new(
        client,
        reconciler_settings,
        SecretStore::from_env(),
    ))
}

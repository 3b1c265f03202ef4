//! Organization administration

use tracing::info;

use super::model::{
    dedupe_versions, CreateOrganizationRequest, Organization, UpdateOrganizationRequest,
};
use crate::store::Stores;
use crate::{Error, Result};

#[derive(Clone)]
pub struct OrganizationService {
    stores: Stores,
}

impl OrganizationService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn create(&self, request: CreateOrganizationRequest) -> Result<Organization> {
        let code = request.organization_code.trim();
        if code.is_empty() {
            return Err(Error::InvalidInput(
                "organization_code cannot be empty".to_string(),
            ));
        }
        let name = request.organization_name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "organization_name cannot be empty".to_string(),
            ));
        }

        let mut organization =
            Organization::new(code, name).with_event_versions(request.event_version);
        if let Some(url) = request.logo_url.filter(|url| !url.trim().is_empty()) {
            organization = organization.with_logo_url(url);
        }

        let created = self.stores.organizations.create(organization).await?;
        info!(organization = %created.organization_code, "Organization created");
        Ok(created)
    }

    pub async fn get(&self, code: &str) -> Result<Organization> {
        self.stores
            .organizations
            .get(code)
            .await?
            .ok_or_else(|| Error::not_found("Organization", code))
    }

    pub async fn list(&self) -> Result<Vec<Organization>> {
        self.stores.organizations.list().await
    }

    /// Edit name, logo and version set. Events already issued under a version
    /// that is later removed keep it.
    pub async fn update(&self, request: UpdateOrganizationRequest) -> Result<Organization> {
        let name = match request.organization_name {
            Some(name) if name.trim().is_empty() => {
                return Err(Error::InvalidInput(
                    "organization_name cannot be empty".to_string(),
                ));
            }
            name => name.map(|name| name.trim().to_string()),
        };
        let logo_url = request.logo_url;
        let versions = request.event_version.map(dedupe_versions);

        self.stores
            .organizations
            .update(
                &request.organization_code,
                Box::new(move |organization: &mut Organization| {
                    if let Some(name) = name {
                        organization.organization_name = name;
                    }
                    if let Some(url) = logo_url {
                        organization.logo_url = Some(url).filter(|url| !url.trim().is_empty());
                    }
                    if let Some(versions) = versions {
                        organization.event_version = versions;
                    }
                    Ok(())
                }),
            )
            .await
    }

    /// Remove an organization. Refused while it still owns events.
    pub async fn delete(&self, code: &str) -> Result<()> {
        self.get(code).await?;

        let owned = self.stores.events.count_for_organization(code).await?;
        if owned > 0 {
            return Err(Error::Conflict(format!(
                "Organization {} still owns {} event(s)",
                code, owned
            )));
        }

        self.stores.organizations.delete(code).await?;
        info!(organization = %code, "Organization deleted");
        Ok(())
    }
}

//! Typed calls for the `/employees` resource.

use crate::api::{ApiClient, RequestOptions};
use hrdesk_core::error::{HrdeskError, HrdeskResult};
use hrdesk_core::{Employee, EmployeeUpdate, NewEmployee};

const COLLECTION: &str = "/employees";

/// Employee endpoints over a shared [`ApiClient`].
///
/// Mutations are one-off calls; callers re-list afterwards rather than
/// patching any local copy.
#[derive(Debug, Clone)]
pub struct EmployeeApi {
    client: ApiClient,
}

impl EmployeeApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// An empty table may come back as `null`; that is an empty list.
    pub async fn list(&self) -> HrdeskResult<Vec<Employee>> {
        let items: Vec<Employee> = self
            .client
            .fetch::<Option<Vec<Employee>>>(COLLECTION, RequestOptions::get())
            .await?
            .unwrap_or_default();
        tracing::debug!(count = items.len(), "listed employees");
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> HrdeskResult<Employee> {
        self.client.fetch(&item_path(id)?, RequestOptions::get()).await
    }

    /// Validates `form` locally, then creates the record.
    pub async fn create(&self, form: &NewEmployee) -> HrdeskResult<Employee> {
        form.validate()?;
        let created: Employee = self
            .client
            .fetch(COLLECTION, RequestOptions::post().json(form)?)
            .await?;
        tracing::info!(id = %created.id, employee_id = %form.employee_id, "employee created");
        Ok(created)
    }

    pub async fn update(&self, id: &str, changes: &EmployeeUpdate) -> HrdeskResult<Employee> {
        let path = item_path(id)?;
        changes.validate()?;
        let updated: Employee = self.client.fetch(&path, RequestOptions::put().json(changes)?).await?;
        tracing::info!(id, "employee updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> HrdeskResult<()> {
        self.client.execute(&item_path(id)?, RequestOptions::delete()).await?;
        tracing::info!(id, "employee deleted");
        Ok(())
    }
}

/// `/employees/{id}` with the id percent-encoded as one path segment.
fn item_path(id: &str) -> HrdeskResult<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(HrdeskError::InvalidInput("employee id must not be empty".into()));
    }
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    // form encoding turns spaces into '+', which a path segment would keep literally.
    Ok(format!("{COLLECTION}/{}", encoded.replace('+', "%20")))
}

//! Registration administration and bulk import

use tracing::{debug, info};

use super::import::{parse_sheet, SpreadsheetFormat};
use super::model::{
    clean_email, CreateRegistrationRequest, ImportSummary, Registration, RowError,
    UpdateRegistrationRequest,
};
use crate::event::Event;
use crate::phone::PhoneHasher;
use crate::store::{InsertOutcome, Stores};
use crate::{Error, Result};

/// Rows written per store batch during bulk import
const IMPORT_BATCH_SIZE: usize = 500;

#[derive(Clone)]
pub struct RegistrationService {
    stores: Stores,
    hasher: PhoneHasher,
}

impl RegistrationService {
    pub fn new(stores: Stores, hasher: PhoneHasher) -> Self {
        Self { stores, hasher }
    }

    /// Register one attendee. `Conflict` if the phone is already registered
    /// for the event.
    pub async fn add(&self, request: CreateRegistrationRequest) -> Result<Registration> {
        self.event(&request.event_code).await?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("name cannot be empty".to_string()));
        }
        let identity = self.hasher.identify(&request.phone)?;
        let registration = Registration::new(&request.event_code, identity.identifier, name)
            .with_email(clean_email(request.email))
            .with_phone_tail(identity.tail);

        match self.stores.registrations.insert_if_absent(registration).await? {
            InsertOutcome::Inserted(created) => {
                info!(event = %created.event_code, "Registration added");
                Ok(created)
            }
            InsertOutcome::Existing(_) => Err(Error::Conflict(format!(
                "Phone is already registered for event {}",
                request.event_code
            ))),
        }
    }

    pub async fn get(&self, event_code: &str, phone: &str) -> Result<Registration> {
        self.stores
            .registrations
            .get(event_code, phone)
            .await?
            .ok_or_else(|| Error::not_found("Registration", format!("{}/{}", event_code, phone)))
    }

    /// Edit name and email. The phone identity itself never changes.
    pub async fn update(&self, request: UpdateRegistrationRequest) -> Result<Registration> {
        let name = match request.name {
            Some(name) if name.trim().is_empty() => {
                return Err(Error::InvalidInput("name cannot be empty".to_string()));
            }
            name => name.map(|name| name.trim().to_string()),
        };
        let email = request.email.map(|email| clean_email(Some(email)));

        self.stores
            .registrations
            .update(
                &request.event_code,
                &request.phone,
                Box::new(move |registration: &mut Registration| {
                    if let Some(name) = name {
                        registration.name = name;
                    }
                    if let Some(email) = email {
                        registration.email = email;
                    }
                    Ok(())
                }),
            )
            .await
    }

    /// Remove a registration. Refused while a check-in depends on it; delete
    /// the check-in first.
    pub async fn delete(&self, event_code: &str, phone: &str) -> Result<()> {
        self.get(event_code, phone).await?;

        if self.stores.checkins.get(event_code, phone).await?.is_some() {
            return Err(Error::Conflict(
                "Registration has a check-in; delete the check-in first".to_string(),
            ));
        }

        self.stores.registrations.delete(event_code, phone).await?;
        info!(event = %event_code, "Registration deleted");
        Ok(())
    }

    pub async fn list(&self, event_code: &str) -> Result<Vec<Registration>> {
        self.event(event_code).await?;
        self.stores.registrations.list(event_code).await
    }

    /// Import a spreadsheet of attendees. Duplicate phones (within the file or
    /// already registered) and malformed rows are skipped and reported; only an
    /// unreadable file fails the whole call.
    pub async fn bulk_import(
        &self,
        event_code: &str,
        bytes: &[u8],
        format: SpreadsheetFormat,
    ) -> Result<ImportSummary> {
        self.event(event_code).await?;
        let sheet = parse_sheet(bytes, format)?;

        let mut errors = sheet.errors;
        let mut candidates = Vec::with_capacity(sheet.rows.len());
        for row in sheet.rows {
            match self.hasher.identify(&row.mobile) {
                Ok(identity) => candidates.push((
                    row.row,
                    Registration::new(event_code, identity.identifier, row.name)
                        .with_email(row.email)
                        .with_phone_tail(identity.tail),
                )),
                Err(err) => errors.push(RowError {
                    row: row.row,
                    reason: err.to_string(),
                }),
            }
        }

        let mut processed = 0usize;
        for chunk in candidates.chunks(IMPORT_BATCH_SIZE) {
            let (rows, batch): (Vec<usize>, Vec<Registration>) = chunk.iter().cloned().unzip();
            let outcomes = self
                .stores
                .registrations
                .insert_many_if_absent(batch)
                .await?;
            for (row, outcome) in rows.into_iter().zip(outcomes) {
                if outcome.is_inserted() {
                    processed += 1;
                } else {
                    errors.push(RowError {
                        row,
                        reason: "phone already registered".to_string(),
                    });
                }
            }
        }

        errors.sort_by_key(|e| e.row);
        let skipped = errors.len();
        info!(
            event = %event_code,
            processed,
            skipped,
            "Bulk registration import finished"
        );
        debug!(?errors, "Skipped import rows");

        Ok(ImportSummary {
            rows_processed: processed,
            rows_skipped: skipped,
            message: format!("{} row(s) imported, {} skipped", processed, skipped),
            errors,
        })
    }

    async fn event(&self, code: &str) -> Result<Event> {
        self.stores
            .events
            .get(code)
            .await?
            .ok_or_else(|| Error::not_found("Event", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::CheckIn;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    async fn build_service() -> (RegistrationService, Stores, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let stores = Stores::open(temp_dir.path()).await.unwrap();
        let now = Utc::now();
        stores
            .events
            .create(Event::new("awskrug", "Meetup", now, now + Duration::hours(2)).with_code("E1"))
            .await
            .unwrap();
        let service = RegistrationService::new(stores.clone(), PhoneHasher::new(None));
        (service, stores, temp_dir)
    }

    fn add_request(phone: &str, name: &str) -> CreateRegistrationRequest {
        CreateRegistrationRequest {
            event_code: "E1".to_string(),
            phone: phone.to_string(),
            name: name.to_string(),
            email: Some("kim@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_normalizes_phone_and_rejects_duplicates() {
        let (service, _stores, _temp) = build_service().await;

        let created = service.add(add_request("010-0000-0001", "Kim")).await.unwrap();
        assert_eq!(created.phone, "01000000001");
        assert_eq!(created.phone_tail.as_deref(), Some("0001"));

        let err = service
            .add(add_request("01000000001", "Kim again"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "conflict");
        assert_eq!(service.list("E1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_requires_event() {
        let (service, _stores, _temp) = build_service().await;
        let mut req = add_request("0100", "Kim");
        req.event_code = "missing".to_string();

        assert_eq!(service.add(req).await.unwrap_err().kind(), "not_found");
    }

    #[tokio::test]
    async fn test_update_changes_name_and_email_only() {
        let (service, _stores, _temp) = build_service().await;
        let created = service.add(add_request("01000000001", "Kim")).await.unwrap();

        let updated = service
            .update(UpdateRegistrationRequest {
                event_code: "E1".to_string(),
                phone: created.phone.clone(),
                name: Some("Kim Minji".to_string()),
                email: Some(String::new()),
            })
            .await
            .unwrap();

        assert_eq!(updated.phone, created.phone);
        assert_eq!(updated.name, "Kim Minji");
        assert!(updated.email.is_none());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_checkin() {
        let (service, stores, _temp) = build_service().await;
        let created = service.add(add_request("01000000001", "Kim")).await.unwrap();
        let event = stores.events.get("E1").await.unwrap().unwrap();
        stores
            .checkins
            .insert_if_absent(CheckIn::from_registration(&event, &created, Utc::now()))
            .await
            .unwrap();

        let err = service.delete("E1", &created.phone).await.unwrap_err();
        assert_eq!(err.kind(), "conflict");

        stores.checkins.delete("E1", &created.phone).await.unwrap();
        service.delete("E1", &created.phone).await.unwrap();
        assert_eq!(
            service.delete("E1", &created.phone).await.unwrap_err().kind(),
            "not_found"
        );
    }

    #[tokio::test]
    async fn test_bulk_import_counts_first_occurrence_only() {
        let (service, _stores, _temp) = build_service().await;
        service.add(add_request("010-9999-9999", "Existing")).await.unwrap();

        let csv = "visitor_name,visitor_mobile,visitor_email\n\
                   Kim,010-0000-0001,kim@example.com\n\
                   Kim twin,01000000001,twin@example.com\n\
                   Lee,010-0000-0002,\n\
                   Bad,no digits,\n\
                   Old,010-9999-9999,\n";
        let summary = service
            .bulk_import("E1", csv.as_bytes(), SpreadsheetFormat::Csv)
            .await
            .unwrap();

        assert_eq!(summary.rows_processed, 2);
        assert_eq!(summary.rows_skipped, 3);
        let skipped: Vec<usize> = summary.errors.iter().map(|e| e.row).collect();
        assert_eq!(skipped, vec![3, 5, 6]);

        let registrations = service.list("E1").await.unwrap();
        assert_eq!(registrations.len(), 3);
        let kim = service.get("E1", "01000000001").await.unwrap();
        assert_eq!(kim.name, "Kim");
    }

    #[tokio::test]
    async fn test_bulk_import_unparseable_file_fails() {
        let (service, _stores, _temp) = build_service().await;
        let err = service
            .bulk_import("E1", b"garbage", SpreadsheetFormat::Xlsx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_format");
    }
}

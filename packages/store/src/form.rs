//! Report form submission.

use panic_report_device::location::GeolocationProvider;
use panic_report_models::{Report, ReportForm};

use crate::{ReportStore, StoreError};

/// Validates `form`, attaches a position fix when one is available, and
/// adds the report to `store`.
///
/// A refused or failed position fix does not block submission; the report
/// goes out without a position.
///
/// # Errors
///
/// * [`StoreError::Validation`] if a required field is blank or unknown;
///   nothing is submitted in that case
/// * any error from [`ReportStore::add_report`]
pub async fn submit_form<'s>(
    store: &'s mut ReportStore,
    geolocation: &GeolocationProvider,
    form: &ReportForm,
) -> Result<&'s Report, StoreError> {
    let draft = form.validate()?;

    let position = match geolocation.get_position().await {
        Ok(position) => Some(position),
        Err(e) => {
            log::warn!("Submitting report without position: {e}");
            None
        }
    };

    store.add_report(draft.with_position(position)).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use panic_report_device::Capability;
    use panic_report_device::location::FixedLocation;
    use panic_report_device::permission::{Permissions, StaticPrompt};
    use panic_report_models::{DenunciationStatus, RequiredField, ReportType, Urgency, ValidationError};

    use super::*;
    use crate::test_support::local_store;

    fn geolocation(granted: &[Capability]) -> GeolocationProvider {
        GeolocationProvider::new(
            Arc::new(Permissions::new(Arc::new(StaticPrompt::granting(granted)))),
            Arc::new(FixedLocation::new(-22.9068, -43.1729)),
        )
    }

    fn form(report_type: &str, description: &str, urgency: &str) -> ReportForm {
        ReportForm {
            report_type: report_type.to_string(),
            description: description.to_string(),
            urgency: urgency.to_string(),
        }
    }

    #[tokio::test]
    async fn valid_form_is_stored_with_position() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = local_store(tmp.path());

        let report = submit_form(
            &mut store,
            &geolocation(&[Capability::Location]),
            &form("fisica", "teste", "alta"),
        )
        .await
        .unwrap();

        assert_eq!(report.report_type(), ReportType::PhysicalViolence);
        assert_eq!(report.urgency(), Urgency::High);
        assert_eq!(report.status(), DenunciationStatus::Pending);
        let position = report.position().unwrap();
        assert!((position.latitude - -22.9068).abs() < 1e-9);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn denied_location_still_submits() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = local_store(tmp.path());

        let report = submit_form(&mut store, &geolocation(&[]), &form("outro", "x", "baixa"))
            .await
            .unwrap();
        assert!(report.position().is_none());
    }

    #[tokio::test]
    async fn blank_fields_submit_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = local_store(tmp.path());

        let err = submit_form(
            &mut store,
            &geolocation(&[Capability::Location]),
            &form("", "  ", "alta"),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::Missing(ref fields))
                if fields == &[RequiredField::ReportType, RequiredField::Description]
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn unknown_urgency_submits_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = local_store(tmp.path());

        let err = submit_form(
            &mut store,
            &geolocation(&[Capability::Location]),
            &form("fisica", "x", "urgentissima"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, StoreError::Validation(ValidationError::Classification(_))));
        assert!(store.is_empty());
    }
}

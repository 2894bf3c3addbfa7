//! Admin bulk communication service

use std::{collections::HashMap, collections::HashSet, sync::Arc};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        communication::{
            AdminCommunication, AdminCommunicationCreate, AdminCommunicationHistoryResponse,
        },
        university::University,
    },
    repository::{CommunicationStore, RecipientDirectory},
    services::email::Mailer,
};

#[derive(Clone)]
pub struct CommunicationsService {
    store: Arc<dyn CommunicationStore>,
    directory: Arc<dyn RecipientDirectory>,
    mailer: Arc<dyn Mailer>,
}

impl CommunicationsService {
    pub fn new(
        store: Arc<dyn CommunicationStore>,
        directory: Arc<dyn RecipientDirectory>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            directory,
            mailer,
        }
    }

    /// Record a communication, deliver it to every recipient and store the outcome.
    ///
    /// Recipients and their contacts are resolved before anything is stored.
    /// Per-recipient failures are counted, never retried.
    pub async fn send(
        &self,
        request: AdminCommunicationCreate,
        sent_by: &str,
    ) -> AppResult<AdminCommunicationHistoryResponse> {
        request.check()?;

        let recipients = self.resolve_recipients(&request).await?;
        let universities = self.directory.find(&recipients).await?;
        let by_id: HashMap<&str, &University> =
            universities.iter().map(|u| (u.id.as_str(), u)).collect();

        let mut communication = AdminCommunication::new(
            request,
            sent_by,
            recipients,
            Uuid::new_v4().to_string(),
            Utc::now(),
        )?;
        self.store.insert(&communication).await?;

        let mut successful = 0;
        let mut failed = 0;
        for university_id in &communication.recipient_university_ids {
            let Some(address) = by_id.get(university_id.as_str()).and_then(|u| u.email.as_deref())
            else {
                tracing::warn!(
                    communication_id = %communication.id,
                    university_id = %university_id,
                    "No contact email for recipient"
                );
                failed += 1;
                continue;
            };

            match self
                .mailer
                .send_html(address, &communication.subject, &communication.message)
                .await
            {
                Ok(()) => successful += 1,
                Err(e) => {
                    tracing::warn!(
                        communication_id = %communication.id,
                        university_id = %university_id,
                        error = %e,
                        "Delivery failed"
                    );
                    failed += 1;
                }
            }
        }

        communication.record_delivery_outcome(successful, failed, Utc::now())?;
        if let Err(e) = self.store.update(&communication).await {
            // emails are already out; keep the outcome in the logs
            tracing::error!(
                communication_id = %communication.id,
                total = communication.total_recipients,
                successful,
                failed,
                status = ?communication.status,
                error = %e,
                "Failed to record delivery outcome"
            );
            return Err(e);
        }

        tracing::info!(
            communication_id = %communication.id,
            sent_by,
            total = communication.total_recipients,
            successful,
            failed,
            status = ?communication.status,
            "Communication dispatched"
        );

        let names = names_in_order(&communication.recipient_university_ids, &by_id);
        Ok(communication.into_history(names))
    }

    /// All communications, newest first
    pub async fn history(&self) -> AppResult<Vec<AdminCommunicationHistoryResponse>> {
        let communications = self.store.list().await?;

        let ids: Vec<String> = communications
            .iter()
            .flat_map(|c| c.recipient_university_ids.iter().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let universities = self.directory.find(&ids).await?;
        let by_id: HashMap<&str, &University> =
            universities.iter().map(|u| (u.id.as_str(), u)).collect();

        Ok(communications
            .into_iter()
            .map(|c| {
                let names = names_in_order(&c.recipient_university_ids, &by_id);
                c.into_history(names)
            })
            .collect())
    }

    pub async fn get(&self, id: &str) -> AppResult<AdminCommunicationHistoryResponse> {
        let communication = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Communication {} not found", id)))?;

        let universities = self
            .directory
            .find(&communication.recipient_university_ids)
            .await?;
        let by_id: HashMap<&str, &University> =
            universities.iter().map(|u| (u.id.as_str(), u)).collect();
        let names = names_in_order(&communication.recipient_university_ids, &by_id);
        Ok(communication.into_history(names))
    }

    async fn resolve_recipients(&self, request: &AdminCommunicationCreate) -> AppResult<Vec<String>> {
        let ids = if request.send_to_all {
            self.directory.all_university_ids().await?
        } else {
            request.university_ids.clone().unwrap_or_default()
        };

        let mut seen = HashSet::new();
        Ok(ids.into_iter().filter(|id| seen.insert(id.clone())).collect())
    }
}

fn names_in_order(ids: &[String], by_id: &HashMap<&str, &University>) -> Vec<String> {
    ids.iter()
        .filter_map(|id| by_id.get(id.as_str()).map(|u| u.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::enums::CommunicationStatus,
        repository::{communications::MockCommunicationStore, universities::MockRecipientDirectory},
        services::email::MockMailer,
    };
    use tokio_test::assert_ok;

    fn university(id: &str, email: Option<&str>) -> University {
        University {
            id: id.to_string(),
            name: format!("University {}", id),
            email: email.map(String::from),
        }
    }

    fn request(ids: Option<Vec<&str>>, send_to_all: bool) -> AdminCommunicationCreate {
        AdminCommunicationCreate {
            university_ids: ids.map(|ids| ids.into_iter().map(String::from).collect()),
            send_to_all,
            subject: "Fee deadline".into(),
            message: "<p>Fees are due on the 30th.</p>".into(),
        }
    }

    fn directory_with(universities: Vec<University>) -> MockRecipientDirectory {
        let mut directory = MockRecipientDirectory::new();
        let all: Vec<String> = universities.iter().map(|u| u.id.clone()).collect();
        directory
            .expect_all_university_ids()
            .returning(move || Ok(all.clone()));
        directory.expect_find().returning(move |ids: &[String]| {
            Ok(universities
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect())
        });
        directory
    }

    fn accepting_store() -> MockCommunicationStore {
        let mut store = MockCommunicationStore::new();
        store.expect_insert().times(1).returning(|_| Ok(()));
        store
    }

    #[tokio::test]
    async fn test_send_to_all_delivers_everywhere() {
        let mut store = accepting_store();
        store
            .expect_update()
            .withf(|c: &AdminCommunication| c.successful == 3 && c.failed == 0)
            .times(1)
            .returning(|_| Ok(()));

        let directory = directory_with(vec![
            university("a", Some("a@uni.edu")),
            university("b", Some("b@uni.edu")),
            university("c", Some("c@uni.edu")),
        ]);
        let mut mailer = MockMailer::new();
        mailer.expect_send_html().times(3).returning(|_, _, _| Ok(()));

        let service =
            CommunicationsService::new(Arc::new(store), Arc::new(directory), Arc::new(mailer));
        let sent = service.send(request(None, true), "admin-1").await.unwrap();

        assert_eq!(sent.total_recipients, 3);
        assert_eq!(sent.status, CommunicationStatus::Sent);
        assert!(sent.send_to_all);
        assert_eq!(
            sent.university_names,
            vec!["University a", "University b", "University c"]
        );
    }

    #[tokio::test]
    async fn test_failed_deliveries_make_partial() {
        let mut store = accepting_store();
        store
            .expect_update()
            .withf(|c: &AdminCommunication| {
                c.successful == 1 && c.failed == 2 && c.status == CommunicationStatus::Partial
            })
            .times(1)
            .returning(|_| Ok(()));

        let directory = directory_with(vec![
            university("a", Some("a@uni.edu")),
            university("b", Some("b@uni.edu")),
            university("c", None),
        ]);
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_html()
            .returning(|to: &str, _: &str, _: &str| {
                if to == "a@uni.edu" {
                    Ok(())
                } else {
                    Err(AppError::Internal("smtp down".into()))
                }
            });

        let service =
            CommunicationsService::new(Arc::new(store), Arc::new(directory), Arc::new(mailer));
        let sent = service
            .send(request(Some(vec!["a", "b", "c", "a"]), false), "admin-1")
            .await
            .unwrap();

        assert_eq!(sent.recipient_university_ids, vec!["a", "b", "c"]);
        assert_eq!(sent.total_recipients, 3);
        assert_eq!((sent.successful, sent.failed), (1, 2));
        assert_eq!(sent.status, CommunicationStatus::Partial);
    }

    #[tokio::test]
    async fn test_every_delivery_failing_is_failed() {
        let mut store = accepting_store();
        store.expect_update().times(1).returning(|_| Ok(()));

        let directory = directory_with(vec![university("a", Some("a@uni.edu"))]);
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_html()
            .times(1)
            .returning(|_, _, _| Err(AppError::Internal("rejected".into())));

        let service =
            CommunicationsService::new(Arc::new(store), Arc::new(directory), Arc::new(mailer));
        let sent = service
            .send(request(Some(vec!["a"]), false), "admin-1")
            .await
            .unwrap();
        assert_eq!(sent.status, CommunicationStatus::Failed);
    }

    #[tokio::test]
    async fn test_missing_recipients_rejected_before_storage() {
        let mut store = MockCommunicationStore::new();
        store.expect_insert().never();
        let mut directory = MockRecipientDirectory::new();
        directory.expect_all_university_ids().never();
        let mut mailer = MockMailer::new();
        mailer.expect_send_html().never();

        let service =
            CommunicationsService::new(Arc::new(store), Arc::new(directory), Arc::new(mailer));
        let err = service
            .send(request(Some(vec![]), false), "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_directory_failure_stores_nothing() {
        let mut store = MockCommunicationStore::new();
        store.expect_insert().never();
        store.expect_update().never();
        let mut directory = MockRecipientDirectory::new();
        directory
            .expect_find()
            .times(1)
            .returning(|_| Err(AppError::Internal("directory offline".into())));
        let mut mailer = MockMailer::new();
        mailer.expect_send_html().never();

        let service =
            CommunicationsService::new(Arc::new(store), Arc::new(directory), Arc::new(mailer));
        let err = service
            .send(request(Some(vec!["a", "b"]), false), "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_outcome_write_failure_is_reported() {
        let mut store = accepting_store();
        store
            .expect_update()
            .withf(|c: &AdminCommunication| c.successful == 1 && c.failed == 0)
            .times(1)
            .returning(|_| Err(AppError::NotFound("Communication vanished".into())));

        let directory = directory_with(vec![university("a", Some("a@uni.edu"))]);
        let mut mailer = MockMailer::new();
        mailer.expect_send_html().times(1).returning(|_, _, _| Ok(()));

        let service =
            CommunicationsService::new(Arc::new(store), Arc::new(directory), Arc::new(mailer));
        let err = service
            .send(request(Some(vec!["a"]), false), "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_history_resolves_names() {
        let mut store = MockCommunicationStore::new();
        store.expect_list().returning(|| {
            let comm = AdminCommunication::new(
                request(Some(vec!["b", "a", "gone"]), false),
                "admin-1",
                vec!["b".into(), "a".into(), "gone".into()],
                "c-1".into(),
                Utc::now(),
            )?;
            Ok(vec![comm])
        });
        let directory = directory_with(vec![university("a", None), university("b", None)]);

        let service = CommunicationsService::new(
            Arc::new(store),
            Arc::new(directory),
            Arc::new(MockMailer::new()),
        );
        let history = assert_ok!(service.history().await);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].university_names, vec!["University b", "University a"]);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let mut store = MockCommunicationStore::new();
        store.expect_get().returning(|_| Ok(None));

        let service = CommunicationsService::new(
            Arc::new(store),
            Arc::new(MockRecipientDirectory::new()),
            Arc::new(MockMailer::new()),
        );
        assert!(matches!(service.get("nope").await, Err(AppError::NotFound(_))));
    }
}

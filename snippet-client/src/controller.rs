use crate::{
    api::{ClientError, Snippet, SnippetApi},
    dashboard::{Dashboard, DashboardError},
    features::FeatureFlags,
    form::{FormError, NewSnippetForm},
};

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Drives a [`Dashboard`] through the snippet API. Every call is one request;
/// failures are recorded on the dashboard rather than retried.
pub struct DashboardController<A> {
    api: A,
    dashboard: Dashboard,
}

impl<A: SnippetApi> DashboardController<A> {
    pub fn new(api: A, features: FeatureFlags) -> Self {
        Self { api, dashboard: Dashboard::new(features) }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    pub async fn load(&mut self) {
        self.dashboard.begin_load();
        let result = self.api.list().await.map_err(|err| {
            log::error!("loading snippets failed: {err}");
            err.to_string()
        });
        self.dashboard.finish_load(result);
    }

    /// Opens the detail view with a freshly fetched copy of the snippet.
    pub async fn open(&mut self, id: i64) -> Result<&Snippet, ActionError> {
        let fresh = self.api.get(id).await?;
        self.dashboard.refresh(fresh);
        Ok(self.dashboard.select(id)?)
    }

    /// Commits the open draft. An unchanged draft just leaves edit mode.
    pub async fn save(&mut self) -> Result<(), DashboardError> {
        let Some((id, edit)) = self.dashboard.pending_save()? else {
            self.dashboard.cancel_edit();
            return Ok(());
        };
        let result = self.api.update(id, &edit).await.map_err(|err| err.to_string());
        self.dashboard.finish_save(result);
        Ok(())
    }

    /// Deletes the snippet whose deletion the user confirmed.
    pub async fn delete_confirmed(&mut self) -> Result<(), DashboardError> {
        let id = self.dashboard.confirm_delete()?;
        let result = self.api.delete(id).await.map_err(|err| err.to_string());
        self.dashboard.finish_delete(id, result);
        Ok(())
    }

    /// Creates a snippet from the form, then reloads the list.
    pub async fn submit(&mut self, form: &mut NewSnippetForm) -> Result<Snippet, ActionError> {
        let payload = form.begin_submit()?;
        match self.api.create(&payload).await {
            Ok(created) => {
                form.finish_submit(true);
                self.load().await;
                Ok(created)
            }
            Err(err) => {
                log::error!("creating snippet failed: {err}");
                form.finish_submit(false);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::{
        api::{NewSnippet, SnippetEdit},
        dashboard::{DetailMode, LoadState},
    };

    #[derive(Default)]
    struct FakeApi {
        snippets: Mutex<Vec<Snippet>>,
        fail_with: Option<u16>,
        updates: Mutex<Vec<(i64, SnippetEdit)>>,
    }

    impl FakeApi {
        fn failing(status: u16) -> Self {
            Self { fail_with: Some(status), ..Self::default() }
        }

        fn check(&self) -> Result<(), ClientError> {
            match self.fail_with {
                Some(status) => Err(ClientError::Status { status, message: "Failed".into() }),
                None => Ok(()),
            }
        }
    }

    fn snippet(id: i64, heading: &str) -> Snippet {
        Snippet {
            id,
            heading: heading.into(),
            code: "print(1)".into(),
            language: "python".into(),
            owner_id: Uuid::nil(),
            tags: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl SnippetApi for FakeApi {
        async fn list(&self) -> Result<Vec<Snippet>, ClientError> {
            self.check()?;
            Ok(self.snippets.lock().unwrap().clone())
        }

        async fn get(&self, id: i64) -> Result<Snippet, ClientError> {
            self.check()?;
            self.snippets
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or(ClientError::Status { status: 404, message: "Snippet not found".into() })
        }

        async fn create(&self, new: &NewSnippet) -> Result<Snippet, ClientError> {
            self.check()?;
            let mut snippets = self.snippets.lock().unwrap();
            let created = Snippet {
                heading: new.heading.clone(),
                ..snippet(snippets.len() as i64 + 1, "")
            };
            snippets.insert(0, created.clone());
            Ok(created)
        }

        async fn update(&self, id: i64, edit: &SnippetEdit) -> Result<Snippet, ClientError> {
            self.check()?;
            self.updates.lock().unwrap().push((id, edit.clone()));
            let mut snippets = self.snippets.lock().unwrap();
            let stored = snippets.iter_mut().find(|s| s.id == id).unwrap();
            if let Some(heading) = &edit.heading {
                stored.heading = heading.clone();
            }
            Ok(stored.clone())
        }

        async fn delete(&self, id: i64) -> Result<(), ClientError> {
            self.check()?;
            self.snippets.lock().unwrap().retain(|s| s.id != id);
            Ok(())
        }
    }

    fn seeded() -> FakeApi {
        let api = FakeApi::default();
        *api.snippets.lock().unwrap() = vec![snippet(2, "Second"), snippet(1, "First")];
        api
    }

    #[tokio::test]
    async fn load_failure_is_terminal() {
        let mut controller = DashboardController::new(FakeApi::failing(500), FeatureFlags::default());
        controller.load().await;
        assert!(matches!(controller.dashboard().load_state(), LoadState::Failed(_)));

        let shown = crate::render::render_view(&controller.dashboard().view());
        assert_eq!(shown, "Error\nFailed (HTTP 500)\n");
    }

    #[tokio::test]
    async fn open_refreshes_the_listed_copy() {
        let mut controller = DashboardController::new(seeded(), FeatureFlags::default());
        controller.load().await;
        controller.api.snippets.lock().unwrap()[1].code = "print(2)".into();

        let opened = controller.open(1).await.unwrap();
        assert_eq!(opened.code, "print(2)");
        assert!(controller.open(42).await.is_err());
    }

    #[tokio::test]
    async fn save_round_trip_updates_list() {
        let mut controller = DashboardController::new(seeded(), FeatureFlags::default());
        controller.load().await;

        let dashboard = controller.dashboard_mut();
        dashboard.select(1).unwrap();
        dashboard.start_edit().unwrap();
        dashboard.draft_mut().unwrap().heading = "Renamed".into();
        controller.save().await.unwrap();

        assert_eq!(controller.dashboard().selected().unwrap().heading, "Renamed");
        assert_eq!(controller.dashboard().detail_mode(), Some(&DetailMode::Viewing));
        let updates = controller.api.updates.lock().unwrap();
        assert_eq!(updates[0].1, SnippetEdit { heading: Some("Renamed".into()), ..Default::default() });
    }

    #[tokio::test]
    async fn unchanged_save_sends_nothing() {
        let mut controller = DashboardController::new(seeded(), FeatureFlags::default());
        controller.load().await;
        controller.dashboard_mut().select(2).unwrap();
        controller.dashboard_mut().start_edit().unwrap();

        controller.save().await.unwrap();
        assert!(controller.api.updates.lock().unwrap().is_empty());
        assert_eq!(controller.dashboard().detail_mode(), Some(&DetailMode::Viewing));
    }

    #[tokio::test]
    async fn confirmed_delete_removes_snippet() {
        let mut controller = DashboardController::new(seeded(), FeatureFlags::default());
        controller.load().await;
        controller.dashboard_mut().select(2).unwrap();
        assert!(controller.delete_confirmed().await.is_err());

        controller.dashboard_mut().request_delete().unwrap();
        controller.delete_confirmed().await.unwrap();

        assert!(controller.dashboard().selected().is_none());
        assert_eq!(controller.dashboard().snippets().len(), 1);
    }

    #[tokio::test]
    async fn submit_creates_and_reloads() {
        let mut controller = DashboardController::new(seeded(), FeatureFlags::default());
        let mut form = NewSnippetForm {
            heading: "Third".into(),
            code: "x = 3".into(),
            language: "python".into(),
            ..NewSnippetForm::default()
        };

        let created = controller.submit(&mut form).await.unwrap();
        assert_eq!(created.heading, "Third");
        assert!(form.heading.is_empty());
        assert_eq!(controller.dashboard().snippets()[0].heading, "Third");
    }

    #[tokio::test]
    async fn failed_submit_keeps_form() {
        let mut controller = DashboardController::new(FakeApi::failing(401), FeatureFlags::default());
        let mut form = NewSnippetForm {
            heading: "Third".into(),
            code: "x = 3".into(),
            language: "python".into(),
            ..NewSnippetForm::default()
        };

        let err = controller.submit(&mut form).await.unwrap_err();
        assert!(matches!(err, ActionError::Client(ref e) if e.status() == Some(401)));
        assert_eq!(form.heading, "Third");
        assert!(!form.is_submitting());
    }
}

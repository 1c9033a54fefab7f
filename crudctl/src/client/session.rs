//! Effect runner tying [`state::update`] to the server and the user interface.

use std::collections::VecDeque;

use tracing::{debug, instrument, warn};

use crate::{
    api::models::{auth::LoginRequest, records::RecordResponse},
    client::{
        ClientError, Result,
        api::ApiClient,
        state::{self, Action, DELETE_PROMPT, Effect, Event, ViewState},
        token_store::TokenStore,
    },
};

/// The parts of the client only a user interface can do.
pub trait Frontend {
    /// Ask a yes/no question; blocks until answered
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Show a blocking message
    fn notify(&mut self, message: &str);

    /// Leave the record screen for the login screen
    fn redirect_to_login(&mut self);

    /// Called after every processed event
    fn render(&mut self, _state: &ViewState) {}
}

pub struct ClientSession<F: Frontend, T: TokenStore> {
    api: ApiClient,
    tokens: T,
    frontend: F,
    state: ViewState,
}

impl<F: Frontend, T: TokenStore> ClientSession<F, T> {
    pub fn new(api: ApiClient, tokens: T, frontend: F) -> Self {
        Self {
            api,
            tokens,
            frontend,
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Exchange credentials for a token and persist it
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let token = self.api.login(&LoginRequest::new(username, password)).await?;
        self.tokens.set(&token)?;
        Ok(())
    }

    /// Open the record screen: fetch records if logged in, otherwise go to login
    pub async fn start(&mut self) -> &ViewState {
        let has_token = match self.tokens.get() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!("Could not read stored token: {e}");
                false
            }
        };
        self.dispatch(Event::Loaded { has_token }).await
    }

    /// Process an event and every event its effects produce, in order
    pub async fn dispatch(&mut self, event: Event) -> &ViewState {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            debug!(?event, "Processing client event");
            let (next, effects) = state::update(std::mem::take(&mut self.state), event);
            self.state = next;

            for effect in effects {
                if let Some(follow_up) = self.run(effect).await {
                    queue.push_back(follow_up);
                }
            }
            self.frontend.render(&self.state);
        }

        &self.state
    }

    fn token(&self) -> Result<String> {
        self.tokens.get()?.ok_or(ClientError::NotLoggedIn)
    }

    fn failed(action: Action, error: ClientError) -> Event {
        warn!("{action:?} failed: {error}");
        Event::RequestFailed {
            action,
            unauthorized: error.is_unauthorized(),
        }
    }

    async fn run(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::RedirectToLogin => {
                self.frontend.redirect_to_login();
                None
            }
            Effect::Notify(message) => {
                self.frontend.notify(&message);
                None
            }
            Effect::ClearToken => {
                if let Err(e) = self.tokens.clear() {
                    warn!("Could not clear stored token: {e}");
                }
                None
            }
            Effect::ConfirmDelete(_) => Some(if self.frontend.confirm(DELETE_PROMPT) {
                Event::DeleteConfirmed
            } else {
                Event::DeleteCancelled
            }),
            Effect::FetchRecords => Some(match self.fetch_records().await {
                Ok(records) => Event::RecordsFetched(records),
                Err(e) => Self::failed(Action::FetchRecords, e),
            }),
            Effect::CreateRecord(fields) => {
                let result = match self.token() {
                    Ok(token) => self.api.create_record(&token, &fields.to_payload()).await,
                    Err(e) => Err(e),
                };
                Some(match result {
                    Ok(created) => Event::RecordCreated { id: created.id, fields },
                    Err(e) => Self::failed(Action::SaveRecord, e),
                })
            }
            Effect::UpdateRecord(id, fields) => {
                let result = match self.token() {
                    Ok(token) => self.api.update_record(&token, id, &fields.to_payload()).await,
                    Err(e) => Err(e),
                };
                Some(match result {
                    Ok(_) => Event::RecordUpdated { id, fields },
                    Err(e) => Self::failed(Action::SaveRecord, e),
                })
            }
            Effect::DeleteRecord(id) => {
                let result = match self.token() {
                    Ok(token) => self.api.delete_record(&token, id).await,
                    Err(e) => Err(e),
                };
                Some(match result {
                    Ok(records) => Event::RecordDeleted(records),
                    Err(e) => Self::failed(Action::DeleteRecord, e),
                })
            }
        }
    }

    async fn fetch_records(&self) -> Result<Vec<RecordResponse>> {
        let token = self.token()?;
        self.api.list_records(&token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{
            state::{Field, RECORD_ADDED_MESSAGE, RECORD_UPDATED_MESSAGE},
            token_store::MemoryTokenStore,
        },
        test_utils::{TEST_PASSWORD, TEST_USERNAME, create_test_state, seed_test_operator},
    };
    use serde_json::json;
    use url::Url;
    use uuid::Uuid;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[derive(Default)]
    struct RecordingFrontend {
        confirm_answer: bool,
        prompts: Vec<String>,
        notifications: Vec<String>,
        redirects: usize,
        renders: usize,
    }

    impl Frontend for RecordingFrontend {
        fn confirm(&mut self, prompt: &str) -> bool {
            self.prompts.push(prompt.to_string());
            self.confirm_answer
        }

        fn notify(&mut self, message: &str) {
            self.notifications.push(message.to_string());
        }

        fn redirect_to_login(&mut self) {
            self.redirects += 1;
        }

        fn render(&mut self, _state: &ViewState) {
            self.renders += 1;
        }
    }

    fn session_for(base: &str, tokens: MemoryTokenStore, confirm_answer: bool) -> ClientSession<RecordingFrontend, MemoryTokenStore> {
        let api = ApiClient::new(Url::parse(base).unwrap()).unwrap();
        let frontend = RecordingFrontend {
            confirm_answer,
            ..Default::default()
        };
        ClientSession::new(api, tokens, frontend)
    }

    #[tokio::test]
    async fn test_start_without_token_redirects_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let mut session = session_for(&server.uri(), MemoryTokenStore::new(), true);
        session.start().await;

        assert_eq!(session.frontend().redirects, 1);
    }

    #[tokio::test]
    async fn test_start_with_token_fetches_records() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": id, "name": "Ana", "age": 30, "city": "Lima"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = session_for(&server.uri(), MemoryTokenStore::with_token("tok"), true);
        let state = session.start().await;

        assert_eq!(state.records.len(), 1);
        assert_eq!(state.filtered[0].id, id);
        // Loaded, then RecordsFetched
        assert_eq!(session.frontend().renders, 2);
    }

    #[tokio::test]
    async fn test_expired_token_forces_logout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid or expired token"})))
            .mount(&server)
            .await;

        let mut session = session_for(&server.uri(), MemoryTokenStore::with_token("stale"), true);
        session.start().await;

        assert_eq!(session.frontend().notifications, vec!["Failed to fetch users. Please try again."]);
        assert_eq!(session.frontend().redirects, 1);
        assert_eq!(session.tokens().get().unwrap(), None);
    }

    #[tokio::test]
    async fn test_declined_confirmation_sends_nothing() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": id, "name": "Ana", "age": 30, "city": "Lima"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let mut session = session_for(&server.uri(), MemoryTokenStore::with_token("tok"), false);
        session.start().await;
        let state = session.dispatch(Event::DeleteRequested(id)).await;

        assert_eq!(state.records.len(), 1);
        assert_eq!(session.frontend().prompts, vec![DELETE_PROMPT]);
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_form_open() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "All fields required"})))
            .mount(&server)
            .await;

        let mut session = session_for(&server.uri(), MemoryTokenStore::with_token("tok"), true);
        session.dispatch(Event::AddClicked).await;
        let state = session.dispatch(Event::Submitted).await;

        assert!(state.modal.is_some());
        assert_eq!(session.frontend().notifications, vec!["Failed to save user. Please try again."]);
        assert_eq!(session.frontend().redirects, 0);
    }

    /// Full client flow against a live server on a loopback port
    #[test_log::test(tokio::test)]
    async fn test_session_against_live_server() {
        let state = create_test_state();
        seed_test_operator(&state, TEST_USERNAME, TEST_PASSWORD).await;
        let router = crate::build_router(&state).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let mut session = session_for(&format!("http://{addr}"), MemoryTokenStore::new(), true);

        let err = session.login(TEST_USERNAME, "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "server responded 400 Bad Request: Invalid credentials");

        session.login(TEST_USERNAME, TEST_PASSWORD).await.unwrap();
        assert!(session.start().await.records.is_empty());

        // Add
        session.dispatch(Event::AddClicked).await;
        session.dispatch(Event::FieldEdited(Field::Name, "Ana".to_string())).await;
        session.dispatch(Event::FieldEdited(Field::Age, "30".to_string())).await;
        session.dispatch(Event::FieldEdited(Field::City, "Lima".to_string())).await;
        let view = session.dispatch(Event::Submitted).await;
        assert_eq!(view.records.len(), 1);
        let id = view.records[0].id;

        // Edit
        session.dispatch(Event::EditClicked(id)).await;
        session.dispatch(Event::FieldEdited(Field::Age, "31".to_string())).await;
        let view = session.dispatch(Event::Submitted).await;
        assert_eq!(view.records[0].age, 31);

        // The optimistic view matches what the server holds
        let local = session.state().records.clone();
        session.dispatch(Event::Loaded { has_token: true }).await;
        assert_eq!(session.state().records, local);

        // Delete
        let view = session.dispatch(Event::DeleteRequested(id)).await;
        assert!(view.records.is_empty());

        assert_eq!(session.frontend().notifications, vec![RECORD_ADDED_MESSAGE, RECORD_UPDATED_MESSAGE]);

        // Logout
        session.dispatch(Event::LogoutClicked).await;
        assert_eq!(session.tokens().get().unwrap(), None);
        assert_eq!(session.frontend().redirects, 1);
    }
}

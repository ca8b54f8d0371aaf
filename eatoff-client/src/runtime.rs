//! Event loop driving [`App`] against a [`RemoteApi`] and a [`Frontend`].
//!
//! Network calls run as tokio tasks; their completions come back over one
//! channel and are applied to the app one at a time.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    api::RemoteApi,
    app::{App, AppAction, AppEvent},
    navigation::Screen,
    restaurants::Selection,
};

/// Input and presentation side of the client.
#[async_trait]
pub trait Frontend: Send {
    /// Wait for the next user event. `None` means input is closed.
    ///
    /// Must be cancel safe: it is raced against network completions.
    async fn next_event(&mut self, app: &App) -> Option<AppEvent>;

    /// Draw the current screen.
    fn render(&mut self, app: &App);

    /// The visible screen changed.
    fn navigated(&mut self, _screen: Screen) {}

    /// A restaurant was picked from the list.
    fn selected(&mut self, selection: &Selection);
}

/// Owns the app and performs the actions it asks for.
pub struct Runtime<F> {
    app: App,
    api: Arc<dyn RemoteApi>,
    frontend: F,
    completions_tx: mpsc::UnboundedSender<AppEvent>,
    completions_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl<F> std::fmt::Debug for Runtime<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("app", &self.app)
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

impl<F: Frontend> Runtime<F> {
    /// Runtime that has not started yet; see [`Runtime::run`].
    #[must_use]
    pub fn new(app: App, api: Arc<dyn RemoteApi>, frontend: F) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            app,
            api,
            frontend,
            completions_tx,
            completions_rx,
        }
    }

    /// State machine being driven.
    #[must_use]
    pub const fn app(&self) -> &App {
        &self.app
    }

    /// Frontend receiving renders.
    #[must_use]
    pub const fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Run until the app quits or input closes.
    pub async fn run(&mut self) {
        info!("runtime started");
        self.dispatch(AppEvent::Started);

        while self.app.is_running() {
            let event = tokio::select! {
                Some(completion) = self.completions_rx.recv() => completion,
                input = self.frontend.next_event(&self.app) => input.unwrap_or(AppEvent::Quit),
            };
            self.dispatch(event);
        }
        info!("runtime stopped");
    }

    /// Apply one event and perform the resulting actions.
    pub fn dispatch(&mut self, event: AppEvent) {
        for action in self.app.handle(event) {
            self.perform(action);
        }
    }

    fn perform(&mut self, action: AppAction) {
        debug!(?action, "performing action");
        match action {
            AppAction::Render => self.frontend.render(&self.app),
            AppAction::Navigate(screen) => self.frontend.navigated(screen),
            AppAction::RestaurantSelected(selection) => self.frontend.selected(&selection),
            AppAction::Authorize(token) => self.api.set_auth_token(token),
            AppAction::Quit => {}
            AppAction::Login {
                ticket,
                credentials,
            } => self.spawn(move |api| async move {
                let result = api.login(&credentials.to_request()).await;
                AppEvent::LoginCompleted { ticket, result }
            }),
            AppAction::FetchRestaurants { ticket, filters } => self.spawn(move |api| async move {
                let result = api.list_restaurants(&filters).await;
                AppEvent::RestaurantsLoaded { ticket, result }
            }),
            AppAction::TestConnection { ticket } => self.spawn(move |api| async move {
                let result = api.test_connection().await;
                AppEvent::ConnectionTested { ticket, result }
            }),
            AppAction::Logout => self.spawn(|api| async move {
                let result = api.logout().await;
                AppEvent::LogoutCompleted { result }
            }),
        }
    }

    fn spawn<C, Fut>(&self, call: C)
    where
        C: FnOnce(Arc<dyn RemoteApi>) -> Fut,
        Fut: Future<Output = AppEvent> + Send + 'static,
    {
        let completion = call(Arc::clone(&self.api));
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            // Fails only once the runtime has been dropped.
            let _ = tx.send(completion.await);
        });
    }
}

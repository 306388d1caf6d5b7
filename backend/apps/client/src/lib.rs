//! Bill Client
//!
//! Composition root wiring the auth and records crates to one backend
//! project. Hosts (a desktop shell, a WASM page, the CLI in `main.rs`)
//! build a [`HostedClient`] once and call into it for every page action.
//!
//! Uses `anyhow` for setup errors; every operation itself resolves to a
//! [`kernel::envelope::Envelope`].

use std::sync::Arc;

use auth::{
    AuthConfig, AuthEvent, AuthGateway, AuthStateUseCase, AuthSubscription, ClickOutcome,
    GoTrueGateway, Identity, PageGuard, PageLink, PageProtection, RecentUsers,
    ResetPasswordUseCase, Session, SessionAccessor, SignInInput, SignInOutput, SignInUseCase,
    SignOutUseCase, SignUpInput, SignUpOutcome, SignUpUseCase,
};
use kernel::envelope::Envelope;
use platform::config::ClientConfig;
use platform::navigation::Navigator;
use platform::storage::{FileStore, KeyValueStore, MemoryStore};
use records::{
    CalculationRepository, CalculationService, PostgrestCalculationRepository,
    PostgrestProfileRepository, ProfileRepository, ProfileService,
};

pub use platform::telemetry::{DEFAULT_FILTER, init_tracing};

/// Client bound to the hosted auth and record APIs
pub type HostedClient =
    BillClient<GoTrueGateway, PostgrestCalculationRepository, PostgrestProfileRepository>;

/// Every client operation over one gateway and one pair of repositories
pub struct BillClient<G, C, P>
where
    G: AuthGateway,
    C: CalculationRepository,
    P: ProfileRepository,
{
    session: SessionAccessor<G>,
    recent_users: RecentUsers,
    sign_up: SignUpUseCase<G>,
    sign_in: SignInUseCase<G>,
    sign_out: SignOutUseCase<G>,
    reset_password: ResetPasswordUseCase<G>,
    auth_state: AuthStateUseCase<G>,
    guard: PageGuard<G>,
    calculations: CalculationService<G, C>,
    profiles: ProfileService<G, P>,
}

impl HostedClient {
    /// Build a client for the project in `config`
    ///
    /// Local storage is the JSON file at `config.storage_path`, or process
    /// memory when unset.
    pub fn connect(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> anyhow::Result<Self> {
        let store: Arc<dyn KeyValueStore> = match &config.storage_path {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };

        let gateway = Arc::new(GoTrueGateway::from_config(config, Arc::clone(&store)));
        let calculations = Arc::new(PostgrestCalculationRepository::from_config(
            config,
            gateway.clone(),
        ));
        let profiles = Arc::new(PostgrestProfileRepository::from_config(
            config,
            gateway.clone(),
        ));

        tracing::info!(
            backend = %config.backend_url,
            persistent_storage = config.storage_path.is_some(),
            "Bill client ready"
        );

        Ok(Self::from_parts(
            gateway,
            calculations,
            profiles,
            store,
            navigator,
            AuthConfig::from_client(config),
        ))
    }
}

impl<G, C, P> BillClient<G, C, P>
where
    G: AuthGateway,
    C: CalculationRepository,
    P: ProfileRepository,
{
    pub fn from_parts(
        gateway: Arc<G>,
        calculations: Arc<C>,
        profiles: Arc<P>,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        config: AuthConfig,
    ) -> Self {
        let config = Arc::new(config);
        let recent_users = RecentUsers::new(store, &config);
        let session = SessionAccessor::new(Arc::clone(&gateway));

        Self {
            recent_users: recent_users.clone(),
            sign_up: SignUpUseCase::new(Arc::clone(&gateway), recent_users.clone()),
            sign_in: SignInUseCase::new(Arc::clone(&gateway), recent_users),
            sign_out: SignOutUseCase::new(Arc::clone(&gateway)),
            reset_password: ResetPasswordUseCase::new(
                Arc::clone(&gateway),
                Arc::clone(&navigator),
                Arc::clone(&config),
            ),
            auth_state: AuthStateUseCase::new(Arc::clone(&gateway)),
            guard: PageGuard::new(gateway, navigator, config),
            calculations: CalculationService::new(session.clone(), calculations),
            profiles: ProfileService::new(session.clone(), profiles),
            session,
        }
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn sign_up(&self, email: &str, password: &str) -> Envelope<SignUpOutcome> {
        self.sign_up
            .execute(SignUpInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Envelope<SignInOutput> {
        self.sign_in
            .execute(SignInInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
    }

    pub async fn sign_out(&self) -> Envelope<()> {
        self.sign_out.execute().await
    }

    pub async fn reset_password(&self, email: &str) -> Envelope<()> {
        self.reset_password.execute(email).await
    }

    /// See [`AuthStateUseCase::subscribe`]
    pub fn on_auth_state_change<F>(&self, callback: F) -> AuthSubscription
    where
        F: FnMut(AuthEvent, Option<Session>) + Send + 'static,
    {
        self.auth_state.subscribe(callback)
    }

    pub async fn current_user(&self) -> Option<Identity> {
        self.session.current_identity().await
    }

    pub fn session(&self) -> &SessionAccessor<G> {
        &self.session
    }

    pub fn recent_users(&self) -> &RecentUsers {
        &self.recent_users
    }

    // ========================================================================
    // Page guard
    // ========================================================================

    pub async fn require_auth(&self) -> bool {
        self.guard.require_auth().await
    }

    pub async fn protect_page(&self, links: &[PageLink]) -> PageProtection {
        self.guard.protect_page(links).await
    }

    pub async fn handle_click(&self, link: &PageLink) -> ClickOutcome {
        self.guard.handle_click(link).await
    }

    // ========================================================================
    // Records
    // ========================================================================

    pub fn calculations(&self) -> &CalculationService<G, C> {
        &self.calculations
    }

    pub fn profiles(&self) -> &ProfileService<G, P> {
        &self.profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::MemoryAuthGateway;
    use platform::navigation::MemoryNavigator;
    use records::{CalculationInput, MemoryCalculationRepository, MemoryProfileRepository, ProfileDraft};

    type LocalClient =
        BillClient<MemoryAuthGateway, MemoryCalculationRepository, MemoryProfileRepository>;

    fn local_client(navigator: Arc<MemoryNavigator>) -> (Arc<MemoryAuthGateway>, LocalClient) {
        let gateway = Arc::new(MemoryAuthGateway::new());
        let client = BillClient::from_parts(
            Arc::clone(&gateway),
            Arc::new(MemoryCalculationRepository::new()),
            Arc::new(MemoryProfileRepository::new()),
            Arc::new(MemoryStore::new()),
            navigator,
            AuthConfig::default(),
        );
        (gateway, client)
    }

    fn input() -> CalculationInput {
        CalculationInput {
            month: "2024-03".to_string(),
            previous_reading: 1200.0,
            current_reading: 1350.0,
            rate: 0.25,
            bill_amount: 37.5,
            kwh_used: 150.0,
        }
    }

    #[tokio::test]
    async fn test_dashboard_session() {
        let navigator = Arc::new(MemoryNavigator::new("http://localhost:5500", "dashboard.html"));
        let (gateway, client) = local_client(Arc::clone(&navigator));
        gateway.register("a@x.com", "secret").unwrap();

        assert!(client.sign_in("a@x.com", "secret").await.success);
        assert!(client.require_auth().await);
        assert!(navigator.history().is_empty());

        assert!(client.calculations().save_calculation(input()).await.success);
        assert!(client.profiles().save_profile(ProfileDraft::default()).await.success);
        assert_eq!(client.calculations().last_bill_amount().await, 37.5);
        assert_eq!(client.recent_users().list(), vec!["a@x.com".to_string()]);

        let logout = PageLink::new("login.html", "Log out").in_nav();
        match client.handle_click(&logout).await {
            ClickOutcome::LoggedOut(env) => assert!(env.success),
            ClickOutcome::Follow => panic!("logout link was not intercepted"),
        }
        assert_eq!(navigator.current_path(), "login.html");
        assert!(client.current_user().await.is_none());
    }

    #[tokio::test]
    async fn test_guard_without_session_redirects() {
        let navigator = Arc::new(MemoryNavigator::new("http://localhost:5500", "history.html"));
        let (_, client) = local_client(Arc::clone(&navigator));

        assert!(!client.require_auth().await);
        assert_eq!(navigator.history(), vec!["login.html".to_string()]);

        let env = client.calculations().user_calculations().await;
        assert!(!env.success);
        assert_eq!(env.message, "User not authenticated");
    }

    #[tokio::test]
    async fn test_connect_with_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::new("http://127.0.0.1:54321", "anon").unwrap();
        config.storage_path = Some(dir.path().join("storage.json"));

        let navigator = Arc::new(MemoryNavigator::new("http://localhost:5500", "login.html"));
        let client = HostedClient::connect(&config, navigator).unwrap();

        client.recent_users().add("a@x.com");
        assert!(dir.path().join("storage.json").exists());
        assert!(client.current_user().await.is_none());
    }
}

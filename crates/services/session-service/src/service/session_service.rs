//! Session service - Current identity, role derivation and persistence.
//!
//! The current identity lives in a `watch` channel so guards can read it
//! synchronously and callers can subscribe to changes. Every mutation writes
//! exactly one storage tier and republishes the identity.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::BoxStream;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use common::{delays, simulate, AppError, AppResult, LatencyConfig, OptionExt};
use domain::{
    normalize_email, AuthResponse, NavigationTarget, ProfileUpdate, RegisterData, Route, User,
    UserRole, ViewerRole,
};

use crate::identity::synthesize_identity;
use crate::navigation::Navigator;
use crate::repository::UserDirectory;
use crate::roster::AdminRoster;
use crate::service::identity_changes;
use crate::storage::{SessionStorage, Tier};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const MSG_LOGIN: &str = "Login successful! Welcome.";
const MSG_REGISTERED: &str = "Registration successful! Your account has been created.";
const MSG_EMAIL_TAKEN: &str = "This email address is already in use.";
const MSG_PROFILE_UPDATED: &str = "Your profile has been updated!";
const MSG_PASSWORD_CHANGED: &str = "Your password has been updated successfully.";
const MSG_RESET_SENT: &str = "A password reset link has been sent to your email address.";
const MSG_PROMOTED: &str = "User promoted to admin.";

/// Session service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Sign in. Unknown emails get a freshly synthesized identity; the
    /// password is not checked.
    async fn login(&self, email: &str, password: &str, remember_me: bool)
        -> AppResult<AuthResponse>;

    /// Create an identity and sign in with remember-me. A taken email yields
    /// an unsuccessful response rather than an error.
    async fn register(&self, data: RegisterData) -> AppResult<AuthResponse>;

    /// Clear both tiers, publish no identity and go to the login screen
    fn logout(&self) -> AppResult<()>;

    fn is_authenticated(&self) -> bool;

    fn current_user(&self) -> Option<User>;

    /// Admin status recomputed from the allow-list
    fn is_admin(&self) -> bool;

    /// `guest`, `admin`, or the user's kind
    fn user_role(&self) -> ViewerRole;

    /// Snapshot of the identity directory
    async fn all_users(&self) -> AppResult<Vec<User>>;

    /// Merge into the current identity and persist durably
    async fn update_profile(&self, update: ProfileUpdate) -> AppResult<AuthResponse>;

    async fn change_password(&self, current: &str, new: &str) -> AppResult<AuthResponse>;

    async fn request_password_reset(&self, email: &str) -> AppResult<AuthResponse>;

    /// Add the user's email to the allow-list
    async fn promote_to_admin(&self, user_id: &str) -> AppResult<AuthResponse>;

    /// Receiver for the current identity
    fn subscribe(&self) -> watch::Receiver<Option<User>>;

    /// Current identity followed by every change
    fn changes(&self) -> BoxStream<'static, Option<User>> {
        identity_changes(self.subscribe())
    }
}

/// Concrete implementation of SessionService.
pub struct SessionManager {
    directory: Arc<dyn UserDirectory>,
    roster: Arc<AdminRoster>,
    storage: SessionStorage,
    navigator: Arc<dyn Navigator>,
    latency: LatencyConfig,
    current: watch::Sender<Option<User>>,
}

impl SessionManager {
    /// Create the service and restore any persisted identity.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        roster: Arc<AdminRoster>,
        storage: SessionStorage,
        navigator: Arc<dyn Navigator>,
        latency: LatencyConfig,
    ) -> Self {
        let restored = restore_identity(&storage, &roster);
        let (current, _) = watch::channel(restored);
        Self {
            directory,
            roster,
            storage,
            navigator,
            latency,
            current,
        }
    }

    /// Like `new`, and also records a restored identity in the directory
    /// so it can be looked up by ID.
    pub async fn start(
        directory: Arc<dyn UserDirectory>,
        roster: Arc<AdminRoster>,
        storage: SessionStorage,
        navigator: Arc<dyn Navigator>,
        latency: LatencyConfig,
    ) -> Self {
        let manager = Self::new(directory, roster, storage, navigator, latency);
        if let Some(user) = manager.current_user() {
            manager.adopt(user).await;
        }
        manager
    }

    async fn adopt(&self, user: User) {
        match self.directory.find_by_email(&user.email).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                if let Err(e) = self.directory.insert(user).await {
                    warn!("Restored identity not added to directory: {}", e);
                }
            }
            Err(e) => warn!("Directory lookup failed during restore: {}", e),
        }
    }

    /// Re-derive the role, persist to `tier`, then publish. A failed write
    /// leaves the published identity untouched.
    fn set_user(&self, mut user: User, tier: Tier) -> AppResult<User> {
        user.role = self.roster.role_for(&user.email);
        if let Err(e) = self.storage.persist(&user, tier) {
            warn!(email = %user.email, tier = %tier, "Session not stored: {}", e);
            return Err(e);
        }
        self.current.send_replace(Some(user.clone()));
        debug!(email = %user.email, is_admin = user.is_admin(), "Session updated");
        Ok(user)
    }

    fn is_current(&self, user_id: &str) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|user| user.id == user_id)
    }
}

/// Load the persisted identity. The stored role is never trusted.
fn restore_identity(storage: &SessionStorage, roster: &AdminRoster) -> Option<User> {
    match storage.load() {
        Ok(Some((mut user, tier))) => {
            user.role = roster.role_for(&user.email);
            info!(email = %user.email, tier = %tier, role = %user.role, "Restored session");
            Some(user)
        }
        Ok(None) => {
            debug!("No stored session");
            None
        }
        Err(e) => {
            error!("Stored identity could not be read: {}", e);
            if let Err(e) = storage.clear() {
                warn!("Failed to clear session storage: {}", e);
            }
            None
        }
    }
}

#[async_trait]
impl SessionService for SessionManager {
    async fn login(
        &self,
        email: &str,
        _password: &str,
        remember_me: bool,
    ) -> AppResult<AuthResponse> {
        let email = normalize_email(email);
        info!(email = %email, remember_me, "Login started");

        let user = match self.directory.find_by_email(&email).await? {
            Some(mut user) => {
                user.role = self.roster.role_for(&user.email);
                user.touch_login();
                self.directory.update(user).await?
            }
            None => {
                let mut user = synthesize_identity(&email);
                user.role = self.roster.role_for(&email);
                info!(email = %email, id = %user.id, "Created identity on first sign-in");
                self.directory.insert(user).await?
            }
        };

        simulate(&self.latency, delays::LOGIN_MS).await;

        let user = self.set_user(user, Tier::from_remember_me(remember_me))?;
        info!(email = %user.email, role = %user.role, "Login succeeded");
        Ok(AuthResponse::success(MSG_LOGIN, Some(user)))
    }

    async fn register(&self, data: RegisterData) -> AppResult<AuthResponse> {
        let email = normalize_email(&data.email);
        info!(email = %email, "Registration started");

        if self.directory.find_by_email(&email).await?.is_some() {
            simulate(&self.latency, delays::DUPLICATE_REGISTER_MS).await;
            info!(email = %email, "Registration rejected: email in use");
            return Ok(AuthResponse::failure(MSG_EMAIL_TAKEN));
        }

        let now = Utc::now();
        let name = data.display_name();
        let user = User {
            id: Uuid::new_v4().to_string(),
            role: self.roster.role_for(&email),
            email,
            name,
            kind: data.user_kind,
            city: Some(data.city),
            phone: Some(data.phone),
            is_verified: false,
            created_at: now,
            last_login: Some(now),
        };

        let user = match self.directory.insert(user).await {
            Ok(user) => user,
            Err(AppError::Conflict(_)) => {
                simulate(&self.latency, delays::DUPLICATE_REGISTER_MS).await;
                return Ok(AuthResponse::failure(MSG_EMAIL_TAKEN));
            }
            Err(e) => return Err(e),
        };

        simulate(&self.latency, delays::REGISTER_MS).await;

        let user = self.set_user(user, Tier::Durable)?;
        info!(email = %user.email, id = %user.id, "Registration succeeded");
        Ok(AuthResponse::success(MSG_REGISTERED, Some(user)))
    }

    fn logout(&self) -> AppResult<()> {
        let previous = self.current.send_replace(None);
        let cleared = self.storage.clear();
        self.navigator.navigate(NavigationTarget::to(Route::Login));

        if let Some(user) = previous {
            info!(email = %user.email, "Logged out");
        }
        cleared
    }

    fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    fn is_admin(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|user| self.roster.is_admin_email(&user.email))
    }

    fn user_role(&self) -> ViewerRole {
        let kind = match self.current.borrow().as_ref() {
            Some(user) => user.kind,
            None => return ViewerRole::Guest,
        };
        if self.is_admin() {
            ViewerRole::Admin
        } else {
            ViewerRole::Member(kind)
        }
    }

    async fn all_users(&self) -> AppResult<Vec<User>> {
        let users = self.directory.list().await?;
        debug!(count = users.len(), "Listing users");
        Ok(users)
    }

    async fn update_profile(&self, update: ProfileUpdate) -> AppResult<AuthResponse> {
        let mut user = self.current_user().ok_or(AppError::Unauthorized)?;
        user.apply(update);
        user.role = self.roster.role_for(&user.email);

        let user = self.directory.update(user).await?;
        let user = self.set_user(user, Tier::Durable)?;
        info!(email = %user.email, "Profile updated");

        simulate(&self.latency, delays::PROFILE_UPDATE_MS).await;
        Ok(AuthResponse::success(MSG_PROFILE_UPDATED, None))
    }

    async fn change_password(&self, _current: &str, _new: &str) -> AppResult<AuthResponse> {
        let user = self.current_user().ok_or(AppError::Unauthorized)?;
        info!(email = %user.email, "Changing password");

        simulate(&self.latency, delays::PASSWORD_MS).await;
        Ok(AuthResponse::success(MSG_PASSWORD_CHANGED, None))
    }

    async fn request_password_reset(&self, email: &str) -> AppResult<AuthResponse> {
        info!(email = %normalize_email(email), "Password reset requested");

        simulate(&self.latency, delays::PASSWORD_MS).await;
        Ok(AuthResponse::success(MSG_RESET_SENT, None))
    }

    async fn promote_to_admin(&self, user_id: &str) -> AppResult<AuthResponse> {
        let mut user = self.directory.find_by_id(user_id).await?.ok_or_not_found()?;

        if self.roster.grant(&user.email) {
            info!(email = %user.email, "Added to admin allow-list");
        }
        user.role = UserRole::Admin;
        let user = self.directory.update(user).await?;

        if self.is_current(user_id) {
            self.set_user(user, Tier::Durable)?;
        }

        simulate(&self.latency, delays::PROMOTE_MS).await;
        Ok(AuthResponse::success(MSG_PROMOTED, None))
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MockNavigator;
    use crate::repository::{InMemoryDirectory, MockUserDirectory};
    use crate::storage::{MemoryStore, MockKeyValueStore};
    use domain::{UserKind, DEMO_EMAIL, STORAGE_KEY_CURRENT_USER};

    fn manager_with(
        directory: Arc<dyn UserDirectory>,
        storage: SessionStorage,
        navigator: MockNavigator,
    ) -> SessionManager {
        SessionManager::new(
            directory,
            Arc::new(AdminRoster::with_defaults::<&str>(&[])),
            storage,
            Arc::new(navigator),
            LatencyConfig::disabled(),
        )
    }

    fn manager() -> SessionManager {
        manager_with(
            Arc::new(InMemoryDirectory::seeded()),
            SessionStorage::in_memory(),
            MockNavigator::new(),
        )
    }

    #[tokio::test]
    async fn test_login_existing_user_keeps_identity() {
        let service = manager();
        let response = service.login("AHMET@ornek.com", "x", false).await.unwrap();

        assert!(response.success);
        let user = response.user.unwrap();
        assert_eq!(user.id, "3");
        assert!(user.last_login.is_some());
        assert_eq!(service.user_role(), ViewerRole::Member(UserKind::Donor));
        assert!(service.storage.token(Tier::Ephemeral).unwrap().is_some());
        assert!(service.storage.token(Tier::Durable).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_email_synthesizes_and_stores() {
        let service = manager();
        service.login("new.person@x.com", "pw", true).await.unwrap();

        let users = service.all_users().await.unwrap();
        assert_eq!(users.len(), 4);
        let created = users.iter().find(|u| u.email == "new.person@x.com").unwrap();
        assert_eq!(created.name, "New.person");
        assert_eq!(created.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_is_admin_follows_allow_list() {
        let service = manager();
        assert!(!service.is_admin());
        assert_eq!(service.user_role(), ViewerRole::Guest);

        service.login(DEMO_EMAIL, "x", false).await.unwrap();
        assert!(service.is_admin());
        assert_eq!(service.user_role(), ViewerRole::Admin);

        service.login("random@x.com", "x", false).await.unwrap();
        assert!(!service.is_admin());
    }

    #[tokio::test]
    async fn test_logout_navigates_to_login() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .withf(|target| target.route == Route::Login && target.return_url.is_none())
            .times(1)
            .return_const(());

        let service = manager_with(
            Arc::new(InMemoryDirectory::seeded()),
            SessionStorage::in_memory(),
            navigator,
        );
        service.login(DEMO_EMAIL, "x", true).await.unwrap();
        service.logout().unwrap();

        assert!(!service.is_authenticated());
        assert!(service.storage.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let service = manager();
        let result = service.update_profile(ProfileUpdate::default()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));

        let result = service.change_password("a", "bcdefg").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_profile_writes_back_and_rederives_role() {
        let service = manager();
        service.login("ahmet@ornek.com", "x", false).await.unwrap();

        let update = ProfileUpdate {
            name: Some("Ahmet Yilmaz Jr".to_string()),
            email: Some("Admin@Example.com".to_string()),
            ..Default::default()
        };
        service.update_profile(update).await.unwrap();

        let current = service.current_user().unwrap();
        assert_eq!(current.email, "admin@example.com");
        assert_eq!(current.role, UserRole::Admin);

        let stored = service.directory.find_by_id("3").await.unwrap().unwrap();
        assert_eq!(stored.name, "Ahmet Yilmaz Jr");
        assert!(service.storage.token(Tier::Durable).unwrap().is_some());
        assert!(service.storage.token(Tier::Ephemeral).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_email_collision() {
        let service = manager();
        service.login("ahmet@ornek.com", "x", false).await.unwrap();

        let update = ProfileUpdate {
            email: Some(DEMO_EMAIL.to_string()),
            ..Default::default()
        };
        let result = service.update_profile(update).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(service.current_user().unwrap().email, "ahmet@ornek.com");
    }

    #[tokio::test]
    async fn test_promote_unknown_user() {
        let service = manager();
        let result = service.promote_to_admin("999").await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_promote_current_user_republishes() {
        let service = manager();
        service.login("ahmet@ornek.com", "x", false).await.unwrap();
        let rx = service.subscribe();

        service.promote_to_admin("3").await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert!(service.is_admin());
        assert!(service.roster.is_admin_email("ahmet@ornek.com"));
        assert!(service.storage.token(Tier::Durable).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_directory_failure_propagates() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_by_email()
            .returning(|_| Err(AppError::internal("directory offline")));

        let service = manager_with(
            Arc::new(directory),
            SessionStorage::in_memory(),
            MockNavigator::new(),
        );
        let result = service.login("a@x.com", "x", false).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(!service.is_authenticated());
    }

    fn failing_tier() -> MockKeyValueStore {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .returning(|_, _| Err(AppError::storage("quota exceeded")));
        store.expect_remove().returning(|_| Ok(()));
        store
    }

    #[tokio::test]
    async fn test_failed_persist_does_not_sign_in() {
        let storage = SessionStorage::new(Arc::new(MemoryStore::new()), Arc::new(failing_tier()));
        let service = manager_with(
            Arc::new(InMemoryDirectory::seeded()),
            storage,
            MockNavigator::new(),
        );
        let rx = service.subscribe();

        let result = service.login("ahmet@ornek.com", "x", false).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(!service.is_authenticated());
        assert!(service.current_user().is_none());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_previous_identity() {
        let storage = SessionStorage::new(Arc::new(failing_tier()), Arc::new(MemoryStore::new()));
        let service = manager_with(
            Arc::new(InMemoryDirectory::seeded()),
            storage,
            MockNavigator::new(),
        );
        service.login("ahmet@ornek.com", "x", false).await.unwrap();

        let update = ProfileUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let result = service.update_profile(update).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(service.current_user().unwrap().name, "Ahmet Yilmaz");
    }

    #[test]
    fn test_restore_rederives_role_and_clears_corrupt_record() {
        let storage = SessionStorage::in_memory();
        let mut stored = synthesize_identity("someone@x.com");
        stored.role = UserRole::Admin;
        storage.persist(&stored, Tier::Durable).unwrap();

        let service = manager_with(
            Arc::new(InMemoryDirectory::new()),
            storage.clone(),
            MockNavigator::new(),
        );
        assert_eq!(service.current_user().unwrap().role, UserRole::User);

        storage
            .tier(Tier::Durable)
            .set(STORAGE_KEY_CURRENT_USER, "not json")
            .unwrap();
        let service = manager_with(
            Arc::new(InMemoryDirectory::new()),
            storage.clone(),
            MockNavigator::new(),
        );
        assert!(!service.is_authenticated());
        assert!(storage.token(Tier::Durable).unwrap().is_none());
    }
}

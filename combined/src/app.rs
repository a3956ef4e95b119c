//! Wires the services together and runs CLI commands against them.
//!
//! Every message meant for the user goes through the notice board, the
//! same channel the route guards publish on, and is printed by `flush`.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::Receiver;
use tracing::info;

use catalog_service_lib::config::CatalogServiceConfig;
use catalog_service_lib::query::{category_counts, ProductQuery};
use catalog_service_lib::service::CatalogService;
use catalog_service_lib::CatalogComponents;
use common::{AppError, AppResult, LatencyConfig};
use domain::forms::{check, LOGIN_FORM_RULES};
use domain::product::PRODUCT_FORM_RULES;
use domain::settings::AdminSettings;
use domain::{
    AgeGroup, AuthResponse, Donor, LoginForm, NavigationTarget, Product, ProductCategory,
    ProductCondition, ProductForm, RegistrationForm, ShippingAddress, User, DEMO_EMAIL,
};
use guards_lib::{route_gate, GuardDecision, Notice, NoticeBoard, NoticeLevel, RouteGate};
use session_service_lib::config::SessionServiceConfig;
use session_service_lib::navigation::NavigationHistory;
use session_service_lib::roster::AdminRoster;
use session_service_lib::service::{SessionManager, SessionService};
use session_service_lib::settings_store::SettingsStore;
use session_service_lib::SessionComponents;

use crate::cli::{CatalogArgs, LoginArgs, RegisterArgs, SettingsCommand};

/// Everything a command needs
pub struct App {
    session: Arc<SessionManager>,
    roster: Arc<AdminRoster>,
    navigator: Arc<NavigationHistory>,
    settings: SettingsStore,
    catalog: CatalogComponents,
    notices: NoticeBoard,
    inbox: Mutex<Receiver<Notice>>,
    gate: RouteGate,
}

impl App {
    pub async fn build(
        session_config: SessionServiceConfig,
        catalog_config: CatalogServiceConfig,
    ) -> AppResult<Self> {
        let SessionComponents {
            service,
            roster,
            navigator,
            settings,
            ..
        } = session_service_lib::bootstrap(&session_config).await?;
        let catalog = catalog_service_lib::bootstrap(&catalog_config);
        let notices = NoticeBoard::new();
        let inbox = Mutex::new(notices.subscribe());
        let gate = route_gate(service.clone(), navigator.clone(), notices.clone());

        Ok(Self {
            session: service,
            roster,
            navigator,
            settings,
            catalog,
            notices,
            inbox,
            gate,
        })
    }

    /// Print every notice published so far
    pub fn flush(&self) {
        let mut inbox = self
            .inbox
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for notice in std::iter::from_fn(|| inbox.try_recv().ok()) {
            let tag = match notice.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Warning => "warning",
                NoticeLevel::Error => "error",
            };
            println!("[{}] {}", tag, notice.message);
        }
    }

    /// Publish a failed command and print what is queued
    pub fn report(&self, error: &AppError) {
        self.notices.publish(Notice::from_error(error));
        self.flush();
    }

    fn announce(&self, response: &AuthResponse) {
        let notice = if response.success {
            Notice::info(&response.message)
        } else {
            Notice::warning(&response.message)
        };
        self.notices.publish(notice);
    }

    pub async fn login(&self, args: LoginArgs) -> AppResult<()> {
        let form = LoginForm {
            email: args.email,
            password: args.password,
            remember_me: args.remember_me,
        };
        check(&form, LOGIN_FORM_RULES)?;

        let response = self
            .session
            .login(&form.email, &form.password, form.remember_me)
            .await?;
        self.announce(&response);
        if let Some(user) = response.user {
            print_user(&user, &self.session.user_role().to_string());
        }

        let back = args
            .from
            .as_deref()
            .and_then(|url| NavigationTarget::parse(url).return_url);
        if let Some(back) = back {
            self.visit(&back)?;
        }
        Ok(())
    }

    pub async fn register(&self, args: RegisterArgs) -> AppResult<()> {
        let form = RegistrationForm {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            password: args.password,
            confirm_password: args.confirm_password,
            phone: args.phone,
            city: args.city,
            user_kind: args.kind,
            accept_terms: args.accept_terms,
        };
        let data = form.into_register_data()?;

        let response = self.session.register(data).await?;
        self.announce(&response);
        if let Some(user) = response.user {
            print_user(&user, &self.session.user_role().to_string());
        }
        Ok(())
    }

    pub fn logout(&self) -> AppResult<()> {
        self.session.logout()?;
        self.notices.publish(Notice::info("Signed out."));
        Ok(())
    }

    pub fn whoami(&self) -> AppResult<()> {
        match self.session.current_user() {
            Some(user) => print_user(&user, &self.session.user_role().to_string()),
            None => println!("Not signed in (guest)."),
        }
        Ok(())
    }

    pub fn visit(&self, path: &str) -> AppResult<()> {
        if let GuardDecision::Redirect { reason, .. } = self.gate.visit(path) {
            info!(?reason, "Navigation refused");
        }
        self.flush();
        if let Some(current) = self.navigator.current() {
            println!("{} -> {} ({})", path, current.url(), current.route.title());
        }
        Ok(())
    }

    pub async fn catalog(&self, args: CatalogArgs) -> AppResult<()> {
        let service = &self.catalog.service;
        let products = if args.urgent {
            service.get_urgent_products().await?
        } else if args.recent {
            service.get_new_products().await?
        } else {
            service
                .search(ProductQuery {
                    category: args.category,
                    condition: args.condition,
                    text: args.search,
                    sort: args.sort,
                })
                .await?
        };

        if products.is_empty() {
            println!("No products found.");
        }
        for product in &products {
            print_product(product);
        }

        if args.stats {
            let stats = service.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            for (category, count) in category_counts(&products) {
                println!("{:<16} {}", category.label(), count);
            }
        }
        Ok(())
    }

    pub async fn users(&self) -> AppResult<()> {
        for user in self.session.all_users().await? {
            println!(
                "{:<38} {:<32} {:<24} {}",
                user.id, user.email, user.name, user.role
            );
        }
        println!("Admin allow-list: {}", self.roster.emails().join(", "));
        Ok(())
    }

    pub async fn promote(&self, user_id: &str) -> AppResult<()> {
        let response = self.session.promote_to_admin(user_id).await?;
        self.announce(&response);
        Ok(())
    }

    /// Moderation settings, behind the admin guard
    pub fn settings(&self, command: SettingsCommand) -> AppResult<()> {
        let (_, decision) = self.gate.evaluate("/admin");
        if !decision.is_allowed() {
            self.flush();
            return Ok(());
        }

        let settings = match command {
            SettingsCommand::Show => self.settings.load::<AdminSettings>(),
            SettingsCommand::Set {
                auto_approve,
                max_daily_donations,
                email_notifications,
            } => {
                let mut settings: AdminSettings = self.settings.load();
                if let Some(value) = auto_approve {
                    settings.auto_approve = value;
                }
                if let Some(value) = max_daily_donations {
                    settings.max_daily_donations = value;
                }
                if let Some(value) = email_notifications {
                    settings.email_notifications = value;
                }
                self.settings.save(&settings)?;
                self.notices.publish(Notice::info("Settings saved."));
                settings
            }
            SettingsCommand::Reset => {
                self.settings.reset::<AdminSettings>()?;
                self.notices.publish(Notice::info("Settings restored to defaults."));
                self.settings.load()
            }
        };
        println!("{}", serde_json::to_string_pretty(&settings)?);
        Ok(())
    }

    /// Sign in as the demo admin, submit and moderate a listing, reserve it
    /// as a recipient, ship and deliver it, then sign out.
    pub async fn demo(&self) -> AppResult<()> {
        let workflow = &self.catalog.workflow;
        let service = &self.catalog.service;

        println!("== Guest");
        self.visit("/admin")?;

        println!("== Demo admin signs in");
        let response = self.session.login(DEMO_EMAIL, "demo", false).await?;
        self.announce(&response);
        self.whoami()?;
        self.visit("/admin")?;

        println!("== Submitting a listing");
        let donor = self.session.current_user().map(|user| Donor::from(&user));
        let form = ProductForm {
            name: "Wooden Train Set".to_string(),
            description: "Thirty piece wooden train set with tracks and a bridge.".to_string(),
            category: ProductCategory::Toys,
            condition: ProductCondition::LikeNew,
            age_group: AgeGroup::Toddler,
            images: vec!["train-set.jpg".to_string()],
            is_urgent: false,
            notes: None,
            donor,
            accept_terms: true,
        };
        check(&form, PRODUCT_FORM_RULES)?;
        let product = service.add_product(form).await?;
        print_product(&product);

        let moderation: AdminSettings = self.settings.load();
        let product = if moderation.auto_approve {
            println!("Auto-approve is on");
            product
        } else {
            workflow.approve(&product.id).await?
        };
        print_product(&product);

        println!("== A recipient requests it");
        self.session.logout()?;
        let response = self
            .session
            .login("recipient@example.com", "demo", false)
            .await?;
        self.announce(&response);
        self.whoami()?;
        if let Some(recipient) = self.session.current_user() {
            let reserved = workflow.request(&product.id, &recipient.id).await?;
            print_product(&reserved);

            let address = ShippingAddress {
                full_name: recipient.name.clone(),
                address: "Cumhuriyet Cd. 1".to_string(),
                city: recipient.city.clone().unwrap_or_default(),
                district: "Merkez".to_string(),
                phone: recipient.phone.clone().unwrap_or_default(),
                email: recipient.email.clone(),
            };
            let shipped = workflow.ship(&product.id, address, "TRK-0001").await?;
            print_product(&shipped);
            let delivered = workflow.confirm_delivery(&product.id).await?;
            print_product(&delivered);
        }
        self.visit("/admin")?;

        println!("== Catalog");
        let stats = service.stats().await?;
        println!("{}", serde_json::to_string_pretty(&stats)?);

        self.logout()?;
        self.flush();
        self.whoami()?;
        Ok(())
    }
}

fn print_user(user: &User, role: &str) {
    println!(
        "{} <{}> id={} role={} city={} verified={}",
        user.name,
        user.email,
        user.id,
        role,
        user.city.as_deref().unwrap_or("-"),
        user.is_verified
    );
}

fn print_product(product: &Product) {
    println!(
        "{:<38} {:<28} {:<16} {:<16} {}{}{}",
        product.id,
        product.name,
        product.category.label(),
        product.status.label(),
        product.donor_city,
        product
            .tracking_number
            .as_deref()
            .map(|t| format!("  tracking={}", t))
            .unwrap_or_default(),
        if product.is_urgent { "  URGENT" } else { "" }
    );
}

/// Latency override from the `--no-latency` flag
pub fn latency(disabled: bool) -> LatencyConfig {
    if disabled {
        LatencyConfig::disabled()
    } else {
        LatencyConfig::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    async fn app() -> App {
        let session = SessionServiceConfig {
            latency: LatencyConfig::disabled(),
            ..Default::default()
        };
        let catalog = CatalogServiceConfig {
            latency: LatencyConfig::disabled(),
            ..Default::default()
        };
        App::build(session, catalog).await.unwrap()
    }

    fn set_auto_approve() -> SettingsCommand {
        SettingsCommand::Set {
            auto_approve: Some(true),
            max_daily_donations: Some(10),
            email_notifications: None,
        }
    }

    #[tokio::test]
    async fn test_settings_refused_for_guest() {
        let app = app().await;
        let mut rx = app.notices.subscribe();

        app.settings(set_auto_approve()).unwrap();

        assert_eq!(app.settings.load::<AdminSettings>(), AdminSettings::default());
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_settings_saved_and_reset_by_admin() {
        let app = app().await;
        app.session.login(DEMO_EMAIL, "demo", false).await.unwrap();

        app.settings(set_auto_approve()).unwrap();
        let saved: AdminSettings = app.settings.load();
        assert!(saved.auto_approve);
        assert_eq!(saved.max_daily_donations, 10);
        assert!(saved.email_notifications);

        app.settings(SettingsCommand::Reset).unwrap();
        assert_eq!(app.settings.load::<AdminSettings>(), AdminSettings::default());
    }

    #[tokio::test]
    async fn test_report_publishes_error_notice() {
        let app = app().await;
        let mut rx = app.notices.subscribe();

        app.report(&AppError::NotFound);

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, AppError::NotFound.user_message());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_login_continues_to_return_url() {
        let app = app().await;
        let args = LoginArgs {
            email: DEMO_EMAIL.to_string(),
            password: "demo".to_string(),
            remember_me: false,
            from: Some("/login?returnUrl=%2Fadmin".to_string()),
        };

        app.login(args).await.unwrap();

        let current = app.navigator.current().unwrap();
        assert_eq!(current.url(), "/admin");
    }
}

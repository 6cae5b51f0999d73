//! Session adapter between user actions and the controller
//!
//! [`SessionApp`] turns each user action into controller calls, renders the
//! resulting views and reports every failure as a notification. Nothing it
//! exposes returns an error.

use moneta_utils::MoneyFormat;

use crate::controller::{RefreshReport, TransactionController};
use crate::error::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::models::{FilterState, TransactionType, User};
use crate::notify::{Notification, Notifier};
use crate::types::Category;
use crate::validation::{LoginForm, ProfileForm, RegisterForm, TransactionForm, TypeForm};
use crate::view::{DashboardView, TransactionListView, TypeListView};

/// The UI layer
pub trait Renderer {
    fn show_login(&mut self);
    fn show_main(&mut self, user: &User);
    fn render_dashboard(&mut self, view: &DashboardView);
    fn render_transactions(&mut self, view: &TransactionListView);
    /// `choices` are the types offered by the type filter
    fn render_types(&mut self, view: &TypeListView, choices: &[TransactionType]);
    fn render_user(&mut self, user: &User);
    fn notify(&mut self, notification: &Notification);
}

pub struct SessionApp<R: Renderer> {
    controller: TransactionController,
    renderer: R,
    notifier: Notifier,
    format: MoneyFormat,
    logger: DefaultErrorLogger,
}

impl<R: Renderer> SessionApp<R> {
    pub fn new(controller: TransactionController, renderer: R, notifier: Notifier, format: MoneyFormat) -> Self {
        Self {
            controller,
            renderer,
            notifier,
            format,
            logger: DefaultErrorLogger,
        }
    }

    pub fn controller(&self) -> &TransactionController {
        &self.controller
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn format(&self) -> &MoneyFormat {
        &self.format
    }

    // ==================== Rendering ====================

    pub fn render_dashboard(&mut self) {
        let view = self.controller.dashboard(&self.format);
        self.renderer.render_dashboard(&view);
    }

    pub fn render_transactions(&mut self) {
        let view = self.controller.transaction_list(&self.format);
        self.renderer.render_transactions(&view);
    }

    pub fn render_types(&mut self) {
        let view = self.controller.type_list();
        let choices = self.controller.type_choices();
        self.renderer.render_types(&view, &choices);
    }

    pub fn render_all(&mut self) {
        self.render_dashboard();
        self.render_transactions();
        self.render_types();
    }

    fn notify(&mut self, notification: Notification) {
        self.renderer.notify(&notification);
    }

    /// Log and report an error. A rejected token also ends the session.
    fn fail(&mut self, error: CoreError, operation: &str, fallback: &str) {
        self.fail_in(error, ErrorContext::new(operation), fallback);
    }

    fn fail_in(&mut self, error: CoreError, context: ErrorContext, fallback: &str) {
        let context = context.with_user_id(self.controller.user().map(|u| u.id));
        self.logger.log_error(&error, &context);

        let notification = self.notifier.from_error(&error, fallback);
        if error == CoreError::SessionExpired {
            self.logger.log_warning("Session expired, returning to login", &context);
            self.controller.logout();
            self.renderer.show_login();
        }
        self.notify(notification);
    }

    /// Report failures of a refresh; returns false when one failed
    fn report(&mut self, report: RefreshReport, operation: &str) -> bool {
        let mut ok = true;
        let results = [
            ("transactions", Some(report.transactions)),
            ("balance", Some(report.balance)),
            ("types", report.types),
        ];
        for (reload, result) in results {
            if let Some(Err(error)) = result {
                ok = false;
                let expired = error == CoreError::SessionExpired;
                let context = ErrorContext::new(operation).with_data("reload", serde_json::json!(reload));
                self.fail_in(error, context, "Could not refresh data");
                if expired {
                    return false;
                }
            }
        }
        ok
    }

    async fn enter_main(&mut self, user: User) {
        self.renderer.show_main(&user);
        self.renderer.render_user(&user);
        match self.controller.load_user_data().await {
            Ok(report) => {
                self.report(report, "load_user_data");
            }
            Err(e) => self.fail(e, "load_user_data", "Could not load your data"),
        }
        if self.controller.user().is_some() {
            self.render_all();
        }
    }

    // ==================== Session ====================

    /// Resume a stored session or ask for credentials
    pub async fn start(&mut self) {
        match self.controller.restore().await {
            Ok(Some(user)) => self.enter_main(user).await,
            Ok(None) => {
                self.logger.log_debug("No stored session token", &ErrorContext::new("start"));
                self.renderer.show_login();
            }
            Err(e) => {
                let expired = e == CoreError::SessionExpired;
                self.fail(e, "start", "Could not restore your session");
                if !expired {
                    self.renderer.show_login();
                }
            }
        }
    }

    pub async fn login(&mut self, form: &LoginForm) -> bool {
        let result = match form.validate() {
            Ok((email, password)) => self.controller.login(&email, &password).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(user) => {
                self.notify(self.notifier.success("Login successful!"));
                self.enter_main(user).await;
                true
            }
            Err(e) => {
                self.fail(e, "login", "Could not log in");
                false
            }
        }
    }

    pub async fn register(&mut self, form: &RegisterForm) -> bool {
        let result = match form.validate() {
            Ok((name, email, password)) => self.controller.register(&name, &email, &password).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(user) => {
                self.notify(self.notifier.success("Account created successfully!"));
                self.enter_main(user).await;
                true
            }
            Err(e) => {
                self.fail(e, "register", "Could not create the account");
                false
            }
        }
    }

    pub fn logout(&mut self) {
        self.controller.logout();
        self.renderer.show_login();
        self.notify(self.notifier.info("You have been logged out"));
    }

    pub async fn update_profile(&mut self, form: &ProfileForm) -> bool {
        match self.controller.update_profile(form).await {
            Ok(user) => {
                self.renderer.render_user(&user);
                self.notify(self.notifier.success("Profile updated successfully!"));
                true
            }
            Err(e) => {
                self.fail(e, "update_profile", "Could not update the profile");
                false
            }
        }
    }

    /// Reload transactions and balance on demand
    pub async fn refresh(&mut self) -> bool {
        let ok = match self.controller.refresh().await {
            Ok(report) => self.report(report, "refresh"),
            Err(e) => {
                self.fail(e, "refresh", "Could not refresh data");
                false
            }
        };
        if self.controller.user().is_some() {
            self.render_dashboard();
            self.render_transactions();
        }
        ok
    }

    // ==================== Filters & pagination ====================

    fn render_list(&mut self) {
        self.render_dashboard();
        self.render_transactions();
    }

    pub fn apply_filter(&mut self, filter: FilterState) {
        self.controller.apply_filter(filter);
        self.render_list();
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.controller.set_category(category);
        self.render_types();
        self.render_list();
    }

    pub fn set_transaction_type(&mut self, transaction_type_id: Option<i64>) {
        self.controller.set_transaction_type(transaction_type_id);
        self.render_list();
    }

    pub fn clear_filters(&mut self) {
        self.controller.clear_filters();
        self.render_types();
        self.render_list();
    }

    /// Reveal one more page; returns the number of rows added
    pub fn load_more(&mut self) -> usize {
        let added = self.controller.load_more();
        if added > 0 {
            self.render_transactions();
        }
        added
    }

    // ==================== Mutations ====================

    pub async fn save_transaction(&mut self, form: &TransactionForm) -> bool {
        match self.controller.save_transaction(form).await {
            Ok((_, report)) => {
                let message = if form.id.is_some() {
                    "Transaction updated successfully!"
                } else {
                    "Transaction created successfully!"
                };
                self.notify(self.notifier.success(message));
                self.report(report, "save_transaction");
                self.render_list();
                true
            }
            Err(e) => {
                self.fail(e, "save_transaction", "Could not save the transaction");
                false
            }
        }
    }

    pub async fn delete_transaction(&mut self, id: i64) -> bool {
        match self.controller.delete_transaction(id).await {
            Ok(report) => {
                self.notify(self.notifier.success("Transaction deleted successfully!"));
                self.report(report, "delete_transaction");
                self.render_list();
                true
            }
            Err(e) => {
                self.fail(e, "delete_transaction", "Could not delete the transaction");
                false
            }
        }
    }

    pub async fn save_type(&mut self, form: &TypeForm) -> bool {
        match self.controller.save_type(form).await {
            Ok((_, report)) => {
                let message = if form.id.is_some() {
                    "Transaction type updated successfully!"
                } else {
                    "Transaction type created successfully!"
                };
                self.notify(self.notifier.success(message));
                self.report(report, "save_type");
                if self.controller.user().is_some() {
                    self.render_all();
                }
                true
            }
            Err(e) => {
                self.fail(e, "save_type", "Could not save the transaction type");
                false
            }
        }
    }

    pub async fn delete_type(&mut self, id: i64) -> bool {
        match self.controller.delete_type(id).await {
            Ok(report) => {
                self.notify(self.notifier.success("Transaction type deleted successfully!"));
                self.report(report, "delete_type");
                if self.controller.user().is_some() {
                    self.render_all();
                }
                true
            }
            Err(e) => {
                self.fail(e, "delete_type", "Could not delete the transaction type");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::memory::{InMemoryGateway, Operation};
    use crate::notify::NotificationLevel;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Login,
        Main(i64),
        Dashboard(DashboardView),
        Transactions(usize),
        Types(usize),
        User(String),
        Notify(NotificationLevel, String),
    }

    #[derive(Default)]
    struct RecordingRenderer {
        events: Vec<Event>,
    }

    impl RecordingRenderer {
        fn notifications(&self) -> Vec<(NotificationLevel, String)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Notify(level, message) => Some((*level, message.clone())),
                    _ => None,
                })
                .collect()
        }

        fn last_dashboard(&self) -> Option<&DashboardView> {
            self.events.iter().rev().find_map(|e| match e {
                Event::Dashboard(view) => Some(view),
                _ => None,
            })
        }
    }

    impl Renderer for RecordingRenderer {
        fn show_login(&mut self) {
            self.events.push(Event::Login);
        }
        fn show_main(&mut self, user: &User) {
            self.events.push(Event::Main(user.id));
        }
        fn render_dashboard(&mut self, view: &DashboardView) {
            self.events.push(Event::Dashboard(view.clone()));
        }
        fn render_transactions(&mut self, view: &TransactionListView) {
            self.events.push(Event::Transactions(view.rows.len()));
        }
        fn render_types(&mut self, view: &TypeListView, _choices: &[TransactionType]) {
            self.events.push(Event::Types(view.income.len() + view.expense.len()));
        }
        fn render_user(&mut self, user: &User) {
            self.events.push(Event::User(user.name.clone()));
        }
        fn notify(&mut self, notification: &Notification) {
            self.events
                .push(Event::Notify(notification.level, notification.message.clone()));
        }
    }

    fn app(gateway: &Arc<InMemoryGateway>) -> SessionApp<RecordingRenderer> {
        let controller = TransactionController::new(gateway.clone(), 10);
        SessionApp::new(
            controller,
            RecordingRenderer::default(),
            Notifier::default(),
            MoneyFormat::default(),
        )
    }

    fn login_form() -> LoginForm {
        LoginForm {
            email: "ana@example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    fn seeded() -> (Arc<InMemoryGateway>, i64, i64) {
        let gateway = Arc::new(InMemoryGateway::new());
        let user_id = gateway.add_user("Ana", "ana@example.com", "secret1");
        let food = gateway.add_type("Food", Category::Expense);
        gateway.add_type("Salary", Category::Income);
        (gateway, user_id, food.id)
    }

    #[tokio::test]
    async fn test_start_without_token_shows_login() {
        let (gateway, _, _) = seeded();
        let mut app = app(&gateway);
        app.start().await;
        assert_eq!(app.renderer().events, vec![Event::Login]);
    }

    #[tokio::test]
    async fn test_login_renders_main_screen() {
        let (gateway, user_id, food) = seeded();
        gateway.add_transaction(user_id, food, dec!(15)).unwrap();
        let mut app = app(&gateway);

        assert!(app.login(&login_form()).await);

        let events = &app.renderer().events;
        assert!(events.contains(&Event::Main(user_id)));
        assert!(events.contains(&Event::Transactions(1)));
        assert!(events.contains(&Event::Types(2)));
        assert_eq!(
            app.renderer().notifications(),
            vec![(NotificationLevel::Success, "Login successful!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_bad_credentials_stay_on_form() {
        let (gateway, _, _) = seeded();
        let mut app = app(&gateway);
        let form = LoginForm {
            password: "wrong".to_string(),
            ..login_form()
        };

        assert!(!app.login(&form).await);
        let events = &app.renderer().events;
        assert!(!events.contains(&Event::Login));
        assert_eq!(
            app.renderer().notifications(),
            vec![(NotificationLevel::Error, "Incorrect email or password".to_string())]
        );
    }

    #[tokio::test]
    async fn test_validation_error_skips_gateway() {
        let (gateway, _, _) = seeded();
        let mut app = app(&gateway);
        let form = LoginForm {
            email: "not-an-email".to_string(),
            ..login_form()
        };

        assert!(!app.login(&form).await);
        assert_eq!(gateway.calls(Operation::Login), 0);
    }

    #[tokio::test]
    async fn test_register_then_auto_login() {
        let gateway = Arc::new(InMemoryGateway::new());
        let mut app = app(&gateway);
        let form = RegisterForm {
            name: "Bia".to_string(),
            email: "bia@example.com".to_string(),
            password: "secret1".to_string(),
        };

        assert!(app.register(&form).await);
        assert!(app.controller().user().is_some());
        assert!(app.renderer().events.contains(&Event::User("Bia".to_string())));
    }

    #[tokio::test]
    async fn test_session_expiry_forces_login() {
        let (gateway, _, food) = seeded();
        let mut app = app(&gateway);
        app.login(&login_form()).await;
        gateway.expire_session();

        let form = TransactionForm {
            id: None,
            transaction_type_id: Some(food),
            value: dec!(10),
        };
        assert!(!app.save_transaction(&form).await);

        assert_eq!(app.renderer().events.last(), Some(&Event::Notify(
            NotificationLevel::Error,
            "Session expired. Please log in again.".to_string()
        )));
        assert!(app.renderer().events.contains(&Event::Login));
        assert!(app.controller().user().is_none());
        assert!(app.controller().store().is_empty());
    }

    #[tokio::test]
    async fn test_balance_failure_is_reported_and_figures_kept() {
        let (gateway, user_id, food) = seeded();
        gateway.add_transaction(user_id, food, dec!(100)).unwrap();
        let mut app = app(&gateway);
        app.login(&login_form()).await;
        let before = app.renderer().last_dashboard().cloned().unwrap();

        gateway.fail(
            Operation::Balance,
            GatewayError::http(500, "Internal Server Error", serde_json::Value::Null),
        );
        let form = TransactionForm {
            id: None,
            transaction_type_id: Some(food),
            value: dec!(20),
        };
        assert!(app.save_transaction(&form).await);

        let notifications = app.renderer().notifications();
        assert!(notifications.contains(&(NotificationLevel::Success, "Transaction created successfully!".to_string())));
        assert!(notifications.contains(&(NotificationLevel::Error, "Internal server error. Try again later.".to_string())));

        let after = app.renderer().last_dashboard().unwrap();
        assert_eq!(after.figures, before.figures);
        assert_eq!(after.total_count, 2);
    }

    #[tokio::test]
    async fn test_types_failure_still_shows_transactions() {
        let (gateway, user_id, food) = seeded();
        gateway.add_transaction(user_id, food, dec!(15)).unwrap();
        gateway.fail(
            Operation::ListTypes,
            GatewayError::http(500, "Internal Server Error", serde_json::Value::Null),
        );
        let mut app = app(&gateway);

        assert!(app.login(&login_form()).await);

        let events = &app.renderer().events;
        assert!(events.contains(&Event::Transactions(1)));
        assert!(events.contains(&Event::Types(0)));
        assert_eq!(app.renderer().last_dashboard().map(|d| d.total_count), Some(1));
        assert_eq!(
            app.renderer().notifications(),
            vec![
                (NotificationLevel::Success, "Login successful!".to_string()),
                (NotificationLevel::Error, "Internal server error. Try again later.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_type_conflict_is_a_warning() {
        let (gateway, user_id, food) = seeded();
        gateway.add_transaction(user_id, food, dec!(5)).unwrap();
        let mut app = app(&gateway);
        app.login(&login_form()).await;

        assert!(!app.delete_type(food).await);

        let (level, message) = app.renderer().notifications().pop().unwrap();
        assert_eq!(level, NotificationLevel::Warning);
        assert_eq!(message, "Cannot delete transaction type with associated transactions");
        assert_eq!(app.controller().types().len(), 2);
    }

    #[tokio::test]
    async fn test_load_more_renders_only_when_rows_added() {
        let (gateway, user_id, food) = seeded();
        for _ in 0..12 {
            gateway.add_transaction(user_id, food, dec!(1)).unwrap();
        }
        let mut app = app(&gateway);
        app.login(&login_form()).await;

        assert_eq!(app.load_more(), 2);
        assert_eq!(app.renderer().events.last(), Some(&Event::Transactions(12)));

        let count = app.renderer().events.len();
        assert_eq!(app.load_more(), 0);
        assert_eq!(app.renderer().events.len(), count);
    }

    #[tokio::test]
    async fn test_filter_updates_dashboard_count() {
        let (gateway, user_id, food) = seeded();
        gateway.add_transaction(user_id, food, dec!(1)).unwrap();
        let mut app = app(&gateway);
        app.login(&login_form()).await;

        app.set_category(Some(Category::Income));
        let dashboard = app.renderer().last_dashboard().unwrap();
        assert_eq!(dashboard.filtered_count, 0);
        assert_eq!(dashboard.total_count, 1);

        app.clear_filters();
        assert_eq!(app.renderer().last_dashboard().unwrap().filtered_count, 1);
    }

    #[tokio::test]
    async fn test_logout() {
        let (gateway, _, _) = seeded();
        let mut app = app(&gateway);
        app.login(&login_form()).await;

        app.logout();
        assert_eq!(app.renderer().events.last(), Some(&Event::Notify(
            NotificationLevel::Info,
            "You have been logged out".to_string()
        )));
        assert!(app.controller().user().is_none());
    }

    #[tokio::test]
    async fn test_profile_update_renders_user() {
        let (gateway, _, _) = seeded();
        let mut app = app(&gateway);
        app.login(&login_form()).await;

        let form = ProfileForm {
            name: "Ana Maria".to_string(),
            email: "ana@example.com".to_string(),
            ..ProfileForm::default()
        };
        assert!(app.update_profile(&form).await);
        assert!(app.renderer().events.contains(&Event::User("Ana Maria".to_string())));
    }
}

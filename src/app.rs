use crate::banking::{CurrencyAggregator, Customer, NumberFormat};
use crate::config::AppConfig;
use crate::services::api::{AccountsClient, ApiClientConfig, AuthContext};
use crate::services::session::{GuestReason, SessionLookup, SessionStore};
use crate::ui::{
    apply_theme, render_dashboard, CaptureDeferral, CaptureOutcome, ClassPalette, DashboardState,
    DashboardView, Notice, NoticeKind, RenderContext, StyleTree, ViewAction,
};
use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use eframe::{egui, App, CreationContext, NativeOptions};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tokio::runtime::Runtime;

pub fn run(config: AppConfig) -> Result<()> {
    let shared_config = Arc::new(config);
    let app_name = shared_config.application_name.clone();
    let native_options = NativeOptions::default();

    eframe::run_native(
        &app_name,
        native_options,
        Box::new(move |cc| Ok(Box::new(BankLensApp::new(cc, shared_config.clone())))),
    )
    .map_err(|err| anyhow!(err.to_string()))
}

struct BankLensApp {
    config: Arc<AppConfig>,
    aggregator: CurrencyAggregator,
    number_format: NumberFormat,
    dashboard_state: DashboardState,
    view: DashboardView,
    style_tree: Option<StyleTree>,
    capture: Option<CaptureDeferral>,
    command_tx: Sender<AppCommand>,
    event_rx: Receiver<AppEvent>,
    status: Option<Notice>,
    worker_failed: bool,
    event_log: Vec<LogEntry>,
}

impl BankLensApp {
    fn new(cc: &CreationContext<'_>, config: Arc<AppConfig>) -> Self {
        apply_theme(&cc.egui_ctx, config.dark_mode);

        let (command_tx, command_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        spawn_background_worker(config.clone(), command_rx, event_tx);

        let number_format = config.number_format();
        let mut app = Self {
            config,
            aggregator: CurrencyAggregator::default(),
            number_format,
            dashboard_state: DashboardState::new(),
            view: DashboardView::new(),
            style_tree: None,
            capture: None,
            command_tx,
            event_rx,
            status: None,
            worker_failed: false,
            event_log: Vec::new(),
        };
        app.request_refresh();
        app
    }

    fn request_refresh(&mut self) {
        self.dashboard_state.set_loading();
        self.push_log(LogLevel::Info, "Refreshing accounts.");
        if let Err(err) = self.command_tx.send(AppCommand::RefreshDashboard) {
            self.worker_failed = true;
            self.set_status(Notice::error("Refresh failed", format!("Unable to schedule refresh: {err}")));
        }
    }

    fn set_status(&mut self, notice: Notice) {
        let level = match notice.kind {
            NoticeKind::Success => LogLevel::Info,
            NoticeKind::Error => LogLevel::Error,
        };
        self.push_log(level, format!("{}: {}", notice.title, notice.description));
        self.status = Some(notice);
    }

    fn push_log(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message.into());
        self.event_log.push(entry);
        const MAX_LOG_ENTRIES: usize = 200;
        if self.event_log.len() > MAX_LOG_ENTRIES {
            let surplus = self.event_log.len() - MAX_LOG_ENTRIES;
            self.event_log.drain(0..surplus);
        }
    }

    fn consume_events(&mut self) {
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => self.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.worker_failed {
                        self.worker_failed = true;
                        self.push_log(
                            LogLevel::Error,
                            "Background worker disconnected. Restart the application after checking logs.",
                        );
                    }
                    break;
                }
            }
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        let report = apply_event(&mut self.dashboard_state, event);
        for (level, message) in report.logs {
            self.push_log(level, message);
        }
        if let Some(notice) = report.notice {
            self.set_status(notice);
        }
        if report.worker_failed {
            self.worker_failed = true;
        }
    }

    /// Mounts the style tree after the first frame and captures the baseline
    /// once the deferral has elapsed.
    fn drive_capture(&mut self, ctx: &egui::Context) {
        if self.style_tree.is_none() {
            let background = self.view.styles().current_background().clone();
            self.style_tree = Some(StyleTree::dashboard_layout(background.as_str()));
            self.capture = Some(CaptureDeferral::schedule(
                Instant::now(),
                self.config.capture_delay(),
            ));
        }

        let Some(deferral) = self.capture.as_mut() else {
            return;
        };
        let now = Instant::now();
        if deferral.take_if_due(now) {
            let outcome = self
                .view
                .styles_mut()
                .capture_baseline(self.style_tree.as_mut(), &ClassPalette);
            match outcome {
                CaptureOutcome::Captured { elements } => {
                    self.capture = None;
                    if let Some(snapshot) = self.view.styles().snapshot() {
                        match serde_json::to_string(snapshot) {
                            Ok(baseline) => tracing::trace!(%baseline, "style baseline"),
                            Err(err) => tracing::warn!(%err, "could not serialize style baseline"),
                        }
                    }
                    self.push_log(LogLevel::Info, format!("Captured original styles of {elements} elements."));
                }
                CaptureOutcome::AlreadyCaptured => self.capture = None,
                CaptureOutcome::RootMissing => {
                    self.capture = Some(CaptureDeferral::schedule(now, self.config.capture_delay()));
                }
            }
        } else if let Some(remaining) = deferral.remaining(now) {
            ctx.request_repaint_after(remaining);
        }
    }

    fn dispatch(&mut self, action: ViewAction) {
        let theme_change = matches!(
            action,
            ViewAction::ChooseBackground(_) | ViewAction::RevertBackground
        );
        if let Some(notice) = self.view.dispatch(action, self.style_tree.as_mut()) {
            self.set_status(notice);
        }
        if theme_change {
            match serde_json::to_string(&self.view.record()) {
                Ok(record) => tracing::debug!(%record, "view state after theme change"),
                Err(err) => tracing::warn!(%err, "could not serialize view state"),
            }
        }
    }

    fn page_background(&self) -> egui::Color32 {
        self.style_tree
            .as_ref()
            .map(|tree| ClassPalette.background(tree, StyleTree::ROOT).to_color32())
            .unwrap_or(egui::Color32::WHITE)
    }

    fn render_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(&self.config.application_name);
            ui.separator();
            if ui.button("Refresh").clicked() {
                self.request_refresh();
            }
            if self.dashboard_state.is_loading() {
                ui.spinner();
            }
            if let Some(updated) = self.dashboard_state.last_updated() {
                ui.label(format!(
                    "Last updated {:.0}s ago",
                    updated.elapsed().as_secs_f32()
                ));
            }
        });

        if let Some(notice) = &self.status {
            let color = match notice.kind {
                NoticeKind::Success => egui::Color32::from_rgb(22, 163, 74),
                NoticeKind::Error => egui::Color32::LIGHT_RED,
            };
            ui.colored_label(color, format!("{}: {}", notice.title, notice.description));
        }

        if self.worker_failed {
            ui.colored_label(
                egui::Color32::LIGHT_RED,
                "Background worker stopped. Please restart after resolving issues.",
            );
        }
    }

    fn render_logs(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Event log")
            .default_open(false)
            .show(ui, |ui| {
                if self.event_log.is_empty() {
                    ui.colored_label(egui::Color32::GRAY, "No events captured yet.");
                    return;
                }

                for entry in self.event_log.iter().rev() {
                    let color = match entry.level {
                        LogLevel::Info => egui::Color32::GRAY,
                        LogLevel::Warn => egui::Color32::from_rgb(202, 138, 4),
                        LogLevel::Error => egui::Color32::LIGHT_RED,
                    };

                    ui.colored_label(
                        color,
                        format!("[{} ago] {}", entry.age_display(), entry.message),
                    );
                }
            });
    }
}

impl App for BankLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.consume_events();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.render_top_bar(ui);
        });

        let frame = egui::Frame::central_panel(&ctx.style()).fill(self.page_background());
        let mut actions = Vec::new();
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let render_ctx = RenderContext {
                    aggregator: &self.aggregator,
                    format: &self.number_format,
                    account_number: &self.config.account_number,
                    current_background: self.view.styles().current_background(),
                };
                actions = render_dashboard(ui, &self.dashboard_state, self.view.state(), &render_ctx);
                ui.separator();
                self.render_logs(ui);
            });
        });

        for action in actions {
            self.dispatch(action);
        }

        self.drive_capture(ctx);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Info,
    Warn,
    Error,
}

struct LogEntry {
    timestamp: SystemTime,
    level: LogLevel,
    message: String,
}

impl LogEntry {
    fn new(level: LogLevel, message: String) -> Self {
        match level {
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
        Self {
            timestamp: SystemTime::now(),
            level,
            message,
        }
    }

    fn age_display(&self) -> String {
        match SystemTime::now().duration_since(self.timestamp) {
            Ok(duration) => {
                if duration < Duration::from_secs(60) {
                    format!("{:.0}s", duration.as_secs_f32())
                } else if duration < Duration::from_secs(3600) {
                    format!("{:.1}m", duration.as_secs_f64() / 60.0)
                } else {
                    format!("{:.1}h", duration.as_secs_f64() / 3600.0)
                }
            }
            Err(_) => "now".into(),
        }
    }
}

enum AppCommand {
    RefreshDashboard,
}

/// What the UI should surface after an event has been applied.
#[derive(Default)]
struct EventReport {
    logs: Vec<(LogLevel, String)>,
    notice: Option<Notice>,
    worker_failed: bool,
}

/// Applies one worker event to the dashboard. Loads are taken in arrival
/// order, so whichever response comes in last is the one shown.
fn apply_event(state: &mut DashboardState, event: AppEvent) -> EventReport {
    let mut report = EventReport::default();
    match event {
        AppEvent::CustomerLoaded(loaded) => {
            for (currency, reason) in loaded.customer.aggregate().skipped() {
                report.logs.push((
                    LogLevel::Warn,
                    format!("Account in {currency:?} left out of the total ({reason})."),
                ));
            }
            let message = match loaded.guest {
                Some(_) => "Showing the demo customer: no signed-in session.".to_string(),
                None => format!("Loaded {} account(s).", loaded.customer.accounts().len()),
            };
            state.update(loaded.customer);
            report.logs.push((LogLevel::Info, message));
        }
        AppEvent::CustomerFailed(error) => {
            state.set_error(error.clone());
            report.notice = Some(Notice::error(
                "Error",
                format!("Could not load customer data: {error}"),
            ));
        }
        AppEvent::WorkerFailed(error) => {
            report.worker_failed = true;
            report
                .logs
                .push((LogLevel::Error, format!("Background worker failed: {error}")));
        }
    }
    report
}

enum AppEvent {
    CustomerLoaded(LoadedCustomer),
    CustomerFailed(String),
    WorkerFailed(String),
}

fn spawn_background_worker(
    config: Arc<AppConfig>,
    command_rx: Receiver<AppCommand>,
    event_tx: Sender<AppEvent>,
) {
    thread::spawn(move || {
        let runtime = match Runtime::new() {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = event_tx.send(AppEvent::WorkerFailed(format!("tokio runtime: {err}")));
                return;
            }
        };
        let services = match ServiceContext::new(&config) {
            Ok(services) => services,
            Err(err) => {
                let _ = event_tx.send(AppEvent::WorkerFailed(format!("{err:#}")));
                return;
            }
        };

        while let Ok(command) = command_rx.recv() {
            match command {
                // Each refresh runs on its own; overlapping refreshes report
                // in whatever order they finish.
                AppCommand::RefreshDashboard => {
                    let services = services.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        let event = match services.load_customer().await {
                            Ok(loaded) => AppEvent::CustomerLoaded(loaded),
                            Err(err) => AppEvent::CustomerFailed(format!("{err:#}")),
                        };
                        let _ = event_tx.send(event);
                    });
                }
            }
        }
    });
}

pub struct LoadedCustomer {
    pub customer: Customer,
    pub guest: Option<GuestReason>,
}

#[derive(Clone)]
pub struct ServiceContext {
    accounts: AccountsClient,
    session: SessionStore,
    aggregator: CurrencyAggregator,
}

impl ServiceContext {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_config = ApiClientConfig::try_from_url(&config.accounts_base_url)
            .with_context(|| format!("Invalid accounts URL {}", config.accounts_base_url))?;
        let mut accounts = AccountsClient::new(api_config)?;
        if let Some(key) = &config.accounts_api_key {
            accounts = accounts.with_auth(AuthContext::api_key(key.clone()));
        }

        Ok(Self {
            accounts,
            session: SessionStore::new(config.session_file.clone(), config.guest_identity()),
            aggregator: CurrencyAggregator::default(),
        })
    }

    pub fn aggregator(&self) -> &CurrencyAggregator {
        &self.aggregator
    }

    pub async fn load_customer(&self) -> Result<LoadedCustomer> {
        let lookup = self.session.lookup().context("Reading the current session")?;
        tracing::debug!(
            customer_id = lookup.identity().id,
            guest = lookup.is_guest(),
            "session resolved"
        );
        match lookup {
            SessionLookup::Guest { identity, reason } => Ok(LoadedCustomer {
                customer: Customer::guest(identity),
                guest: Some(reason),
            }),
            SessionLookup::Customer(identity) => {
                let customer_id = identity.id;
                let accounts = self
                    .accounts
                    .list_accounts(customer_id)
                    .await
                    .with_context(|| format!("Fetching accounts for customer {customer_id}"))?;
                let customer = Customer::new(identity, accounts, &self.aggregator);
                for (currency, reason) in customer.aggregate().skipped() {
                    tracing::warn!(customer_id, currency, %reason, "account skipped in aggregate");
                }
                Ok(LoadedCustomer {
                    customer,
                    guest: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use httpmock::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::io::Write;

    fn config_for(base_url: String, session_file: Option<std::path::PathBuf>) -> AppConfig {
        let mut config = AppConfig::load(&crate::cli::Cli::parse_from(["banklens"]))
            .unwrap_or_default();
        config.accounts_base_url = base_url;
        config.session_file = session_file;
        config
    }

    #[tokio::test]
    async fn loads_signed_in_customer_and_aggregates() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET)
                .path("/accounts")
                .query_param("customer_id", "eq.7");
            then.status(200).json_body(json!([
                { "currency": "درهم اماراتي", "balance": 1000 },
                { "currency": "USD", "balance": 100 },
                { "currency": "XYZ", "balance": 5 }
            ]));
        });

        let mut session = tempfile::NamedTempFile::new().unwrap();
        write!(session, r#"{{"id": 7, "name": "Layla"}}"#).unwrap();

        let services =
            ServiceContext::new(&config_for(server.url("/"), Some(session.path().to_path_buf())))
                .unwrap();
        let loaded = services.load_customer().await.unwrap();

        assert!(loaded.guest.is_none());
        assert_eq!(loaded.customer.name(), "Layla");
        assert_eq!(loaded.customer.aggregate_balance().round_dp(2), dec!(1367.24));
        assert_eq!(loaded.customer.aggregate().skipped().count(), 1);
    }

    #[tokio::test]
    async fn missing_session_uses_guest_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let services = ServiceContext::new(&config_for(
            "http://127.0.0.1:9/".into(),
            Some(dir.path().join("absent.json")),
        ))
        .unwrap();

        let loaded = services.load_customer().await.unwrap();
        assert_eq!(loaded.guest, Some(GuestReason::NoSessionRecord));
        assert_eq!(loaded.customer.id(), 101);
        assert!(loaded.customer.aggregate_balance().is_zero());
    }

    #[tokio::test]
    async fn store_failure_is_reported_with_context() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET).path("/accounts");
            then.status(500).body("boom");
        });

        let mut session = tempfile::NamedTempFile::new().unwrap();
        write!(session, r#"{{"id": 9, "name": "Omar"}}"#).unwrap();

        let services =
            ServiceContext::new(&config_for(server.url("/"), Some(session.path().to_path_buf())))
                .unwrap();
        let err = services.load_customer().await.err().unwrap();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("Fetching accounts for customer 9"));
        assert!(rendered.contains("500"));
    }

    fn loaded(balance: rust_decimal::Decimal) -> AppEvent {
        let customer = Customer::new(
            crate::banking::CustomerIdentity::new(7, "Layla"),
            vec![crate::banking::Account::new("AED", balance)],
            &CurrencyAggregator::default(),
        );
        AppEvent::CustomerLoaded(LoadedCustomer {
            customer,
            guest: None,
        })
    }

    #[test]
    fn overlapping_refreshes_apply_in_arrival_order() {
        let (tx, rx) = unbounded();
        // The later request resolves first.
        tx.send(loaded(dec!(50))).unwrap();
        tx.send(loaded(dec!(5))).unwrap();

        let mut state = DashboardState::new();
        while let Ok(event) = rx.try_recv() {
            apply_event(&mut state, event);
        }
        assert_eq!(state.customer().unwrap().aggregate_balance(), dec!(5));
        assert!(!state.is_loading());
    }

    #[test]
    fn failed_refresh_keeps_last_customer_and_raises_notice() {
        let mut state = DashboardState::new();
        apply_event(&mut state, loaded(dec!(42)));
        state.set_loading();

        let report = apply_event(
            &mut state,
            AppEvent::CustomerFailed("Fetching accounts for customer 7: HTTP 503".into()),
        );

        let notice = report.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.description.contains("HTTP 503"));
        assert!(!report.worker_failed);
        assert_eq!(state.customer().unwrap().aggregate_balance(), dec!(42));
        assert!(state.error().is_some());
    }

    #[test]
    fn skipped_accounts_are_logged_as_warnings() {
        let customer = Customer::new(
            crate::banking::CustomerIdentity::new(7, "Layla"),
            vec![
                crate::banking::Account::new("AED", dec!(10)),
                crate::banking::Account::new("XYZ", dec!(1)),
            ],
            &CurrencyAggregator::default(),
        );
        let mut state = DashboardState::new();
        let report = apply_event(
            &mut state,
            AppEvent::CustomerLoaded(LoadedCustomer {
                customer,
                guest: None,
            }),
        );

        assert_eq!(
            report.logs.iter().filter(|(level, _)| *level == LogLevel::Warn).count(),
            1
        );
        assert!(report.notice.is_none());
    }

    #[test]
    fn worker_failure_is_flagged() {
        let mut state = DashboardState::new();
        let report = apply_event(&mut state, AppEvent::WorkerFailed("tokio runtime".into()));
        assert!(report.worker_failed);
        assert_eq!(report.logs[0].0, LogLevel::Error);
    }
}

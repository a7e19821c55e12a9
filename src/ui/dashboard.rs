use super::theme::{BackgroundToken, BACKGROUND_CHOICES};
use super::view_state::{ViewAction, ViewState};
use crate::banking::{CurrencyAggregator, CurrencyCode, Customer, NumberFormat};
use eframe::egui;
use std::time::Instant;

/// Linked e-wallet providers shown in the balance card.
pub const ELECTRONIC_WALLETS: [(&str, bool); 6] = [
    ("Binance", true),
    ("Revolut", false),
    ("PayPal", false),
    ("Wise", false),
    ("Paysera", false),
    ("RedotPay", false),
];

/// Currencies with a card under the total balance.
const DISPLAY_CURRENCIES: [CurrencyCode; 3] =
    [CurrencyCode::Usd, CurrencyCode::Eur, CurrencyCode::Gbp];

/// What the dashboard last received from the account store. Responses are
/// applied in arrival order with no sequencing: the most recent one wins.
#[derive(Debug)]
pub struct DashboardState {
    customer: Option<Customer>,
    last_updated: Option<Instant>,
    loading: bool,
    error: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            customer: None,
            last_updated: None,
            loading: true,
            error: None,
        }
    }

    pub fn set_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn update(&mut self, customer: Customer) {
        self.customer = Some(customer);
        self.last_updated = Some(Instant::now());
        self.loading = false;
        self.error = None;
    }

    /// Keeps whatever customer was last shown.
    pub fn set_error(&mut self, error: String) {
        self.loading = false;
        self.error = Some(error);
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn last_updated(&self) -> Option<Instant> {
        self.last_updated
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything `render` needs besides the state it draws.
pub struct RenderContext<'a> {
    pub aggregator: &'a CurrencyAggregator,
    pub format: &'a NumberFormat,
    pub account_number: &'a str,
    pub current_background: &'a BackgroundToken,
}

pub fn render(
    ui: &mut egui::Ui,
    state: &DashboardState,
    view: &ViewState,
    ctx: &RenderContext<'_>,
) -> Vec<ViewAction> {
    let mut actions = Vec::new();

    if state.is_loading() && state.customer().is_none() {
        ui.spinner();
        ui.label("Loading your accounts...");
        return actions;
    }

    if let Some(error) = state.error() {
        ui.colored_label(egui::Color32::LIGHT_RED, error);
        ui.separator();
    }

    let (name, balance) = match state.customer() {
        Some(customer) => (customer.name().to_string(), customer.aggregate_balance()),
        None => (String::new(), Default::default()),
    };

    ui.horizontal(|ui| {
        ui.heading(format!("Welcome, {name}"));
        if ui.button("🎨 Background").clicked() {
            actions.push(ViewAction::ToggleColorPicker);
        }
        if ui.button("↺ Restore colors").clicked() {
            actions.push(ViewAction::RevertBackground);
        }
    });

    if view.show_color_picker {
        render_color_picker(ui, ctx.current_background, &mut actions);
    }

    ui.separator();
    ui.label("Total balance");
    ui.label(
        egui::RichText::new(format!(
            "{} {}",
            ctx.format.format(balance),
            CurrencyCode::BASE.symbol()
        ))
        .size(32.0)
        .strong(),
    );

    egui::ScrollArea::horizontal()
        .id_salt("currency_cards")
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                for code in DISPLAY_CURRENCIES {
                    let converted = ctx
                        .aggregator
                        .convert(balance, code)
                        .map(|amount| ctx.format.format(amount))
                        .unwrap_or_else(|_| "—".into());
                    let label = format!("{} {}\n{} {}", code.flag(), code.iso(), code.symbol(), converted);
                    if ui
                        .selectable_label(view.selected_currency == code, label)
                        .clicked()
                    {
                        actions.push(ViewAction::SelectCurrency(code));
                    }
                }
                if ui.button("＋ Add currency").clicked() {
                    actions.push(ViewAction::ShowAddCurrency);
                }
            });
        });

    if let Some(customer) = state.customer() {
        let skipped: Vec<_> = customer.aggregate().skipped().collect();
        if !skipped.is_empty() {
            ui.colored_label(
                egui::Color32::GRAY,
                format!("{} account(s) not included in the total", skipped.len()),
            );
        }
    }

    ui.horizontal(|ui| {
        if ui.button("Exchange rates").clicked() {
            actions.push(ViewAction::ToggleExchangeRates);
        }
        if ui.button("E-wallets").clicked() {
            actions.push(ViewAction::ToggleWallets);
        }
        let reveal_label = if view.account_activated {
            "Account number"
        } else {
            "Activate account"
        };
        if ui.button(reveal_label).clicked() {
            actions.push(ViewAction::ToggleAccountNumber);
        }
    });

    if view.show_account_number {
        ui.group(|ui| {
            ui.label("Bank account number");
            ui.monospace(ctx.account_number);
        });
    }

    if ui
        .selectable_label(view.show_wallets_section, "Electronic wallets")
        .clicked()
    {
        actions.push(ViewAction::ToggleWalletsSection);
    }
    if view.show_wallets_section {
        render_wallet_strip(ui);
    }

    if view.show_exchange_rates {
        ui.separator();
        render_exchange_rates(ui, ctx);
    }

    if view.show_wallets {
        ui.separator();
        render_wallet_list(ui, ctx);
    }

    if view.show_add_currency {
        render_add_currency(ui, state.customer(), &mut actions);
    }

    actions
}

fn render_color_picker(ui: &mut egui::Ui, current: &BackgroundToken, actions: &mut Vec<ViewAction>) {
    ui.group(|ui| {
        ui.label("Choose a page background");
        ui.horizontal_wrapped(|ui| {
            for (name, class) in BACKGROUND_CHOICES {
                if ui
                    .selectable_label(current.as_str() == class, name)
                    .clicked()
                {
                    actions.push(ViewAction::ChooseBackground(BackgroundToken::new(class)));
                }
            }
        });
    });
}

fn render_wallet_strip(ui: &mut egui::Ui) {
    egui::ScrollArea::horizontal()
        .id_salt("wallet_strip")
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                for (name, linked) in ELECTRONIC_WALLETS {
                    ui.group(|ui| {
                        ui.vertical(|ui| {
                            ui.strong(name);
                            ui.small(if linked { "Linked" } else { "Not linked" });
                        });
                    });
                }
            });
        });
}

fn render_exchange_rates(ui: &mut egui::Ui, ctx: &RenderContext<'_>) {
    ui.heading("Exchange rates");
    egui::Grid::new("exchange_rates").striped(true).show(ui, |ui| {
        ui.label("Pair");
        ui.label("Rate");
        ui.label("Change");
        ui.end_row();

        for rate in ctx.aggregator.rates().entries() {
            ui.label(format!("{} → {}", rate.from, rate.to));
            ui.label(format!(
                "1 {} = {} {}",
                rate.from,
                ctx.format.format_rate(rate.rate),
                rate.to
            ));
            let color = if rate.is_rising() {
                egui::Color32::from_rgb(22, 163, 74)
            } else {
                egui::Color32::from_rgb(220, 38, 38)
            };
            ui.colored_label(color, ctx.format.format_change(rate.daily_change));
            ui.end_row();
        }
    });
}

fn render_wallet_list(ui: &mut egui::Ui, ctx: &RenderContext<'_>) {
    ui.heading("Electronic wallets");
    egui::Grid::new("wallets").striped(true).show(ui, |ui| {
        ui.label("Wallet");
        ui.label("Balance");
        ui.label("Status");
        ui.end_row();

        for (name, linked) in ELECTRONIC_WALLETS {
            ui.label(name);
            ui.label(ctx.format.format(Default::default()));
            ui.label(if linked { "Linked" } else { "Link wallet" });
            ui.end_row();
        }
    });
}

fn render_add_currency(
    ui: &mut egui::Ui,
    customer: Option<&Customer>,
    actions: &mut Vec<ViewAction>,
) {
    let mut open = true;
    egui::Window::new("Add a currency account")
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .show(ui.ctx(), |ui| {
            for code in CurrencyCode::ALL {
                let held = customer
                    .map(|c| {
                        c.accounts()
                            .iter()
                            .filter_map(|a| a.currency.as_deref())
                            .any(|label| label.parse::<CurrencyCode>().ok() == Some(code))
                    })
                    .unwrap_or(false);
                ui.horizontal(|ui| {
                    ui.label(format!("{} {} ({})", code.flag(), code.display_name(), code.iso()));
                    if held {
                        ui.colored_label(egui::Color32::GRAY, "already open");
                    }
                });
            }
            ui.separator();
            ui.label("New accounts are opened through the account-opening flow.");
        });
    if !open {
        actions.push(ViewAction::DismissAddCurrency);
    }
}

use super::snapshot::{StyleSnapshotManager, ThemeState};
use super::style_tree::StyleTree;
use super::theme::BackgroundToken;
use crate::banking::CurrencyCode;
use serde::{Deserialize, Serialize};

/// Panel visibility and selection for the dashboard. Every change goes
/// through [`reduce`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub selected_currency: CurrencyCode,
    pub show_exchange_rates: bool,
    pub show_add_currency: bool,
    pub show_wallets: bool,
    pub show_wallets_section: bool,
    pub show_account_number: bool,
    pub account_activated: bool,
    pub show_color_picker: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selected_currency: CurrencyCode::BASE,
            show_exchange_rates: false,
            show_add_currency: false,
            show_wallets: false,
            show_wallets_section: true,
            show_account_number: false,
            account_activated: false,
            show_color_picker: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    SelectCurrency(CurrencyCode),
    ToggleExchangeRates,
    ShowAddCurrency,
    DismissAddCurrency,
    ToggleWallets,
    ToggleWalletsSection,
    ToggleAccountNumber,
    ToggleColorPicker,
    ChooseBackground(BackgroundToken),
    RevertBackground,
}

pub fn reduce(state: &ViewState, action: &ViewAction) -> ViewState {
    let mut next = state.clone();
    match action {
        ViewAction::SelectCurrency(code) => next.selected_currency = *code,
        ViewAction::ToggleExchangeRates => next.show_exchange_rates = !state.show_exchange_rates,
        ViewAction::ShowAddCurrency => next.show_add_currency = true,
        ViewAction::DismissAddCurrency => next.show_add_currency = false,
        ViewAction::ToggleWallets => next.show_wallets = !state.show_wallets,
        ViewAction::ToggleWalletsSection => {
            next.show_wallets_section = !state.show_wallets_section
        }
        ViewAction::ToggleAccountNumber => {
            next.show_account_number = !state.show_account_number;
            next.account_activated = true;
        }
        ViewAction::ToggleColorPicker => next.show_color_picker = !state.show_color_picker,
        // Theme changes live in the snapshot manager.
        ViewAction::ChooseBackground(_) | ViewAction::RevertBackground => {}
    }
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Short, non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Serializable picture of everything the user can change on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStateRecord {
    pub view: ViewState,
    pub theme: ThemeState,
}

/// View state plus theming, driven by one dispatch entry point.
#[derive(Debug, Default)]
pub struct DashboardView {
    state: ViewState,
    styles: StyleSnapshotManager,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn styles(&self) -> &StyleSnapshotManager {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut StyleSnapshotManager {
        &mut self.styles
    }

    pub fn record(&self) -> ViewStateRecord {
        ViewStateRecord {
            view: self.state.clone(),
            theme: self.styles.theme().clone(),
        }
    }

    pub fn dispatch(&mut self, action: ViewAction, tree: Option<&mut StyleTree>) -> Option<Notice> {
        self.state = reduce(&self.state, &action);
        match action {
            ViewAction::ChooseBackground(token) => {
                tracing::debug!(background = %token, "background chosen");
                self.styles.apply_background(tree, token);
                None
            }
            ViewAction::RevertBackground => {
                let outcome = self.styles.revert(tree);
                tracing::debug!(?outcome, "background reverted");
                Some(if outcome.is_success() {
                    Notice::success("Done", "Original colors and styles restored")
                } else {
                    Notice::error("Not restored", "The dashboard is not mounted yet")
                })
            }
            _ => None,
        }
    }
}

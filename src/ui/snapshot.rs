use super::style_tree::{StyleResolver, StyleTree};
use super::theme::BackgroundToken;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Rendered style of one element at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    pub tag: String,
    pub background_color: String,
    pub color: String,
    pub border_color: String,
    pub box_shadow: String,
    pub class_name: String,
    pub inline_style: Option<String>,
}

/// Baseline for a mounted dashboard, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct StyleSnapshot {
    entries: Vec<(String, ElementStyle)>,
}

impl StyleSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
impl StyleSnapshot {
    pub fn get(&self, element_id: &str) -> Option<&ElementStyle> {
        self.entries
            .iter()
            .find(|(id, _)| id == element_id)
            .map(|(_, style)| style)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementStyle)> {
        self.entries.iter().map(|(id, style)| (id.as_str(), style))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Baseline {
    #[default]
    Uncaptured,
    Captured(StyleSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured { elements: usize },
    AlreadyCaptured,
    /// Nothing mounted yet; try again on the next trigger.
    RootMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertOutcome {
    Restored,
    /// No baseline was captured; the default background is still applied.
    NoBaseline,
    RootMissing,
}

impl RevertOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RevertOutcome::RootMissing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub current_background: BackgroundToken,
}

/// Captures the dashboard's rendered style once per mount and owns the single
/// tracked background override.
#[derive(Debug, Default)]
pub struct StyleSnapshotManager {
    baseline: Baseline,
    theme: ThemeState,
}

impl StyleSnapshotManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&StyleSnapshot> {
        match &self.baseline {
            Baseline::Captured(snapshot) => Some(snapshot),
            Baseline::Uncaptured => None,
        }
    }

    pub fn theme(&self) -> &ThemeState {
        &self.theme
    }

    pub fn current_background(&self) -> &BackgroundToken {
        &self.theme.current_background
    }

    /// Records every element under `root` (root included). Elements without a
    /// `style_id` get `element-{index}` in document order.
    pub fn capture_baseline(
        &mut self,
        root: Option<&mut StyleTree>,
        resolver: &dyn StyleResolver,
    ) -> CaptureOutcome {
        if matches!(self.baseline, Baseline::Captured(_)) {
            return CaptureOutcome::AlreadyCaptured;
        }
        let Some(tree) = root else {
            return CaptureOutcome::RootMissing;
        };

        let order = tree.preorder(StyleTree::ROOT);
        let mut entries = Vec::with_capacity(order.len());
        for (index, id) in order.into_iter().enumerate() {
            let computed = resolver.computed_style(tree, id);
            let node = tree.node_mut(id);
            let style_id = node
                .style_id
                .get_or_insert_with(|| format!("element-{index}"))
                .clone();
            entries.push((
                style_id,
                ElementStyle {
                    tag: node.tag.clone(),
                    background_color: computed.background_color,
                    color: computed.color,
                    border_color: computed.border_color,
                    box_shadow: computed.box_shadow,
                    class_name: node.class_name(),
                    inline_style: node.inline_style.clone(),
                },
            ));
        }

        let snapshot = StyleSnapshot { entries };
        let elements = snapshot.len();
        self.baseline = Baseline::Captured(snapshot);
        tracing::debug!(elements, "captured style baseline");
        CaptureOutcome::Captured { elements }
    }

    /// Swaps the root's background class. Returns `false` if nothing is mounted.
    pub fn apply_background(&mut self, root: Option<&mut StyleTree>, token: BackgroundToken) -> bool {
        let Some(tree) = root else {
            return false;
        };
        let node = tree.root_mut();
        node.remove_class(self.theme.current_background.as_str());
        node.add_class(token.as_str());
        self.theme.current_background = token;
        true
    }

    /// Puts the default background back and resets tracking to it.
    pub fn revert(&mut self, root: Option<&mut StyleTree>) -> RevertOutcome {
        let default = BackgroundToken::default();
        let Some(tree) = root else {
            self.theme.current_background = default;
            // No baseline means success even when unmounted.
            return match self.baseline {
                Baseline::Captured(_) => RevertOutcome::RootMissing,
                Baseline::Uncaptured => RevertOutcome::NoBaseline,
            };
        };

        let node = tree.root_mut();
        node.remove_class(self.theme.current_background.as_str());
        node.add_class(default.as_str());
        self.theme.current_background = default;

        match self.baseline {
            Baseline::Captured(_) => RevertOutcome::Restored,
            Baseline::Uncaptured => RevertOutcome::NoBaseline,
        }
    }
}

#[cfg(test)]
impl StyleSnapshotManager {
    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }
}

/// Delay between mounting the dashboard and capturing its baseline, so the
/// capture sees the settled layout. Fires at most once.
#[derive(Debug, Clone)]
pub struct CaptureDeferral {
    due_at: Instant,
    fired: bool,
}

impl CaptureDeferral {
    pub fn schedule(mounted_at: Instant, delay: Duration) -> Self {
        Self {
            due_at: mounted_at + delay,
            fired: false,
        }
    }

    /// Time left before the capture is due, or `None` once it has fired.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        if self.fired {
            None
        } else {
            Some(self.due_at.saturating_duration_since(now))
        }
    }

    pub fn take_if_due(&mut self, now: Instant) -> bool {
        if self.fired || now < self.due_at {
            return false;
        }
        self.fired = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ClassPalette;

    fn mounted() -> StyleTree {
        StyleTree::dashboard_layout(BackgroundToken::DEFAULT)
    }

    #[test]
    fn captures_every_element_in_document_order() {
        let mut tree = mounted();
        let mut manager = StyleSnapshotManager::new();

        let outcome = manager.capture_baseline(Some(&mut tree), &ClassPalette);
        assert_eq!(outcome, CaptureOutcome::Captured { elements: tree.len() });

        let snapshot = manager.snapshot().unwrap();
        let root = snapshot.get("element-0").unwrap();
        assert_eq!(root.background_color, "rgb(255, 255, 255)");
        assert!(root.class_name.contains("bg-white"));
        assert_eq!(tree.root().style_id.as_deref(), Some("element-0"));
        assert_eq!(snapshot.iter().next().map(|(id, _)| id), Some("element-0"));
    }

    #[test]
    fn keeps_existing_style_ids() {
        let mut tree = StyleTree::new("main", "bg-white");
        let child = tree.add_child(StyleTree::ROOT, "p", "text-white");
        tree.node_mut(child).style_id = Some("balance-label".into());

        let mut manager = StyleSnapshotManager::new();
        manager.capture_baseline(Some(&mut tree), &ClassPalette);

        let snapshot = manager.snapshot().unwrap();
        assert!(snapshot.get("balance-label").is_some());
        assert!(snapshot.get("element-1").is_none());
        assert_eq!(tree.find_by_style_id("balance-label"), Some(child));
    }

    #[test]
    fn second_capture_is_a_no_op() {
        let mut tree = mounted();
        let mut manager = StyleSnapshotManager::new();
        manager.capture_baseline(Some(&mut tree), &ClassPalette);
        let first = manager.snapshot().cloned();

        manager.apply_background(Some(&mut tree), BackgroundToken::new("bg-pink-50"));
        let outcome = manager.capture_baseline(Some(&mut tree), &ClassPalette);

        assert_eq!(outcome, CaptureOutcome::AlreadyCaptured);
        assert_eq!(manager.snapshot().cloned(), first);
    }

    #[test]
    fn missing_root_leaves_capture_pending() {
        let mut manager = StyleSnapshotManager::new();
        assert_eq!(
            manager.capture_baseline(None, &ClassPalette),
            CaptureOutcome::RootMissing
        );
        assert_eq!(manager.baseline(), &Baseline::Uncaptured);

        let mut tree = mounted();
        assert!(matches!(
            manager.capture_baseline(Some(&mut tree), &ClassPalette),
            CaptureOutcome::Captured { .. }
        ));
    }

    #[test]
    fn apply_background_does_not_touch_baseline() {
        let mut tree = mounted();
        let mut manager = StyleSnapshotManager::new();
        manager.capture_baseline(Some(&mut tree), &ClassPalette);

        assert!(manager.apply_background(Some(&mut tree), BackgroundToken::new("bg-blue-50")));
        assert!(tree.root().has_class("bg-blue-50"));
        assert!(!tree.root().has_class("bg-white"));
        assert_eq!(manager.current_background().as_str(), "bg-blue-50");

        let root = manager.snapshot().unwrap().get("element-0").unwrap();
        assert_eq!(root.background_color, "rgb(255, 255, 255)");
    }

    #[test]
    fn revert_restores_default_after_many_changes() {
        let mut tree = mounted();
        let mut manager = StyleSnapshotManager::new();
        manager.capture_baseline(Some(&mut tree), &ClassPalette);

        for class in ["bg-blue-50", "bg-green-50", "bg-gray-50", "bg-blue-50"] {
            manager.apply_background(Some(&mut tree), BackgroundToken::new(class));
        }
        let outcome = manager.revert(Some(&mut tree));

        assert_eq!(outcome, RevertOutcome::Restored);
        assert!(outcome.is_success());
        assert!(manager.current_background().is_default());
        assert!(tree.root().has_class("bg-white"));
        for (_, class) in crate::ui::theme::BACKGROUND_CHOICES.iter().skip(1) {
            assert!(!tree.root().has_class(class), "{class} left behind");
        }
    }

    #[test]
    fn revert_without_baseline_reports_success() {
        let mut tree = mounted();
        let mut manager = StyleSnapshotManager::new();

        let outcome = manager.revert(Some(&mut tree));

        assert_eq!(outcome, RevertOutcome::NoBaseline);
        assert!(outcome.is_success());
        assert!(manager.current_background().is_default());
        assert_eq!(
            tree.root().classes.iter().filter(|c| *c == "bg-white").count(),
            1
        );
    }

    #[test]
    fn revert_without_root_resets_tracking() {
        let mut tree = mounted();
        let mut manager = StyleSnapshotManager::new();
        manager.capture_baseline(Some(&mut tree), &ClassPalette);
        manager.apply_background(Some(&mut tree), BackgroundToken::new("bg-sky-50"));

        let outcome = manager.revert(None);
        assert_eq!(outcome, RevertOutcome::RootMissing);
        assert!(!outcome.is_success());
        assert!(manager.current_background().is_default());
    }

    #[test]
    fn revert_without_root_or_baseline_still_succeeds() {
        let mut tree = mounted();
        let mut manager = StyleSnapshotManager::new();
        manager.apply_background(Some(&mut tree), BackgroundToken::new("bg-sky-50"));

        let outcome = manager.revert(None);
        assert_eq!(outcome, RevertOutcome::NoBaseline);
        assert!(outcome.is_success());
        assert!(manager.current_background().is_default());
    }

    #[test]
    fn baseline_serializes_in_document_order() {
        let mut tree = StyleTree::new("main", "bg-white");
        tree.add_child(StyleTree::ROOT, "p", "text-white");
        let mut manager = StyleSnapshotManager::new();
        manager.capture_baseline(Some(&mut tree), &ClassPalette);

        let json = serde_json::to_value(manager.snapshot().unwrap()).unwrap();
        assert_eq!(json[0][0], "element-0");
        assert_eq!(json[0][1]["tag"], "main");
        assert_eq!(json[0][1]["backgroundColor"], "rgb(255, 255, 255)");
        assert_eq!(json[1][1]["color"], "rgb(255, 255, 255)");
    }

    #[test]
    fn apply_without_root_changes_nothing() {
        let mut manager = StyleSnapshotManager::new();
        assert!(!manager.apply_background(None, BackgroundToken::new("bg-sky-50")));
        assert!(manager.current_background().is_default());
    }

    #[test]
    fn deferral_fires_once_after_delay() {
        let mounted_at = Instant::now();
        let mut deferral = CaptureDeferral::schedule(mounted_at, Duration::from_millis(500));

        assert!(!deferral.take_if_due(mounted_at + Duration::from_millis(499)));
        assert_eq!(
            deferral.remaining(mounted_at + Duration::from_millis(200)),
            Some(Duration::from_millis(300))
        );
        assert!(deferral.take_if_due(mounted_at + Duration::from_millis(500)));
        assert!(!deferral.take_if_due(mounted_at + Duration::from_secs(5)));
        assert_eq!(deferral.remaining(mounted_at), None);
    }

    #[test]
    fn dropped_deferral_never_captures() {
        let mounted_at = Instant::now();
        let mut tree = mounted();
        let mut manager = StyleSnapshotManager::new();
        let mut pending = Some(CaptureDeferral::schedule(mounted_at, Duration::from_millis(500)));

        // Torn down before the delay elapsed.
        pending.take();

        let later = mounted_at + Duration::from_secs(1);
        if pending.as_mut().is_some_and(|d| d.take_if_due(later)) {
            manager.capture_baseline(Some(&mut tree), &ClassPalette);
        }
        assert!(manager.snapshot().is_none());
    }
}

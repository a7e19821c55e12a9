use super::style_tree::{ComputedStyle, NodeId, StyleResolver, StyleTree};
use eframe::egui::{self, Color32, FontFamily, FontId, TextStyle, Visuals};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A background utility class applied to the dashboard root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackgroundToken(String);

impl BackgroundToken {
    pub const DEFAULT: &'static str = "bg-white";

    pub fn new(class: impl Into<String>) -> Self {
        Self(class.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
impl BackgroundToken {
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl Default for BackgroundToken {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for BackgroundToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backgrounds offered in the color picker.
pub const BACKGROUND_CHOICES: [(&str, &str); 8] = [
    ("White", "bg-white"),
    ("Light blue", "bg-blue-50"),
    ("Cool sky", "bg-sky-50"),
    ("Light green", "bg-green-50"),
    ("Light yellow", "bg-yellow-50"),
    ("Light pink", "bg-pink-50"),
    ("Light purple", "bg-purple-50"),
    ("Light gray", "bg-gray-50"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in percent.
    pub alpha: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::with_alpha(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::with_alpha(r, g, b, 100)
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, alpha: u8) -> Self {
        Self { r, g, b, alpha }
    }

    pub fn css(&self) -> String {
        if self.alpha >= 100 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                f32::from(self.alpha) / 100.0
            )
        }
    }

    pub fn to_color32(self) -> Color32 {
        let alpha = (u16::from(self.alpha.min(100)) * 255 / 100) as u8;
        Color32::from_rgba_unmultiplied(self.r, self.g, self.b, alpha)
    }
}

const DEFAULT_TEXT: Rgba = Rgba::rgb(0, 0, 0);
const DEFAULT_BORDER: Rgba = Rgba::rgb(229, 231, 235);
const NO_SHADOW: &str = "none";

fn named_color(name: &str) -> Option<Rgba> {
    let color = match name {
        "white" => Rgba::rgb(255, 255, 255),
        "black" => Rgba::rgb(0, 0, 0),
        "transparent" => Rgba::TRANSPARENT,
        "blue-50" => Rgba::rgb(239, 246, 255),
        "sky-50" => Rgba::rgb(240, 249, 255),
        "green-50" => Rgba::rgb(240, 253, 244),
        "yellow-50" => Rgba::rgb(254, 252, 232),
        "pink-50" => Rgba::rgb(253, 242, 248),
        "purple-50" => Rgba::rgb(250, 245, 255),
        "gray-50" => Rgba::rgb(249, 250, 251),
        "green-100" => Rgba::rgb(220, 252, 231),
        "red-100" => Rgba::rgb(254, 226, 226),
        "gray-200" => Rgba::rgb(229, 231, 235),
        "blue-300" => Rgba::rgb(147, 197, 253),
        "yellow-300" => Rgba::rgb(253, 224, 71),
        "green-300" => Rgba::rgb(134, 239, 172),
        "gray-500" => Rgba::rgb(107, 114, 128),
        "blue-500" => Rgba::rgb(59, 130, 246),
        "yellow-500" => Rgba::rgb(234, 179, 8),
        "green-500" => Rgba::rgb(34, 197, 94),
        "purple-500" => Rgba::rgb(168, 85, 247),
        "indigo-500" => Rgba::rgb(99, 102, 241),
        "red-500" => Rgba::rgb(239, 68, 68),
        "blue-600" => Rgba::rgb(37, 99, 235),
        "green-600" => Rgba::rgb(22, 163, 74),
        "red-600" => Rgba::rgb(220, 38, 38),
        "gray-900" => Rgba::rgb(17, 24, 39),
        _ => return None,
    };
    Some(color)
}

/// Parses `white`, `blue-500`, or `white/10` (opacity suffix).
fn parse_color(value: &str) -> Option<Rgba> {
    match value.split_once('/') {
        Some((name, opacity)) => {
            let base = named_color(name)?;
            let alpha: u8 = opacity.parse().ok().filter(|alpha| *alpha <= 100)?;
            Some(Rgba { alpha, ..base })
        }
        None => named_color(value),
    }
}

fn shadow(name: &str) -> Option<&'static str> {
    match name {
        "shadow-sm" => Some("0 1px 2px 0 rgba(0, 0, 0, 0.05)"),
        "shadow" => Some("0 1px 3px 0 rgba(0, 0, 0, 0.1), 0 1px 2px -1px rgba(0, 0, 0, 0.1)"),
        "shadow-md" => Some("0 4px 6px -1px rgba(0, 0, 0, 0.1), 0 2px 4px -2px rgba(0, 0, 0, 0.1)"),
        "shadow-lg" => Some("0 10px 15px -3px rgba(0, 0, 0, 0.1), 0 4px 6px -4px rgba(0, 0, 0, 0.1)"),
        "shadow-none" => Some(NO_SHADOW),
        _ => None,
    }
}

/// Resolves utility classes to rendered colors. Later classes win, and text
/// color is inherited from the nearest ancestor that sets one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassPalette;

impl ClassPalette {
    pub fn background(&self, tree: &StyleTree, node: NodeId) -> Rgba {
        tree.node(node)
            .classes
            .iter()
            .filter_map(|class| class.strip_prefix("bg-").and_then(parse_color))
            .last()
            .unwrap_or(Rgba::TRANSPARENT)
    }

    fn own_text_color(&self, tree: &StyleTree, node: NodeId) -> Option<Rgba> {
        tree.node(node)
            .classes
            .iter()
            .filter_map(|class| class.strip_prefix("text-").and_then(parse_color))
            .last()
    }

    pub fn text_color(&self, tree: &StyleTree, node: NodeId) -> Rgba {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(color) = self.own_text_color(tree, id) {
                return color;
            }
            current = tree.node(id).parent();
        }
        DEFAULT_TEXT
    }

    fn border_color(&self, tree: &StyleTree, node: NodeId) -> Rgba {
        tree.node(node)
            .classes
            .iter()
            .filter_map(|class| class.strip_prefix("border-").and_then(parse_color))
            .last()
            .unwrap_or(DEFAULT_BORDER)
    }

    fn box_shadow(&self, tree: &StyleTree, node: NodeId) -> &'static str {
        tree.node(node)
            .classes
            .iter()
            .filter_map(|class| shadow(class))
            .last()
            .unwrap_or(NO_SHADOW)
    }
}

impl StyleResolver for ClassPalette {
    fn computed_style(&self, tree: &StyleTree, node: NodeId) -> ComputedStyle {
        ComputedStyle {
            background_color: self.background(tree, node).css(),
            color: self.text_color(tree, node).css(),
            border_color: self.border_color(tree, node).css(),
            box_shadow: self.box_shadow(tree, node).to_string(),
        }
    }
}

pub fn apply_theme(ctx: &egui::Context, dark_mode: bool) {
    let accent = if dark_mode {
        Color32::from_rgb(96, 165, 250)
    } else {
        Color32::from_rgb(37, 99, 235)
    };

    let mut visuals = if dark_mode {
        Visuals::dark()
    } else {
        Visuals::light()
    };
    visuals.hyperlink_color = accent;
    visuals.selection.bg_fill = accent.linear_multiply(if dark_mode { 0.65 } else { 0.8 });
    visuals.selection.stroke.color = accent;
    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);

    style.text_styles.insert(
        TextStyle::Heading,
        FontId::new(24.0, FontFamily::Proportional),
    );
    style
        .text_styles
        .insert(TextStyle::Body, FontId::new(16.0, FontFamily::Proportional));
    style.text_styles.insert(
        TextStyle::Monospace,
        FontId::new(15.0, FontFamily::Monospace),
    );
    style.text_styles.insert(
        TextStyle::Button,
        FontId::new(15.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        TextStyle::Small,
        FontId::new(13.0, FontFamily::Proportional),
    );

    ctx.set_style(style);
}

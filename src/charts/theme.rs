use crate::charts::Paint;
use crate::config::Theme;

/// Concrete colors for each [`Paint`] role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: &'static str,
    pub axis: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub success: &'static str,
    pub danger: &'static str,
    pub warning: &'static str,
    pub background: &'static str,
}

impl Palette {
    pub const DARK: Palette = Palette {
        text: "#a0a0a0",
        axis: "#555555",
        primary: "#64b5f6",
        secondary: "#ba68c8",
        success: "#81c784",
        danger: "#e57373",
        warning: "#ffb74d",
        background: "#1e1e1e",
    };

    pub const LIGHT: Palette = Palette {
        text: "#666666",
        axis: "#cccccc",
        primary: "#3498db",
        secondary: "#9b59b6",
        success: "#2ecc71",
        danger: "#e74c3c",
        warning: "#f39c12",
        background: "#ffffff",
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::DARK,
            Theme::Light => Self::LIGHT,
        }
    }

    pub fn resolve(&self, paint: Paint) -> &'static str {
        match paint {
            Paint::Text => self.text,
            Paint::Axis => self.axis,
            Paint::Primary => self.primary,
            Paint::Secondary => self.secondary,
            Paint::Success => self.success,
            Paint::Danger => self.danger,
            Paint::Warning => self.warning,
            Paint::Background => self.background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themes_differ_per_role() {
        let dark = Palette::for_theme(Theme::Dark);
        let light = Palette::for_theme(Theme::Light);
        assert_eq!(dark.resolve(Paint::Primary), "#64b5f6");
        assert_eq!(light.resolve(Paint::Primary), "#3498db");
        assert_ne!(dark.resolve(Paint::Background), light.resolve(Paint::Background));
    }
}

//! Theme colors for the dashboard, optionally overridden from the
//! `[theme]` table of the config file

use ratatui::style::Color;

use crate::config::ThemeConfig;

#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Active borders, focused fields, key hints
    pub danger: Color,      // Errors, counter over the limit
    pub warning: Color,     // Counter near the limit
    pub success: Color,     // Success banners, available listings
    pub info: Color,        // Informational banners
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Hints, placeholders
    pub inactive: Color,    // Inactive borders
    pub bg_selected: Color, // Selected row background
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            warning: Color::Rgb(249, 226, 175),
            success: Color::Rgb(166, 218, 149),
            info: Color::Rgb(137, 180, 250),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            bg_selected: Color::Rgb(69, 71, 90),
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides applied; invalid colours are ignored
    pub fn from_config(config: &ThemeConfig) -> Self {
        let base = Self::default();
        let pick = |value: &Option<String>, fallback: Color| {
            value
                .as_deref()
                .and_then(|v| {
                    let parsed = Self::parse_hex_color(v);
                    if parsed.is_none() {
                        tracing::warn!("Ignoring invalid theme colour {:?}", v);
                    }
                    parsed
                })
                .unwrap_or(fallback)
        };

        Self {
            accent: pick(&config.accent, base.accent),
            danger: pick(&config.danger, base.danger),
            warning: pick(&config.warning, base.warning),
            success: pick(&config.success, base.success),
            info: pick(&config.info, base.info),
            text: pick(&config.text, base.text),
            text_dim: pick(&config.text_dim, base.text_dim),
            inactive: pick(&config.inactive, base.inactive),
            bg_selected: pick(&config.bg_selected, base.bg_selected),
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');

        if !s.is_ascii() {
            return None;
        }
        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_overrides_apply_and_invalid_ones_fall_back() {
        let config = ThemeConfig {
            accent: Some("#010203".to_string()),
            danger: Some("red".to_string()),
            ..ThemeConfig::default()
        };
        let theme = Theme::from_config(&config);
        assert_eq!(theme.accent, Color::Rgb(1, 2, 3));
        assert_eq!(theme.danger, Theme::default().danger);
    }
}

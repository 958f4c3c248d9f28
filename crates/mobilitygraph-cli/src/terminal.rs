//! Terminal styling and color utilities.
//!
//! ANSI escape codes for the mode badges printed in text output, plus color
//! detection that honours `NO_COLOR` and `TERM=dumb`.

use mobilitygraph_lib::Mode;

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";

    // Mode badges (bold reverse video)
    /// Bold reverse red for MRT.
    pub const TAG_MRT: &str = "\x1b[1;7;31m";
    /// Bold reverse magenta for LRT.
    pub const TAG_LRT: &str = "\x1b[1;7;35m";
    /// Bold reverse blue for TransJakarta.
    pub const TAG_TJ: &str = "\x1b[1;7;34m";
    /// Bold reverse yellow for transfers.
    pub const TAG_TRANSFER: &str = "\x1b[1;7;33m";
    /// Bold reverse green for walking.
    pub const TAG_WALK: &str = "\x1b[1;7;32m";

    /// Bright bold white for stop and place names.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for identifiers and secondary text.
    pub const GRAY: &str = "\x1b[90m";
    /// Green for fares.
    pub const GREEN: &str = "\x1b[32m";
}

/// Resolved color codes, either ANSI sequences or empty strings.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub tag_mrt: &'static str,
    pub tag_lrt: &'static str,
    pub tag_tj: &'static str,
    pub tag_transfer: &'static str,
    pub tag_walk: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub green: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            tag_mrt: colors::TAG_MRT,
            tag_lrt: colors::TAG_LRT,
            tag_tj: colors::TAG_TJ,
            tag_transfer: colors::TAG_TRANSFER,
            tag_walk: colors::TAG_WALK,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            green: colors::GREEN,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            tag_mrt: "",
            tag_lrt: "",
            tag_tj: "",
            tag_transfer: "",
            tag_walk: "",
            white_bold: "",
            gray: "",
            green: "",
        }
    }

    /// `colored()` when the terminal supports ANSI colors, else `plain()`.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// Badge color for `mode`.
    #[must_use]
    pub fn tag(&self, mode: Mode) -> &'static str {
        match mode {
            Mode::Mrt => self.tag_mrt,
            Mode::Lrt => self.tag_lrt,
            Mode::TransJakarta => self.tag_tj,
            Mode::Transfer => self.tag_transfer,
            Mode::Walk => self.tag_walk,
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether ANSI color codes should be emitted.
///
/// Respects the `NO_COLOR` environment variable (https://no-color.org/) and
/// the `TERM=dumb` convention.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

/// Format a number with thousand separators, Indonesian style (`11.500`).
///
/// ```
/// # use mobilitygraph_cli::terminal::format_with_separators;
/// assert_eq!(format_with_separators(999), "999");
/// assert_eq!(format_with_separators(11500), "11.500");
/// assert_eq!(format_with_separators(1234567), "1.234.567");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Rupiah amount as `Rp 11.500`.
#[must_use]
pub fn format_rupiah(amount: u64) -> String {
    format!("Rp {}", format_with_separators(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_group_thousands() {
        assert_eq!(format_with_separators(0), "0");
        assert_eq!(format_with_separators(3500), "3.500");
        assert_eq!(format_with_separators(1_000_000), "1.000.000");
        assert_eq!(
            format_with_separators(u64::MAX),
            "18.446.744.073.709.551.615"
        );
    }

    #[test]
    fn rupiah_prefix() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(14000), "Rp 14.000");
    }

    #[test]
    fn plain_palette_is_empty() {
        let palette = ColorPalette::plain();
        assert!(palette.reset.is_empty());
        assert!(palette.tag(Mode::Mrt).is_empty());
    }

    #[test]
    fn colored_palette_distinguishes_modes() {
        let palette = ColorPalette::colored();
        assert_ne!(palette.tag(Mode::Mrt), palette.tag(Mode::Lrt));
        assert_ne!(palette.tag(Mode::TransJakarta), palette.tag(Mode::Walk));
    }
}

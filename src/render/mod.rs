//! Progress bar rendering.
//!
//! Turns a remaining/total pair into a normalized fraction and a segmented,
//! color-coded text bar such as `§4§l[§c||||||§7||||§4§l]`.
//!
//! Rounding is done in integer arithmetic:
//! - the fraction is rounded half-to-even at 5 decimal digits
//! - the filled notch count is rounded to the nearest integer, ties away
//!   from zero (`2.5` notches render as `3`)

use crate::countdown::CountdownState;
use crate::types::{ChatColor, ColorScheme, MAX_NOTCHES};

/// Glyph drawn for every notch.
pub const NOTCH_GLYPH: char = '|';

/// Notches in a bar when none are configured.
pub const DEFAULT_NOTCHES: u32 = 10;

/// Fractions are kept in units of 1/100000 (5 decimal digits).
const FRACTION_SCALE: u64 = 100_000;

/// Inputs are quantised to micro-units before dividing.
const INPUT_SCALE: f64 = 1_000_000.0;

/// Largest quantised total; bigger totals are quantised more coarsely.
const MAX_QUANTISED: f64 = u64::MAX as f64 / 2.0;

/// Separator placed between a bar and its label.
const LABEL_SEPARATOR: char = '-';

// ============================================================================
// ProgressFrame
// ============================================================================

/// One rendered progress frame. Derived per tick, never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressFrame {
    /// `remaining / total`, clamped to `[0, 1]`, 5 decimal digits.
    pub fraction: f64,
    /// Number of filled notches.
    pub filled_notches: u32,
    /// Total number of notches in the bar.
    pub notches: u32,
    /// The bar text with border markers and color prefixes.
    pub rendered_text: String,
}

impl ProgressFrame {
    /// Returns the number of empty notches.
    pub fn empty_notches(&self) -> u32 {
        self.notches - self.filled_notches
    }
}

// ============================================================================
// ProgressRenderer
// ============================================================================

/// Renders progress frames with a fixed notch count and color scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRenderer {
    notches: u32,
    colors: ColorScheme,
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self {
            notches: DEFAULT_NOTCHES,
            colors: ColorScheme::default(),
        }
    }
}

impl ProgressRenderer {
    /// Creates a renderer. A notch count of zero falls back to the default
    /// and counts above [`MAX_NOTCHES`] are capped.
    pub fn new(notches: u32, colors: ColorScheme) -> Self {
        Self {
            notches: if notches == 0 {
                DEFAULT_NOTCHES
            } else {
                notches.min(MAX_NOTCHES)
            },
            colors,
        }
    }

    /// Returns a copy with a different notch count.
    #[must_use]
    pub fn with_notches(self, notches: u32) -> Self {
        Self::new(notches, self.colors)
    }

    pub fn notches(&self) -> u32 {
        self.notches
    }

    pub fn colors(&self) -> &ColorScheme {
        &self.colors
    }

    /// Renders the frame for `remaining` out of `total`.
    ///
    /// `total` must be positive. A non-positive or non-finite `total` is never
    /// divided by and yields an empty bar.
    pub fn render(&self, remaining: f64, total: f64) -> ProgressFrame {
        let scaled = if total.is_finite() && total > 0.0 {
            let remaining = if remaining.is_nan() {
                0.0
            } else {
                remaining.clamp(0.0, total)
            };
            let scale = INPUT_SCALE.min(MAX_QUANTISED / total);
            let denominator = ((total * scale).round() as u64).max(1);
            let numerator = ((remaining * scale).round() as u64).min(denominator);
            scaled_fraction(numerator, denominator)
        } else {
            0
        };
        self.frame_from_scaled(scaled)
    }

    /// Renders the frame for a countdown using its exact micro-unit values.
    pub fn render_state(&self, state: &CountdownState) -> ProgressFrame {
        let (remaining, total) = state.micros();
        self.frame_from_scaled(scaled_fraction(remaining, total))
    }

    /// Joins a rendered bar and a label with the delimiter style.
    ///
    /// The label starts after a reset code so it carries its own formatting.
    pub fn compose(&self, frame: &ProgressFrame, label: &str) -> String {
        format!(
            "{} {}{}{} {}",
            frame.rendered_text,
            self.colors.delimiter.prefix(),
            LABEL_SEPARATOR,
            ChatColor::Reset.sequence(),
            label
        )
    }

    fn frame_from_scaled(&self, scaled: u64) -> ProgressFrame {
        let filled = filled_notches(scaled, self.notches);
        ProgressFrame {
            fraction: scaled as f64 / FRACTION_SCALE as f64,
            filled_notches: filled,
            notches: self.notches,
            rendered_text: self.bar_text(filled),
        }
    }

    fn bar_text(&self, filled: u32) -> String {
        let empty = self.notches - filled;
        let border = self.colors.border.prefix();

        let mut text = String::with_capacity(self.notches as usize + 24);
        text.push_str(&border);
        text.push('[');
        if filled > 0 {
            text.push_str(&self.colors.filled.prefix());
            text.extend(std::iter::repeat(NOTCH_GLYPH).take(filled as usize));
        }
        if empty > 0 {
            text.push_str(&self.colors.empty.prefix());
            text.extend(std::iter::repeat(NOTCH_GLYPH).take(empty as usize));
        }
        text.push_str(&border);
        text.push(']');
        text
    }
}

/// Renders with the default notch count and colors.
pub fn render(remaining: f64, total: f64) -> ProgressFrame {
    ProgressRenderer::default().render(remaining, total)
}

/// Computes `numerator / denominator` in units of 1/100000, half-to-even.
///
/// Requires `numerator <= denominator` and `denominator > 0`.
fn scaled_fraction(numerator: u64, denominator: u64) -> u64 {
    let denominator = u128::from(denominator);
    let product = u128::from(numerator) * u128::from(FRACTION_SCALE);
    let quotient = product / denominator;
    let twice_remainder = (product % denominator) * 2;

    let rounded = if twice_remainder > denominator
        || (twice_remainder == denominator && quotient % 2 == 1)
    {
        quotient + 1
    } else {
        quotient
    };
    rounded.min(u128::from(FRACTION_SCALE)) as u64
}

/// Nearest-integer notch count, ties away from zero.
fn filled_notches(scaled: u64, notches: u32) -> u32 {
    let product = scaled * u64::from(notches);
    ((product + FRACTION_SCALE / 2) / FRACTION_SCALE) as u32
}

// ============================================================================
// Tests
// ============================================================================

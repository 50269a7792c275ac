//! Prompt Rendering
//!
//! Turns an [`AnalysisResult`] into the system and user messages sent to the
//! narrative service. Rendering is pure; the same inputs always produce the
//! same text.

use std::fmt::Write as _;

use narrative_core::Message;

use crate::MARKET_ANALYST_PROMPT;
use crate::snapshot::AnalysisResult;

/// Presentation settings for a rendered prompt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Display name of the asset (e.g., "Bitcoin")
    pub asset_name: String,

    /// Quote currency code (e.g., "usd")
    pub currency: String,

    /// Language the commentary must be written in
    pub language: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            asset_name: "Bitcoin".into(),
            currency: "usd".into(),
            language: "english".into(),
        }
    }
}

/// A rendered system/user message pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptText {
    pub system: String,
    pub user: String,
}

impl PromptText {
    pub fn into_messages(self) -> Vec<Message> {
        vec![Message::system(self.system), Message::user(self.user)]
    }
}

/// Two decimals, or "n/a" for values that could not be computed
fn num(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "n/a".into()
    }
}

/// "12.34% above" / "5.00% below" / "level with"
fn relative(percent: f64) -> String {
    if !percent.is_finite() {
        return "at an unknown distance from".into();
    }
    if percent > 0.0 {
        format!("{}% above", num(percent))
    } else if percent < 0.0 {
        format!("{}% below", num(percent.abs()))
    } else {
        "level with".into()
    }
}

/// Interpretation of a distance from an average; nothing when it is zero or unknown
fn valuation_note(percent: f64, above: &'static str, below: &'static str) -> &'static str {
    if !percent.is_finite() || percent == 0.0 {
        ""
    } else if percent > 0.0 {
        above
    } else {
        below
    }
}

fn signed(percent: f64) -> String {
    if percent.is_finite() && percent > 0.0 {
        format!("+{}%", num(percent))
    } else {
        format!("{}%", num(percent))
    }
}

pub fn render(result: &AnalysisResult, options: &RenderOptions) -> PromptText {
    let asset = &options.asset_name;
    let currency = options.currency.to_uppercase();
    let mut user = String::new();

    let _ = writeln!(user, "Current market data for {asset}:");
    let _ = writeln!(user, "- Price: {} {currency}.", num(result.current_price));
    let _ = writeln!(
        user,
        "- The price is {} the 2-year moving average ({} {currency}){}.",
        relative(result.diff_ma_2y_percent),
        num(result.ma_2y),
        valuation_note(
            result.diff_ma_2y_percent,
            ", which points to overvaluation",
            ", which points to undervaluation",
        ),
    );
    let _ = writeln!(
        user,
        "- The price is {} the 2-year moving average x5 ({} {currency}){}.",
        relative(result.diff_ma_2y_multiplier_percent),
        num(result.ma_2y_multiplier),
        valuation_note(
            result.diff_ma_2y_multiplier_percent,
            ", a level historically associated with market tops",
            ", leaving room for growth",
        ),
    );
    let _ = writeln!(
        user,
        "- Trading volume: {} against the 30-day average and {} against the previous day.",
        signed(result.diff_volume_percent_last_30_days),
        signed(result.diff_volume_percent_last_24_h),
    );
    let _ = writeln!(
        user,
        "- Fear and Greed Index: {} ({}).",
        result.fear_and_greed_index, result.fear_and_greed_classification,
    );
    let _ = writeln!(
        user,
        "- Pivot point {} {currency}, first resistance (R1) {} {currency}, second resistance (R2) {} {currency}.",
        num(result.pivot_point),
        num(result.r1),
        num(result.r2),
    );
    let _ = writeln!(user);
    let _ = writeln!(
        user,
        "Write a short market note combining a conservative long-term view with an \
         aggressive short-term view on {asset}. Mention the current price, explain \
         any pivot or resistance level you refer to with its value, and finish with \
         a clear buy, sell or hold recommendation."
    );
    let _ = writeln!(
        user,
        "Format prices with the currency symbol and number style of the output language \
         instead of the currency code."
    );
    let _ = write!(user, "Write the answer in {}.", options.language);

    PromptText {
        system: MARKET_ANALYST_PROMPT.to_string(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use narrative_core::Role;

    fn result() -> AnalysisResult {
        AnalysisResult {
            current_price: 55_000.0,
            current_volume: 100.0,
            volume_mean_last_30_days: 80.0,
            ma_2y: 50_000.0,
            ma_2y_multiplier: 250_000.0,
            diff_ma_2y: 5_000.0,
            diff_ma_2y_percent: 10.0,
            diff_ma_2y_multiplier: -195_000.0,
            diff_ma_2y_multiplier_percent: -78.0,
            diff_volume_last_30_days: 20.0,
            diff_volume_percent_last_30_days: 25.0,
            diff_volume_last_24_h: 10.0,
            diff_volume_percent_last_24_h: 11.111_111,
            fear_and_greed_index: 45,
            fear_and_greed_classification: "Fear".into(),
            pivot_point: 67_666.666_666,
            r1: 70_333.333_333,
            r2: 72_666.666_666,
        }
    }

    #[test]
    fn test_render_includes_indicators() {
        let prompt = render(&result(), &RenderOptions::default());

        assert!(prompt.user.contains("Price: 55000.00 USD"));
        assert!(prompt.user.contains("10.00% above the 2-year moving average (50000.00 USD)"));
        assert!(prompt.user.contains("78.00% below the 2-year moving average x5"));
        assert!(prompt.user.contains("+25.00% against the 30-day average"));
        assert!(prompt.user.contains("+11.11% against the previous day"));
        assert!(prompt.user.contains("Fear and Greed Index: 45 (Fear)"));
        assert!(prompt.user.contains("Pivot point 67666.67 USD"));
        assert!(prompt.user.contains("(R1) 70333.33 USD"));
        assert!(prompt.user.contains("(R2) 72666.67 USD"));
        assert!(prompt.user.ends_with("Write the answer in english."));
    }

    #[test]
    fn test_render_options_flow_through() {
        let options = RenderOptions {
            asset_name: "Ethereum".into(),
            currency: "eur".into(),
            language: "spanish".into(),
        };
        let prompt = render(&result(), &options);

        assert!(prompt.user.starts_with("Current market data for Ethereum:"));
        assert!(prompt.user.contains("55000.00 EUR"));
        assert!(prompt.user.ends_with("Write the answer in spanish."));
    }

    #[test]
    fn test_render_is_deterministic() {
        let options = RenderOptions::default();
        assert_eq!(render(&result(), &options), render(&result(), &options));
    }

    #[test]
    fn test_non_finite_values_render_as_unavailable() {
        let mut data = result();
        data.ma_2y = f64::NAN;
        data.diff_ma_2y_percent = f64::NAN;

        let prompt = render(&data, &RenderOptions::default());
        assert!(prompt.user.contains("at an unknown distance from the 2-year moving average (n/a USD)."));
        assert!(!prompt.user.contains("undervaluation"));
        assert!(!prompt.user.contains("NaN"));
    }

    #[test]
    fn test_level_price_gets_no_valuation_clause() {
        let mut data = result();
        data.diff_ma_2y_percent = 0.0;
        data.diff_ma_2y_multiplier_percent = 0.0;

        let prompt = render(&data, &RenderOptions::default());
        assert!(prompt.user.contains("level with the 2-year moving average (50000.00 USD)."));
        assert!(prompt.user.contains("level with the 2-year moving average x5 (250000.00 USD)."));
        assert!(!prompt.user.contains("valuation"));
        assert!(!prompt.user.contains("room for growth"));
    }

    #[test]
    fn test_into_messages() {
        let messages = render(&result(), &RenderOptions::default()).into_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, MARKET_ANALYST_PROMPT);
        assert_eq!(messages[1].role, Role::User);
    }
}

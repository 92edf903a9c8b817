// Vaultdesk Engine — Position Card
// The four figures shown per pool: user balance (derived here), APY,
// utilization and total deposit (all three supplied by the caller).

use crate::atoms::types::MarketStats;
use std::fmt;

/// Shown in place of the balance while it is loading or unknown.
pub const LOADING_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct PositionCard {
    pub asset: String,
    /// User balance in display units; `None` while loading.
    pub balance: Option<f64>,
    pub stats: MarketStats,
}

impl PositionCard {
    pub fn balance_text(&self) -> String {
        match self.balance {
            Some(b) => b.to_string(),
            None => LOADING_PLACEHOLDER.to_string(),
        }
    }

    pub fn apy_text(&self) -> String {
        format!("{}%", self.stats.apy)
    }

    pub fn utilization_text(&self) -> String {
        format!("{}%", self.stats.utilization_rate)
    }

    pub fn total_deposit_text(&self) -> String {
        group_thousands(self.stats.total_deposit)
    }
}

impl fmt::Display for PositionCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Liquidity Pool", self.asset)?;
        writeln!(f, "  Your balance      {}", self.balance_text())?;
        writeln!(f, "  APY               {}", self.apy_text())?;
        writeln!(f, "  Utilization rate  {}", self.utilization_text())?;
        write!(f, "  Total deposit     {}", self.total_deposit_text())
    }
}

/// en-US style grouping: comma thousands separators, at most three
/// fraction digits, trailing zeros dropped.
pub fn group_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rendered = format!("{:.3}", value.abs());
    let (whole, frac) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac = frac.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && (whole != "0" || !frac.is_empty()) { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(1234567.0), "1,234,567");
        assert_eq!(group_thousands(1234.5678), "1,234.568");
        assert_eq!(group_thousands(-98765.4), "-98,765.4");
    }

    #[test]
    fn loading_balance_shows_placeholder() {
        let card = PositionCard {
            asset: "USDC".into(),
            balance: None,
            stats: MarketStats { apy: 4.5, utilization_rate: 61.0, total_deposit: 2_500_000.0 },
        };
        assert_eq!(card.balance_text(), "-");
        assert_eq!(card.apy_text(), "4.5%");
        assert_eq!(card.utilization_text(), "61%");
        assert_eq!(card.total_deposit_text(), "2,500,000");
        assert!(card.to_string().starts_with("USDC Liquidity Pool\n  Your balance      -\n"));
    }

    #[test]
    fn known_balance_uses_display_units() {
        let card = PositionCard { asset: "USDC".into(), balance: Some(2.1), stats: MarketStats::default() };
        assert_eq!(card.balance_text(), "2.1");
    }
}

//! Interpretation and display of raw model output
//!
//! Models return rows of numbers. The first row is read as either a single
//! total or an (accommodation, transport) pair depending on its width.

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};

/// Currency symbol prefixed to displayed amounts
pub const DEFAULT_CURRENCY: &str = "RM";

/// Cost estimate for one query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionResult {
    /// One total cost
    Total { amount: f64 },
    /// Costs split into their two components
    Breakdown { accommodation: f64, transport: f64 },
}

impl PredictionResult {
    pub fn total(&self) -> f64 {
        match *self {
            PredictionResult::Total { amount } => amount,
            PredictionResult::Breakdown {
                accommodation,
                transport,
            } => accommodation + transport,
        }
    }

    /// Labelled, formatted amounts as shown to the user
    pub fn display_lines(&self, currency: &str) -> Vec<(&'static str, String)> {
        match *self {
            PredictionResult::Total { amount } => {
                vec![("Estimated total cost", format_currency(amount, currency))]
            }
            PredictionResult::Breakdown {
                accommodation,
                transport,
            } => vec![
                ("Accommodation", format_currency(accommodation, currency)),
                ("Transport", format_currency(transport, currency)),
            ],
        }
    }
}

/// Read the first row of model output as a [`PredictionResult`]
pub fn interpret_rows(rows: Vec<Vec<f64>>) -> Result<PredictionResult> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| PredictorError::prediction("model returned no rows"))?;

    if let Some(value) = row.iter().find(|v| !v.is_finite()) {
        return Err(PredictorError::prediction(format!(
            "model returned a non-finite value ({})",
            value
        )));
    }

    match row.as_slice() {
        [total] => Ok(PredictionResult::Total { amount: *total }),
        [accommodation, transport] => Ok(PredictionResult::Breakdown {
            accommodation: *accommodation,
            transport: *transport,
        }),
        other => Err(PredictorError::prediction(format!(
            "expected 1 or 2 values per row, got {}",
            other.len()
        ))),
    }
}

/// Format `amount` as `"<symbol> 1,234.56"`
pub fn format_currency(amount: f64, currency: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (digits, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{} {}{}.{}", currency, sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1000.0, "RM"), "RM 1,000.00");
        assert_eq!(format_currency(400.0, "RM"), "RM 400.00");
        assert_eq!(format_currency(0.0, "RM"), "RM 0.00");
        assert_eq!(format_currency(1234567.891, "RM"), "RM 1,234,567.89");
        assert_eq!(format_currency(999.999, "RM"), "RM 1,000.00");
        assert_eq!(format_currency(-2500.5, "RM"), "RM -2,500.50");
        assert_eq!(format_currency(12.3, "USD"), "USD 12.30");
        assert_eq!(format_currency(-0.001, "RM"), "RM 0.00");
    }

    #[test]
    fn test_format_currency_large_amount() {
        assert_eq!(
            format_currency(1e20, "RM"),
            "RM 100,000,000,000,000,000,000.00"
        );
        assert_eq!(
            format_currency(-3.5e19, "RM"),
            "RM -35,000,000,000,000,000,000.00"
        );
    }

    #[test]
    fn test_interpret_single_value() {
        let result = interpret_rows(vec![vec![1500.25]]).unwrap();
        assert_eq!(result, PredictionResult::Total { amount: 1500.25 });
        assert_eq!(
            result.display_lines("RM"),
            vec![("Estimated total cost", "RM 1,500.25".to_string())]
        );
    }

    #[test]
    fn test_interpret_pair_uses_first_row_only() {
        let result = interpret_rows(vec![vec![1000.0, 400.0], vec![1.0, 2.0]]).unwrap();
        assert_eq!(
            result,
            PredictionResult::Breakdown {
                accommodation: 1000.0,
                transport: 400.0
            }
        );
        assert_eq!(result.total(), 1400.0);
    }

    #[test]
    fn test_interpret_rejects_bad_shapes() {
        assert!(matches!(
            interpret_rows(vec![]),
            Err(PredictorError::Prediction(_))
        ));
        assert!(matches!(
            interpret_rows(vec![vec![]]),
            Err(PredictorError::Prediction(_))
        ));
        assert!(matches!(
            interpret_rows(vec![vec![1.0, 2.0, 3.0]]),
            Err(PredictorError::Prediction(_))
        ));
        assert!(matches!(
            interpret_rows(vec![vec![f64::NAN]]),
            Err(PredictorError::Prediction(_))
        ));
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(PredictionResult::Breakdown {
            accommodation: 1.0,
            transport: 2.0,
        })
        .unwrap();
        assert_eq!(json["kind"], "breakdown");
        assert_eq!(json["accommodation"], 1.0);
    }
}

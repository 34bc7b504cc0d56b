//! Investor risk profiles.
//!
//! A [`RiskProfile`] is the discrete category a caller chooses. It maps to:
//! - [`GrowthAssumptions`] consumed by the path simulator
//! - a [`StrategicAllocation`] across broad asset classes
//!
//! [`rebalance`] turns a strategic allocation and current holdings into the
//! buy/sell amounts that restore the target mix.

use std::fmt;
use std::str::FromStr;

use crate::types::ValidationError;
use crate::validation::{ensure_finite, ensure_non_negative};

/// Discrete investor risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RiskProfile {
    /// Capital preservation first.
    Conservative,
    /// Balanced growth and stability.
    #[default]
    Moderate,
    /// Growth first, tolerating deep drawdowns.
    Aggressive,
}

impl RiskProfile {
    /// All profiles, from least to most risky.
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    /// Lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }

    /// Default expected return and volatility for this profile.
    ///
    /// # Examples
    ///
    /// ```
    /// use quant_core::profile::RiskProfile;
    ///
    /// let a = RiskProfile::Aggressive.growth_assumptions();
    /// assert_eq!(a.annual_return, 0.18);
    /// assert_eq!(a.annual_volatility, 0.25);
    /// ```
    pub fn growth_assumptions(&self) -> GrowthAssumptions {
        match self {
            RiskProfile::Conservative => GrowthAssumptions::new_unchecked(0.11, 0.05),
            RiskProfile::Moderate => GrowthAssumptions::new_unchecked(0.14, 0.12),
            RiskProfile::Aggressive => GrowthAssumptions::new_unchecked(0.18, 0.25),
        }
    }

    /// Default strategic allocation across asset classes.
    pub fn strategic_allocation(&self) -> StrategicAllocation {
        use AssetClass::*;
        let weights = match self {
            RiskProfile::Conservative => [0.80, 0.10, 0.05, 0.05, 0.00],
            RiskProfile::Moderate => [0.40, 0.25, 0.20, 0.10, 0.05],
            RiskProfile::Aggressive => [0.20, 0.20, 0.30, 0.20, 0.10],
        };
        let classes = [
            FixedIncome,
            RealEstateFunds,
            DomesticEquities,
            International,
            Crypto,
        ];
        StrategicAllocation {
            weights: classes.into_iter().zip(weights).collect(),
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RiskProfile {
    type Err = ValidationError;

    /// Accepts English names and the Portuguese labels used by the
    /// surrounding application.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" | "conservador" => Ok(RiskProfile::Conservative),
            "moderate" | "moderado" => Ok(RiskProfile::Moderate),
            "aggressive" | "arrojado" => Ok(RiskProfile::Aggressive),
            other => Err(ValidationError::OutOfRange(format!(
                "unknown risk profile '{}'",
                other
            ))),
        }
    }
}

/// Annualised growth assumptions for the path simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrowthAssumptions {
    /// Arithmetic annualised drift (may be negative).
    pub annual_return: f64,
    /// Annualised volatility (non-negative).
    pub annual_volatility: f64,
}

impl GrowthAssumptions {
    /// Creates validated assumptions.
    pub fn new(annual_return: f64, annual_volatility: f64) -> Result<Self, ValidationError> {
        ensure_finite("annual_return", annual_return)?;
        ensure_non_negative("annual_volatility", annual_volatility)?;
        Ok(Self::new_unchecked(annual_return, annual_volatility))
    }

    const fn new_unchecked(annual_return: f64, annual_volatility: f64) -> Self {
        Self {
            annual_return,
            annual_volatility,
        }
    }
}

/// Broad asset classes of the strategic allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AssetClass {
    /// Bonds and deposits.
    FixedIncome,
    /// Listed real-estate investment funds.
    RealEstateFunds,
    /// Domestic listed equities.
    DomesticEquities,
    /// Foreign assets.
    International,
    /// Crypto assets.
    Crypto,
}

impl AssetClass {
    /// Snake-case name.
    pub fn name(&self) -> &'static str {
        match self {
            AssetClass::FixedIncome => "fixed_income",
            AssetClass::RealEstateFunds => "real_estate_funds",
            AssetClass::DomesticEquities => "domestic_equities",
            AssetClass::International => "international",
            AssetClass::Crypto => "crypto",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fixed_income" => Ok(AssetClass::FixedIncome),
            "real_estate_funds" | "real_estate" => Ok(AssetClass::RealEstateFunds),
            "domestic_equities" | "equities" => Ok(AssetClass::DomesticEquities),
            "international" => Ok(AssetClass::International),
            "crypto" => Ok(AssetClass::Crypto),
            other => Err(ValidationError::OutOfRange(format!(
                "unknown asset class '{}'",
                other
            ))),
        }
    }
}

/// Target weights per asset class, summing to one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategicAllocation {
    weights: Vec<(AssetClass, f64)>,
}

impl StrategicAllocation {
    /// Iterates over `(class, weight)` in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, f64)> + '_ {
        self.weights.iter().copied()
    }

    /// Target weight of a class (zero if absent).
    pub fn weight(&self, class: AssetClass) -> f64 {
        self.weights
            .iter()
            .find(|(c, _)| *c == class)
            .map_or(0.0, |(_, w)| *w)
    }
}

/// A single rebalancing instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalanceTrade {
    /// Asset class traded.
    pub class: AssetClass,
    /// Target weight of the class.
    pub target_weight: f64,
    /// Target amount after rebalancing.
    pub target_amount: f64,
    /// Amount currently held.
    pub current_amount: f64,
    /// Signed trade: positive buys, negative sells.
    pub amount: f64,
}

impl RebalanceTrade {
    /// Whether the trade is a purchase.
    pub fn is_buy(&self) -> bool {
        self.amount > 0.0
    }
}

/// Computes trades that bring `holdings` plus a new `contribution` to the
/// target allocation.
///
/// Classes missing from `holdings` are treated as zero.
///
/// # Examples
///
/// ```
/// use quant_core::profile::{rebalance, AssetClass, RiskProfile};
///
/// let allocation = RiskProfile::Conservative.strategic_allocation();
/// let trades = rebalance(&allocation, &[(AssetClass::FixedIncome, 1000.0)], 0.0).unwrap();
///
/// let fixed = trades.iter().find(|t| t.class == AssetClass::FixedIncome).unwrap();
/// assert!((fixed.amount + 200.0).abs() < 1e-9); // sell 200
/// ```
pub fn rebalance(
    allocation: &StrategicAllocation,
    holdings: &[(AssetClass, f64)],
    contribution: f64,
) -> Result<Vec<RebalanceTrade>, ValidationError> {
    ensure_non_negative("contribution", contribution)?;
    for (_, amount) in holdings {
        ensure_non_negative("holding", *amount)?;
    }

    let current = |class: AssetClass| -> f64 {
        holdings
            .iter()
            .filter(|(c, _)| *c == class)
            .map(|(_, a)| a)
            .sum()
    };
    let total: f64 = holdings.iter().map(|(_, a)| a).sum::<f64>() + contribution;

    Ok(allocation
        .iter()
        .map(|(class, weight)| {
            let target_amount = total * weight;
            let current_amount = current(class);
            RebalanceTrade {
                class,
                target_weight: weight,
                target_amount,
                current_amount,
                amount: target_amount - current_amount,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_profile_parsing() {
        assert_eq!(
            "Conservador".parse::<RiskProfile>().unwrap(),
            RiskProfile::Conservative
        );
        assert_eq!(
            " moderate ".parse::<RiskProfile>().unwrap(),
            RiskProfile::Moderate
        );
        assert_eq!(
            "ARROJADO".parse::<RiskProfile>().unwrap(),
            RiskProfile::Aggressive
        );
        assert!("reckless".parse::<RiskProfile>().is_err());
    }

    #[test]
    fn test_profile_display_round_trip() {
        for profile in RiskProfile::ALL {
            assert_eq!(profile.to_string().parse::<RiskProfile>().unwrap(), profile);
        }
    }

    #[test]
    fn test_allocations_sum_to_one() {
        for profile in RiskProfile::ALL {
            let total: f64 = profile.strategic_allocation().iter().map(|(_, w)| w).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_risk_increases_with_profile() {
        let vols: Vec<f64> = RiskProfile::ALL
            .iter()
            .map(|p| p.growth_assumptions().annual_volatility)
            .collect();
        assert!(vols.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_conservative_has_no_crypto() {
        let allocation = RiskProfile::Conservative.strategic_allocation();
        assert_eq!(allocation.weight(AssetClass::Crypto), 0.0);
        assert_relative_eq!(allocation.weight(AssetClass::FixedIncome), 0.80);
    }

    #[test]
    fn test_growth_assumptions_validation() {
        assert!(GrowthAssumptions::new(-0.05, 0.2).is_ok());
        assert!(GrowthAssumptions::new(0.05, -0.2).is_err());
        assert!(GrowthAssumptions::new(f64::NAN, 0.2).is_err());
    }

    #[test]
    fn test_rebalance_with_contribution() {
        let allocation = RiskProfile::Moderate.strategic_allocation();
        let holdings = [
            (AssetClass::FixedIncome, 5_000.0),
            (AssetClass::DomesticEquities, 3_000.0),
        ];
        let trades = rebalance(&allocation, &holdings, 2_000.0).unwrap();

        assert_eq!(trades.len(), 5);
        let net: f64 = trades.iter().map(|t| t.amount).sum();
        assert_relative_eq!(net, 2_000.0, epsilon = 1e-9);

        let fixed = trades
            .iter()
            .find(|t| t.class == AssetClass::FixedIncome)
            .unwrap();
        assert_relative_eq!(fixed.target_amount, 4_000.0, epsilon = 1e-9);
        assert!(!fixed.is_buy());

        let crypto = trades.iter().find(|t| t.class == AssetClass::Crypto).unwrap();
        assert_relative_eq!(crypto.amount, 500.0, epsilon = 1e-9);
        assert!(crypto.is_buy());
    }

    #[test]
    fn test_rebalance_rejects_negative_inputs() {
        let allocation = RiskProfile::Moderate.strategic_allocation();
        assert!(rebalance(&allocation, &[], -1.0).is_err());
        assert!(rebalance(&allocation, &[(AssetClass::Crypto, -10.0)], 0.0).is_err());
    }

    #[test]
    fn test_asset_class_parsing() {
        assert_eq!(
            "real-estate".parse::<AssetClass>().unwrap(),
            AssetClass::RealEstateFunds
        );
        assert!("gold".parse::<AssetClass>().is_err());
    }
}

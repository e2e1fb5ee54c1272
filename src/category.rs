use serde::{Deserialize, Serialize};

use crate::error::EvalError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stability {
    Stable,
    Volatile,
}

/// Which kind of realtime source quotes a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceSource {
    Cash,
    Gold,
    Domestic,
    Foreign,
    Crypto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Won,
    Dollar,
    Gold,
    ShortTermBond,
    DomesticStock,
    Crypto,
    ForeignStock,
    DomesticEtf,
    ForeignEtf,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Won,
        Category::Dollar,
        Category::Gold,
        Category::ShortTermBond,
        Category::DomesticStock,
        Category::Crypto,
        Category::ForeignStock,
        Category::DomesticEtf,
        Category::ForeignEtf,
    ];

    /// Stored category codes start at 1 and follow declaration order.
    pub fn from_code(code: u32) -> Result<Self, EvalError> {
        let index = code.wrapping_sub(1) as usize;
        Self::ALL.get(index).copied().ok_or(EvalError::UnknownCategory(code))
    }

    pub fn code(self) -> u32 {
        self as u32 + 1
    }

    pub fn stability(self) -> Stability {
        match self {
            Category::Won | Category::Dollar | Category::Gold | Category::ShortTermBond => {
                Stability::Stable
            }
            _ => Stability::Volatile,
        }
    }

    pub fn is_stable(self) -> bool {
        self.stability() == Stability::Stable
    }

    pub fn price_source(self) -> PriceSource {
        match self {
            Category::Won | Category::Dollar => PriceSource::Cash,
            Category::Gold => PriceSource::Gold,
            Category::ShortTermBond | Category::DomesticStock | Category::DomesticEtf => {
                PriceSource::Domestic
            }
            Category::ForeignStock | Category::ForeignEtf => PriceSource::Foreign,
            Category::Crypto => PriceSource::Crypto,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Won => "won",
            Category::Dollar => "dollar",
            Category::Gold => "gold",
            Category::ShortTermBond => "short-term bond",
            Category::DomesticStock => "domestic stock",
            Category::Crypto => "crypto",
            Category::ForeignStock => "foreign stock",
            Category::DomesticEtf => "domestic etf",
            Category::ForeignEtf => "foreign etf",
        }
    }
}

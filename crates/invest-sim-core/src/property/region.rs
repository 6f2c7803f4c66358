use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvestSimError;

/// Appraisal region. Selects the land unit price and land capitalisation rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    /// Naha city
    Naha,
    /// Central and southern main island
    Chunanbu,
    /// Northern main island and the outer islands
    Hokubu,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Naha, Region::Chunanbu, Region::Hokubu];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Naha => "Naha",
            Self::Chunanbu => "Chunanbu",
            Self::Hokubu => "Hokubu",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Region {
    type Err = InvestSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Naha" | "naha" => Ok(Self::Naha),
            "Chunanbu" | "chunanbu" => Ok(Self::Chunanbu),
            "Hokubu" | "hokubu" => Ok(Self::Hokubu),
            other => Err(InvestSimError::InvalidInput {
                field: "region".into(),
                reason: format!("'{other}' is not one of Naha, Chunanbu, Hokubu"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification rules
// ---------------------------------------------------------------------------

/// Ordered rule list: the first region whose city list matches the address wins.
/// Naha is tested first so that addresses naming the capital never fall through.
///
/// Names carry their 市/町/村 suffix so that short names (本部, 金武) do not
/// match unrelated address text. 東村 is keyed with its district because the
/// bare name is a prefix of 東村山市.
const REGION_RULES: &[(Region, &[&str])] = &[
    (Region::Naha, &["那覇市"]),
    (
        Region::Chunanbu,
        &[
            "浦添市", "宜野湾市", "沖縄市", "うるま市", "糸満市", "豊見城市", "南城市",
            "西原町", "中城村", "北中城村", "北谷町", "嘉手納町", "読谷村", "与那原町",
            "八重瀬町",
        ],
    ),
    (
        Region::Hokubu,
        &[
            "名護市", "国頭村", "大宜味村", "国頭郡東村", "今帰仁村", "本部町", "恩納村",
            "宜野座村", "金武町", "伊江村", "伊平屋村", "伊是名村", "久米島町", "渡名喜村",
            "粟国村", "渡嘉敷村", "座間味村", "南大東村", "北大東村", "宮古島市", "多良間村",
            "石垣市", "竹富町", "与那国町",
        ],
    ),
];

/// Classify a free-text address into a region by literal containment of a city name.
///
/// Returns `None` when no city name appears in the address.
///
/// # Examples
///
/// ```
/// use invest_sim_core::property::region::{classify_region, Region};
///
/// assert_eq!(classify_region("那覇市おもろまち4丁目"), Some(Region::Naha));
/// assert_eq!(classify_region("沖縄市泡瀬4丁目"), Some(Region::Chunanbu));
/// assert_eq!(classify_region("Tokyo"), None);
/// ```
pub fn classify_region(address: &str) -> Option<Region> {
    REGION_RULES
        .iter()
        .find(|(_, cities)| cities.iter().any(|city| address.contains(city)))
        .map(|(region, _)| *region)
}

/// City names recognised for a region, in match order.
pub fn cities_for(region: Region) -> &'static [&'static str] {
    REGION_RULES
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, cities)| *cities)
        .unwrap_or(&[])
}

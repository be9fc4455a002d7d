//! Fixed merchandising enumerations and their category economics.
//!
//! RULE: the `ALL` arrays define sampling order. Reordering them
//! changes every dimension drawn from a given seed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Apparel,
    Footwear,
    Electronics,
    Home,
    Beauty,
    Sports,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Apparel,
        Self::Footwear,
        Self::Electronics,
        Self::Home,
        Self::Beauty,
        Self::Sports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apparel     => "Apparel",
            Self::Footwear    => "Footwear",
            Self::Electronics => "Electronics",
            Self::Home        => "Home",
            Self::Beauty      => "Beauty",
            Self::Sports      => "Sports",
        }
    }

    /// Base price range [lo, hi).
    pub fn price_range(&self) -> (f64, f64) {
        match self {
            Self::Apparel     => (25.0, 80.0),
            Self::Footwear    => (50.0, 160.0),
            Self::Electronics => (80.0, 900.0),
            Self::Home        => (20.0, 250.0),
            Self::Beauty      => (10.0, 120.0),
            Self::Sports      => (25.0, 300.0),
        }
    }

    /// Base margin rate range [lo, hi).
    pub fn margin_range(&self) -> (f64, f64) {
        match self {
            Self::Electronics => (0.12, 0.22),
            Self::Beauty      => (0.30, 0.45),
            Self::Apparel     => (0.25, 0.40),
            _                 => (0.18, 0.35),
        }
    }

    /// Fit-sensitive goods carry an extra return bump.
    pub fn is_fit_sensitive(&self) -> bool {
        matches!(self, Self::Apparel | Self::Footwear)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Brand {
    Apex,
    NorthPeak,
    UrbanCo,
    Zenith,
    CoreWear,
    Nova,
    TrailPro,
    Pulse,
}

impl Brand {
    pub const ALL: [Brand; 8] = [
        Self::Apex,
        Self::NorthPeak,
        Self::UrbanCo,
        Self::Zenith,
        Self::CoreWear,
        Self::Nova,
        Self::TrailPro,
        Self::Pulse,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Region {
    West,
    East,
    Central,
    South,
}

impl Region {
    pub const ALL: [Region; 4] = [Self::West, Self::East, Self::Central, Self::South];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::West    => "West",
            Self::East    => "East",
            Self::Central => "Central",
            Self::South   => "South",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Channel {
    Store,
    Online,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Self::Store, Self::Online];

    /// Share of order lines placed online. The remainder is in-store.
    pub const ONLINE_SHARE: f64 = 0.30;

    pub fn base_discount_rate(&self) -> f64 {
        match self {
            Self::Store  => 0.05,
            Self::Online => 0.08,
        }
    }

    pub fn base_return_probability(&self) -> f64 {
        match self {
            Self::Store  => 0.02,
            Self::Online => 0.06,
        }
    }
}

//! Star rating labels used by the catalog's product cards
//!
//! The catalog encodes ratings as a class token next to the `star-rating`
//! base class (e.g. `class="star-rating Three"`).

use std::fmt;

/// Base class carried by every rating node
pub const RATING_BASE_CLASS: &str = "star-rating";

/// A known star rating label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StarRating {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
}

impl StarRating {
    /// Numeric value of the rating, always within 0..=5
    pub fn value(&self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    /// The class token the catalog uses for this rating
    pub fn label(&self) -> &'static str {
        match self {
            Self::Zero => "Zero",
            Self::One => "One",
            Self::Two => "Two",
            Self::Three => "Three",
            Self::Four => "Four",
            Self::Five => "Five",
        }
    }

    /// Parses a class token
    ///
    /// Returns None if the token is not one of the known labels. Matching is
    /// case-sensitive, as the catalog's class names are.
    pub fn from_label(token: &str) -> Option<Self> {
        match token {
            "Zero" => Some(Self::Zero),
            "One" => Some(Self::One),
            "Two" => Some(Self::Two),
            "Three" => Some(Self::Three),
            "Four" => Some(Self::Four),
            "Five" => Some(Self::Five),
            _ => None,
        }
    }

    /// Resolves a rating from a whole `class` attribute value
    ///
    /// Picks the first token that is not the base class and maps it through
    /// the label table. A missing attribute, a missing token or an unknown
    /// token all resolve to `Zero`.
    pub fn from_class_list(classes: Option<&str>) -> Self {
        classes
            .and_then(|list| list.split_whitespace().find(|c| *c != RATING_BASE_CLASS))
            .and_then(Self::from_label)
            .unwrap_or(Self::Zero)
    }

    /// Returns all ratings in ascending order
    pub fn all() -> [Self; 6] {
        [
            Self::Zero,
            Self::One,
            Self::Two,
            Self::Three,
            Self::Four,
            Self::Five,
        ]
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

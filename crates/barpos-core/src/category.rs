#![forbid(unsafe_code)]

//! Main categories and sub-category parsing.
//!
//! Catalog categories are free text such as `"Rött vin, Kryddigt & Mustigt"`.
//! The text is split into sub-categories on `,`, `&` and the conjunctions
//! `and` / `och`; an item belongs to every [`MainCategory`] whose keyword
//! list intersects its (lower-cased) sub-categories, and to
//! [`MainCategory::Misc`] only when it matches none.

use serde::{Deserialize, Serialize};

/// Coarse grouping of catalog items.
///
/// The declaration order is the bucket order used when a view walks all
/// categories as one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainCategory {
    Misc,
    Ale,
    Whisky,
    WhiteWine,
    RedWine,
    MiscWine,
    AlcoholFree,
    Sherry,
    Vermouth,
    Cognac,
}

impl MainCategory {
    /// Number of categories, including `Misc`.
    pub const COUNT: usize = 10;

    /// Every category in bucket order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Misc,
        Self::Ale,
        Self::Whisky,
        Self::WhiteWine,
        Self::RedWine,
        Self::MiscWine,
        Self::AlcoholFree,
        Self::Sherry,
        Self::Vermouth,
        Self::Cognac,
    ];

    /// Position of this category's bucket.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lower-case sub-category keywords that place an item in this category.
    ///
    /// `Misc` has none: it collects whatever matched nothing else.
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Misc => &[],
            Self::Ale => &["öl", "ale", "beer"],
            Self::Whisky => &["whisky"],
            Self::WhiteWine => &["vitt vin", "white wine"],
            Self::RedWine => &["rött vin", "red wine"],
            Self::MiscWine => &[
                "mousserande vin",
                "fruktvin",
                "rosévin",
                "vin av flera typer",
                "vinsprit",
                "sparkling wine",
                "fruit wine",
                "rosé wine",
            ],
            Self::AlcoholFree => &["alkoholfritt", "alcohol free", "non-alcoholic"],
            Self::Sherry => &["sherry"],
            Self::Vermouth => &["vermouth"],
            Self::Cognac => &["cognac"],
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Misc => "misc",
            Self::Ale => "ale",
            Self::Whisky => "whisky",
            Self::WhiteWine => "white_wine",
            Self::RedWine => "red_wine",
            Self::MiscWine => "misc_wine",
            Self::AlcoholFree => "alcohol_free",
            Self::Sherry => "sherry",
            Self::Vermouth => "vermouth",
            Self::Cognac => "cognac",
        }
    }
}

/// Split a category string into trimmed, non-empty sub-categories.
///
/// Case is preserved; spacing inside a sub-category is normalized to single
/// spaces.
///
/// ```
/// use barpos_core::sub_categories_of;
/// assert_eq!(
///     sub_categories_of("Rött vin, Kryddigt & Mustigt"),
///     vec!["Rött vin", "Kryddigt", "Mustigt"],
/// );
/// ```
#[must_use]
pub fn sub_categories_of(category: &str) -> Vec<String> {
    let mut out = Vec::new();
    for piece in category.split([',', '&']) {
        let mut words: Vec<&str> = Vec::new();
        for word in piece.split_whitespace() {
            if is_conjunction(word) {
                flush_words(&mut words, &mut out);
            } else {
                words.push(word);
            }
        }
        flush_words(&mut words, &mut out);
    }
    out
}

fn is_conjunction(word: &str) -> bool {
    word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("och")
}

fn flush_words(words: &mut Vec<&str>, out: &mut Vec<String>) {
    if !words.is_empty() {
        out.push(words.join(" "));
        words.clear();
    }
}

/// Main categories a category string belongs to, in bucket order.
///
/// Never empty: falls back to `[Misc]`.
#[must_use]
pub fn main_categories_of(category: &str) -> Vec<MainCategory> {
    let subs: Vec<String> = sub_categories_of(category)
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();
    let found: Vec<MainCategory> = MainCategory::ALL
        .into_iter()
        .filter(|main| {
            main.keywords()
                .iter()
                .any(|kw| subs.iter().any(|sub| sub == kw))
        })
        .collect();
    if found.is_empty() {
        vec![MainCategory::Misc]
    } else {
        found
    }
}

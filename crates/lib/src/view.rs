//! Filter/sort derivation of the bill list.
//!
//! Nothing here is stored: the display list is recomputed from the catalog and the two
//! controls whenever either changes.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::model::Bill;

/// Earliest year offered by the year selector.
pub const FIRST_YEAR: u16 = 1947;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YearFilter {
    #[default]
    All,
    Year(u16),
}

impl YearFilter {
    /// Loose match: the year appears anywhere in the free-text date.
    pub fn matches(self, bill: &Bill) -> bool {
        match self {
            YearFilter::All => true,
            YearFilter::Year(y) => bill.date.contains(&y.to_string()),
        }
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => f.write_str("all"),
            YearFilter::Year(y) => write!(f, "{y}"),
        }
    }
}

impl FromStr for YearFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(YearFilter::All);
        }
        // No leading zero: matching compares the year's digits.
        if s.len() == 4 && !s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(y) = s.parse() {
                return Ok(YearFilter::Year(y));
            }
        }
        Err(format!("invalid year filter {s:?}: expected \"all\" or a 4-digit year"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Recent,
    Oldest,
    TitleAsc,
    TitleDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Recent, SortKey::Oldest, SortKey::TitleAsc, SortKey::TitleDesc];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Recent => "recent",
            SortKey::Oldest => "oldest",
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
        }
    }

    /// Human label for selectors.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Recent => "Most Recent",
            SortKey::Oldest => "Oldest First",
            SortKey::TitleAsc => "Title (A-Z)",
            SortKey::TitleDesc => "Title (Z-A)",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid sort key {s:?}: expected recent, oldest, title-asc or title-desc"))
    }
}

const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%b %d %Y", "%B %d %Y", "%d %B %Y", "%d %b %Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Calendar date embedded in a bill's date descriptor. Text after the first `" on "` is used
/// when present ("Introduced on Jan 1, 2020"), otherwise the whole field.
pub fn parse_bill_date(descriptor: &str) -> Option<NaiveDate> {
    let raw = match descriptor.find(" on ") {
        Some(i) => &descriptor[i + 4..],
        None => descriptor,
    };
    let raw = raw.trim().trim_end_matches('.').replace("Sept ", "Sep ");
    let raw = raw.replace('.', "");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&raw, fmt).ok())
        .or_else(|| {
            // Month and year only.
            let padded = format!("1 {raw}");
            ["%d %B %Y", "%d %b %Y"]
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&padded, fmt).ok())
        })
}

fn compare_titles(a: &Bill, b: &Bill) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

/// Bills passing `year`, ordered by `sort`.
///
/// Date sorts only reorder bills whose date parses; undated bills keep their positions and
/// the dated ones are sorted into the remaining slots.
pub fn display_list<'a>(bills: &'a [Bill], year: YearFilter, sort: SortKey) -> Vec<&'a Bill> {
    let mut list: Vec<&Bill> = bills.iter().filter(|b| year.matches(b)).collect();
    match sort {
        SortKey::TitleAsc => list.sort_by(|a, b| compare_titles(a, b)),
        SortKey::TitleDesc => list.sort_by(|a, b| compare_titles(b, a)),
        SortKey::Recent | SortKey::Oldest => {
            let slots: Vec<(usize, NaiveDate)> = list
                .iter()
                .enumerate()
                .filter_map(|(i, b)| parse_bill_date(&b.date).map(|d| (i, d)))
                .collect();
            let mut dated: Vec<(&Bill, NaiveDate)> = slots.iter().map(|&(i, d)| (list[i], d)).collect();
            if sort == SortKey::Recent {
                dated.sort_by(|a, b| b.1.cmp(&a.1));
            } else {
                dated.sort_by(|a, b| a.1.cmp(&b.1));
            }
            for (&(slot, _), (bill, _)) in slots.iter().zip(dated) {
                list[slot] = bill;
            }
        }
    }
    list
}

/// The bill that should be selected after the list was recomputed: the current selection if
/// still listed, else the first listed bill, else none.
pub fn reconcile_selection<'a>(list: &[&'a Bill], selected: Option<&str>) -> Option<&'a Bill> {
    selected
        .and_then(|id| list.iter().copied().find(|b| b.id == id))
        .or_else(|| list.first().copied())
}

/// Current calendar year (local time).
pub fn current_year() -> u16 {
    use chrono::Datelike;
    u16::try_from(chrono::Local::now().year()).unwrap_or(FIRST_YEAR)
}

/// "all" followed by every year from `current_year` down to 1947.
pub fn year_options(current_year: u16) -> Vec<YearFilter> {
    std::iter::once(YearFilter::All)
        .chain((FIRST_YEAR..=current_year.max(FIRST_YEAR)).rev().map(YearFilter::Year))
        .collect()
}

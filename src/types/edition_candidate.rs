use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)([1-9]\d{3})(?:\D|$)").expect("static regex"));

const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %e, %Y",
    "%Y-%m-%d",
    "%d %B %Y",
    "%d %b %Y",
    "%Y/%m/%d",
];

/// Dates without a day, ranked as the first of their month.
const MONTH_FORMATS: &[&str] = &["%B %Y", "%b %Y", "%b. %Y", "%Y-%m", "%Y/%m"];

/// Data taken from one scanned edition while resolving a work.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct EditionCandidate {
    pub publication_year: Option<i32>,
    pub cover_reference:  Option<String>,
    /// Ordering key for "most recently published"
    pub recency:          Option<NaiveDate>,
}

impl EditionCandidate {
    pub fn new(publish_date: Option<&str>, cover_reference: Option<String>) -> Self {
        let publication_year = publish_date.and_then(parse_year);
        let recency = publish_date
            .and_then(parse_date)
            .or_else(|| publication_year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)));
        Self {
            publication_year,
            cover_reference,
            recency,
        }
    }
}

/// First standalone four digit year in an upstream `publish_date`.
///
/// Upstream dates are free text: `"1954"`, `"July 29, 1954"`, `"c1954"`,
/// `"[1987?]"` and `"2001-05-01"` all occur.
pub fn parse_year(publish_date: &str) -> Option<i32> {
    YEAR.captures(publish_date)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn parse_date(publish_date: &str) -> Option<NaiveDate> {
    let publish_date = publish_date.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(publish_date, format).ok())
        .or_else(|| {
            let first_of_month = format!("1 {publish_date}");
            MONTH_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(&first_of_month, &format!("%d {format}")).ok()
            })
        })
}

/// Earliest valid year across the candidates.
pub fn earliest_year<'a>(candidates: impl IntoIterator<Item = &'a EditionCandidate>) -> Option<i32> {
    candidates
        .into_iter()
        .filter_map(|x| x.publication_year)
        .min()
}

/// Cover of the most recently published candidate that has one.
///
/// Undated candidates rank below every dated one. Among equally recent
/// candidates the first one wins.
pub fn freshest_cover<'a>(
    candidates: impl IntoIterator<Item = &'a EditionCandidate>,
) -> Option<String> {
    let mut best: Option<&EditionCandidate> = None;
    for candidate in candidates {
        if candidate.cover_reference.is_none() {
            continue;
        }
        match best {
            Some(b) if candidate.recency <= b.recency => {}
            _ => best = Some(candidate),
        }
    }
    best.and_then(|x| x.cover_reference.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate(date: Option<&str>, cover: Option<&str>) -> EditionCandidate {
        EditionCandidate::new(date, cover.map(String::from))
    }

    #[test]
    fn years_from_free_text() {
        assert_eq!(parse_year("1954"), Some(1954));
        assert_eq!(parse_year("July 29, 1954"), Some(1954));
        assert_eq!(parse_year("c1954"), Some(1954));
        assert_eq!(parse_year("[1987?]"), Some(1987));
        assert_eq!(parse_year("2001-05-01"), Some(2001));
        assert_eq!(parse_year("19540"), None);
        assert_eq!(parse_year("0999"), None);
        assert_eq!(parse_year("unknown"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn recency_uses_full_date_when_available() {
        let c = candidate(Some("July 29, 1954"), None);
        assert_eq!(c.recency, NaiveDate::from_ymd_opt(1954, 7, 29));
        let c = candidate(Some("1954"), None);
        assert_eq!(c.recency, NaiveDate::from_ymd_opt(1954, 1, 1));
        let c = candidate(None, None);
        assert_eq!(c.recency, None);
    }

    #[test]
    fn month_year_dates_rank_by_month() {
        for date in ["December 2001", "Dec 2001", "Dec. 2001", "2001-12", "2001/12"] {
            assert_eq!(
                candidate(Some(date), None).recency,
                NaiveDate::from_ymd_opt(2001, 12, 1),
                "{date}"
            );
        }
        let candidates = vec![
            candidate(Some("March 3, 2001"), Some("march")),
            candidate(Some("December 2001"), Some("december")),
        ];
        assert_eq!(freshest_cover(&candidates), Some("december".into()));
    }

    #[test]
    fn earliest_year_and_freshest_cover_are_independent() {
        let candidates = vec![
            candidate(Some("1987"), Some("a")),
            candidate(Some("1954"), None),
            candidate(Some("2001"), Some("b")),
            candidate(None, Some("c")),
        ];
        assert_eq!(earliest_year(&candidates), Some(1954));
        assert_eq!(freshest_cover(&candidates), Some("b".into()));
    }

    #[test]
    fn first_of_tied_most_recent_wins() {
        let candidates = vec![
            candidate(Some("2001"), None),
            candidate(Some("2001"), Some("first")),
            candidate(Some("2001"), Some("second")),
        ];
        assert_eq!(freshest_cover(&candidates), Some("first".into()));
    }

    #[test]
    fn undated_cover_only_as_fallback() {
        let candidates = vec![candidate(None, Some("undated")), candidate(Some("1990"), None)];
        assert_eq!(freshest_cover(&candidates), Some("undated".into()));
        assert_eq!(earliest_year(&candidates), Some(1990));
    }

    #[test]
    fn nothing_to_choose() {
        let candidates: Vec<EditionCandidate> = vec![];
        assert_eq!(earliest_year(&candidates), None);
        assert_eq!(freshest_cover(&candidates), None);
    }
}

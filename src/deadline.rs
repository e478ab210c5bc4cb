use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// A labelled pattern capturing a date fragment from listing text.
struct DeadlinePattern {
    label: &'static str,
    regex: Regex,
}

// Tried in order; the first pattern whose fragment parses wins.
static PATTERNS: LazyLock<Vec<DeadlinePattern>> = LazyLock::new(|| {
    vec![
        DeadlinePattern {
            label: "english",
            regex: Regex::new(r"Deadline:\s*(\w+ \d{2},? \d{4})").expect("valid regex"),
        },
        DeadlinePattern {
            label: "german",
            regex: Regex::new(r"Bewerbungsschluss:\s*(\d{2}\.\d{2}\.\d{4})").expect("valid regex"),
        },
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateFormat {
    /// 15.03.2024
    DayMonthYear,
    /// March 15, 2024
    MonthNameDayYear,
}

impl DateFormat {
    fn for_fragment(fragment: &str) -> Self {
        if fragment.contains('.') {
            DateFormat::DayMonthYear
        } else {
            DateFormat::MonthNameDayYear
        }
    }

    fn parse(self, fragment: &str) -> Option<NaiveDate> {
        match self {
            DateFormat::DayMonthYear => NaiveDate::parse_from_str(fragment, "%d.%m.%Y").ok(),
            DateFormat::MonthNameDayYear => NaiveDate::parse_from_str(fragment, "%B %d, %Y")
                .or_else(|_| NaiveDate::parse_from_str(fragment, "%B %d %Y"))
                .ok(),
        }
    }
}

/// Extract the application deadline from free listing text.
///
/// A fragment that matches a pattern but is not a real date is logged and the
/// next pattern is tried. No match at all is a normal outcome.
pub fn parse_deadline(text: &str) -> Option<NaiveDate> {
    for pattern in PATTERNS.iter() {
        let Some(caps) = pattern.regex.captures(text) else {
            continue;
        };
        let fragment = &caps[1];
        match DateFormat::for_fragment(fragment).parse(fragment) {
            Some(date) => {
                log::debug!("stage=deadline pattern={} date={}", pattern.label, date);
                return Some(date);
            }
            None => log::warn!("Failed to parse date: {} (pattern={})", fragment, pattern.label),
        }
    }
    log::warn!("No valid deadline found in: {}", text);
    None
}

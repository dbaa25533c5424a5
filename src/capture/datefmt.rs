//! Logseq date-format rendering.
//!
//! Logseq configures journal/date display with date-fns style tokens
//! (`yyyy-MM-dd`, `do MMM yyyy`, `yyyy年MM月dd日`, ...). chrono speaks
//! strftime, so a small scanner maps the token set Logseq's picker offers
//! onto chrono fields; unknown characters pass through literally.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Render `dt` against a Logseq date-format string.
pub fn format_logseq_date(dt: &NaiveDateTime, format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;
    while let Some(ch) = rest.chars().next() {
        if let Some((consumed, rendered)) = next_token(rest, dt) {
            out.push_str(&rendered);
            rest = &rest[consumed..];
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

/// Longest-match token table. Returns the byte length consumed and the
/// rendered field, or `None` when `rest` starts with a literal character.
fn next_token(rest: &str, dt: &NaiveDateTime) -> Option<(usize, String)> {
    const TOKENS: [&str; 19] = [
        "yyyy", "EEEE", "MMMM", "MMM", "EEE", "EE", "yy", "MM", "dd", "do", "HH", "mm", "ss",
        "E", "M", "d", "H", "m", "s",
    ];
    let token = TOKENS.iter().find(|t| rest.starts_with(**t))?;
    let rendered = match *token {
        "yyyy" => format!("{:04}", dt.year()),
        "yy" => format!("{:02}", dt.year() % 100),
        "MMMM" => dt.format("%B").to_string(),
        "MMM" => dt.format("%b").to_string(),
        "MM" => format!("{:02}", dt.month()),
        "M" => dt.month().to_string(),
        "dd" => format!("{:02}", dt.day()),
        "do" => format!("{}{}", dt.day(), ordinal_suffix(dt.day())),
        "d" => dt.day().to_string(),
        "EEEE" => dt.format("%A").to_string(),
        "EEE" | "EE" | "E" => dt.format("%a").to_string(),
        "HH" => format!("{:02}", dt.hour()),
        "H" => dt.hour().to_string(),
        "mm" => format!("{:02}", dt.minute()),
        "m" => dt.minute().to_string(),
        "ss" => format!("{:02}", dt.second()),
        "s" => dt.second().to_string(),
        _ => unreachable!(),
    };
    Some((token.len(), rendered))
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 8, 19)
            .unwrap()
            .and_hms_opt(16, 31, 0)
            .unwrap()
    }

    #[test]
    fn test_iso_style() {
        assert_eq!(format_logseq_date(&fixed(), "yyyy-MM-dd"), "2021-08-19");
    }

    #[test]
    fn test_ordinal_day_with_month_name() {
        assert_eq!(format_logseq_date(&fixed(), "do MMM yyyy"), "19th Aug 2021");
        assert_eq!(format_logseq_date(&fixed(), "MMM do, yyyy"), "Aug 19th, 2021");
    }

    #[test]
    fn test_weekday_forms() {
        assert_eq!(format_logseq_date(&fixed(), "E, dd-MM-yyyy"), "Thu, 19-08-2021");
        assert_eq!(
            format_logseq_date(&fixed(), "EEEE, MM/dd/yyyy"),
            "Thursday, 08/19/2021"
        );
    }

    #[test]
    fn test_cjk_literals_pass_through() {
        assert_eq!(format_logseq_date(&fixed(), "yyyy年MM月dd日"), "2021年08月19日");
    }

    #[test]
    fn test_time_tokens() {
        assert_eq!(format_logseq_date(&fixed(), "HH:mm"), "16:31");
    }

    #[test]
    fn test_ordinal_suffixes() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(31), "st");
    }
}

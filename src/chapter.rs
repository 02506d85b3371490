//! Chapter-number extraction from chapter archive names.
//!
//! Chapter archives are expected to be named `<series> <number>.cbz`, e.g.
//! `"Berserk 12.5.cbz"`. The chapter token is the second whitespace-separated
//! word of the file stem. Anything else is a [`Error::MalformedChapterName`],
//! which callers treat as a skip rather than a failure.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::path_utils::get_file_name_lossy;
use crate::types::{ChapterFile, ChapterNumber, ParsedChapter};

lazy_static! {
    /// Plain decimal: "12", "012", "12.5", "12." or ".5". No sign, no exponent.
    static ref CHAPTER_TOKEN_REGEX: Regex = Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)$").unwrap();
}

/// Strips the final extension, if any.
fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// Extracts the chapter token and its numeric value from a file name.
///
/// The extension is stripped before splitting, so `"Series 12.5.cbz"` yields
/// `("12.5", 12.5)`. Runs of whitespace count as one separator.
pub fn parse_chapter_name(file_name: &str) -> Result<(&str, ChapterNumber)> {
    let malformed = |reason: &str| Error::MalformedChapterName {
        name: file_name.to_string(),
        reason: reason.to_string(),
    };

    let token = file_stem(file_name)
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| malformed("expected '<series> <chapter-number>'"))?;

    if !CHAPTER_TOKEN_REGEX.is_match(token) {
        return Err(malformed(&format!("'{}' is not a chapter number", token)));
    }

    let number = token
        .parse::<f64>()
        .ok()
        .and_then(ChapterNumber::new)
        .ok_or_else(|| malformed(&format!("'{}' is out of range", token)))?;

    Ok((token, number))
}

impl ParsedChapter {
    /// Parses the chapter archive at `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = get_file_name_lossy(path);
        let (token, number) = parse_chapter_name(&name)?;
        let token = token.to_string();

        Ok(Self {
            file: ChapterFile {
                name,
                path: path.to_path_buf(),
                token,
            },
            number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_of(name: &str) -> Option<f64> {
        parse_chapter_name(name).ok().map(|(_, n)| n.value())
    }

    #[test]
    fn test_parses_second_token() {
        assert_eq!(number_of("Series 1.cbz"), Some(1.0));
        assert_eq!(number_of("Series 012.cbz"), Some(12.0));
        assert_eq!(number_of("Series 12.5.cbz"), Some(12.5));
        assert_eq!(parse_chapter_name("Series 12.5.cbz").unwrap().0, "12.5");
    }

    #[test]
    fn test_extra_whitespace_is_collapsed() {
        assert_eq!(number_of("Series   7.cbz"), Some(7.0));
        assert_eq!(number_of("Series\t8.cbz"), Some(8.0));
        assert_eq!(number_of("  Series 9.cbz"), Some(9.0));
    }

    #[test]
    fn test_trailing_words_are_ignored() {
        assert_eq!(number_of("Series 3 (digital).cbz"), Some(3.0));
    }

    #[test]
    fn test_missing_number_is_malformed() {
        let err = parse_chapter_name("BadName.cbz").unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("BadName.cbz"));

        assert!(parse_chapter_name("Series.cbz").is_err());
        assert!(parse_chapter_name("").is_err());
    }

    #[test]
    fn test_non_numeric_token_is_malformed() {
        assert!(parse_chapter_name("Series Chapter 3.cbz").is_err());
        assert!(parse_chapter_name("Series 3a.cbz").is_err());
        assert!(parse_chapter_name("Series -3.cbz").is_err());
        assert!(parse_chapter_name("Series 1e3.cbz").is_err());
        assert!(parse_chapter_name("Series inf.cbz").is_err());
        assert!(parse_chapter_name("Series NaN.cbz").is_err());
    }

    #[test]
    fn test_huge_number_is_out_of_range() {
        let err = parse_chapter_name("S 99999999999999999999.cbz").unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("out of range"));
        assert!(parse_chapter_name("S 1000000000.5.cbz").is_err());
        assert_eq!(number_of("S 1000000000.cbz"), Some(1_000_000_000.0));
    }

    #[test]
    fn test_candidate_slot_is_ceiling() {
        let (_, n) = parse_chapter_name("Series 12.1.cbz").unwrap();
        assert_eq!(n.candidate_slot(), 13);
        let (_, n) = parse_chapter_name("Series 12.cbz").unwrap();
        assert_eq!(n.candidate_slot(), 12);
    }

    #[test]
    fn test_from_path_keeps_name_and_token() {
        let chapter = ParsedChapter::from_path(Path::new("cbz/Series 4.5.cbz")).unwrap();
        assert_eq!(chapter.file.name, "Series 4.5.cbz");
        assert_eq!(chapter.file.token, "4.5");
        assert_eq!(chapter.number.value(), 4.5);
    }
}

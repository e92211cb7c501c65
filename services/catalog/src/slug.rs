//! URL slug generation for movie titles
//!
//! Titles are mostly Vietnamese, so the precomposed vowel clusters are folded
//! through an explicit table first and canonical decomposition only mops up
//! whatever marks are left. Anything that is not ASCII after that is dropped.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Longest slug a movie record may carry, in code points
pub const MAX_SLUG_LEN: usize = 250;

fn disallowed_chars() -> &'static Regex {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    DISALLOWED.get_or_init(|| Regex::new(r"[^a-z0-9\s-]").expect("Failed to compile slug regex"))
}

fn whitespace_runs() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"))
}

fn hyphen_runs() -> &'static Regex {
    static HYPHENS: OnceLock<Regex> = OnceLock::new();
    HYPHENS.get_or_init(|| Regex::new(r"-{2,}").expect("Failed to compile hyphen regex"))
}

/// Build a lowercase, hyphen-separated ASCII slug from a title
///
/// The result matches `^[a-z0-9]+(-[a-z0-9]+)*$` or is empty. An empty slug
/// means the title had nothing usable in it; callers must reject it.
///
/// ```text
/// "Cô Ba Sài Gòn" -> "co-ba-sai-gon"
/// "Đà Lạt!!"      -> "da-lat"
/// ```
pub fn generate_slug(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }

    let folded: String = title.to_lowercase().chars().map(fold_vietnamese).collect();

    let stripped: String = folded.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let ascii = disallowed_chars().replace_all(&stripped, "");
    let hyphenated = whitespace_runs().replace_all(&ascii, "-");
    let trimmed = hyphenated.trim_matches('-');

    hyphen_runs().replace_all(trimmed, "-").into_owned()
}

/// Fold a lowercase Vietnamese letter to its base Latin letter
///
/// `đ` has no canonical decomposition, so it only goes through this table.
fn fold_vietnamese(c: char) -> char {
    match c {
        'á' | 'à' | 'ả' | 'ã' | 'ạ' | 'â' | 'ấ' | 'ầ' | 'ẩ' | 'ẫ' | 'ậ' | 'ă' | 'ắ' | 'ằ'
        | 'ẳ' | 'ẵ' | 'ặ' => 'a',
        'é' | 'è' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ế' | 'ề' | 'ể' | 'ễ' | 'ệ' => 'e',
        'í' | 'ì' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ó' | 'ò' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ố' | 'ồ' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ớ' | 'ờ'
        | 'ở' | 'ỡ' | 'ợ' => 'o',
        'ú' | 'ù' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ứ' | 'ừ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ý' | 'ỳ' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

/// Whether `slug` is already in canonical form
pub fn is_canonical(slug: &str) -> bool {
    static CANONICAL: OnceLock<Regex> = OnceLock::new();
    CANONICAL
        .get_or_init(|| {
            Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("Failed to compile canonical regex")
        })
        .is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ascii_title() {
        assert_eq!(generate_slug("Interstellar"), "interstellar");
    }

    #[test]
    fn test_vietnamese_title() {
        assert_eq!(generate_slug("Cô Ba Sài Gòn"), "co-ba-sai-gon");
        assert_eq!(generate_slug("Đà Lạt!!"), "da-lat");
        assert_eq!(generate_slug("Bố Già"), "bo-gia");
        assert_eq!(generate_slug("Mắt Biếc"), "mat-biec");
        assert_eq!(generate_slug("Người Phán Xử"), "nguoi-phan-xu");
        assert_eq!(generate_slug("ĐỘI ĐẶC NHIỆM"), "doi-dac-nhiem");
    }

    #[test]
    fn test_blank_and_empty_input() {
        assert_eq!(generate_slug(""), "");
        assert_eq!(generate_slug("   "), "");
        assert_eq!(generate_slug("\t\n"), "");
    }

    #[test]
    fn test_only_punctuation_yields_empty() {
        assert_eq!(generate_slug("!!! ??? ..."), "");
        assert_eq!(generate_slug("\u{0301}\u{0300}"), "");
    }

    #[test]
    fn test_adjacent_separators_collapse() {
        assert_eq!(generate_slug("A - B"), "a-b");
        assert_eq!(generate_slug("A!!B"), "ab");
        assert_eq!(generate_slug("Fast -- & -- Furious"), "fast-furious");
        assert_eq!(generate_slug("--Leading and trailing--"), "leading-and-trailing");
    }

    #[test]
    fn test_latin_diacritics_outside_table_are_stripped() {
        assert_eq!(generate_slug("Amélie"), "amelie");
        assert_eq!(generate_slug("Pokémon: Mewtwo Strikes Back"), "pokemon-mewtwo-strikes-back");
        assert_eq!(generate_slug("Ñoño über"), "nono-uber");
    }

    #[test]
    fn test_decomposed_input_matches_precomposed() {
        let decomposed = "Co\u{0302} Ba Sa\u{0300}i Go\u{0300}n";
        assert_eq!(generate_slug(decomposed), "co-ba-sai-gon");
    }

    #[test]
    fn test_non_latin_scripts_are_dropped() {
        assert_eq!(generate_slug("千と千尋の神隠し"), "");
        assert_eq!(generate_slug("Spirited Away 千と千尋"), "spirited-away");
    }

    #[test]
    fn test_digits_survive() {
        assert_eq!(generate_slug("2001: A Space Odyssey"), "2001-a-space-odyssey");
        assert_eq!(generate_slug("Hai Phượng 2"), "hai-phuong-2");
    }

    #[test]
    fn test_output_is_canonical_or_empty() {
        let samples = [
            "Interstellar",
            "Cô Ba Sài Gòn",
            "   ",
            "Đà Lạt!!",
            "A - B",
            "A!!B",
            " -- ",
            "x",
            "Tết Ở Làng Địa Ngục",
            "Ròm (2019) — bản đặc biệt",
            "a\u{00A0}b",
        ];
        for sample in samples {
            let slug = generate_slug(sample);
            assert!(
                slug.is_empty() || is_canonical(&slug),
                "{:?} produced non-canonical slug {:?}",
                sample,
                slug
            );
        }
    }

    #[test]
    fn test_generate_slug_is_idempotent() {
        let samples = ["Interstellar", "Cô Ba Sài Gòn", "Đà Lạt!!", "A - B", "  -x-  y- ", ""];
        for sample in samples {
            let once = generate_slug(sample);
            assert_eq!(generate_slug(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("co-ba-sai-gon"));
        assert!(!is_canonical("co--ba"));
        assert!(!is_canonical("-co"));
        assert!(!is_canonical("Co"));
        assert!(!is_canonical(""));
    }
}

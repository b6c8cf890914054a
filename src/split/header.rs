//! Header matching
//!
//! Decides whether a paragraph is a given annex header despite translation
//! and typesetting differences. Stages are tried in order:
//!
//! 1. exact match of the normalized word sequences
//! 2. the header's words appear as a contiguous word run in the paragraph
//! 3. fuzzy: with annex words and generic trailing words removed, one word
//!    sequence contains the other and both carry the same annex numerals
//!
//! Normalization lowercases, splits on Unicode word boundaries (dropping
//! punctuation and collapsing whitespace) and rewrites Arabic numerals 1-10
//! as Roman numerals, so `Annex 1.` and `ANNEX I` normalize alike.

use unicode_segmentation::UnicodeSegmentation;

/// Words for "annex" across the EU/EEA languages
const ANNEX_WORDS: &[&str] = &[
    "annex", "annexe", "anhang", "bijlage", "lisa", "παραρτημα", "παράρτημα", "pielikums",
    "priedas", "anexo", "prilog", "priloga", "liite", "bilaga", "allegato", "anness", "bilag",
    "viðauki", "vedlegg", "příloha", "aneks", "príloha", "приложение", "melléklet", "anexa",
];

/// Generic words that trail annex titles
const SUFFIX_WORDS: &[&str] = &[
    "summary", "product", "characteristics", "leaflet", "package", "labelling", "labeling",
    "information", "of", "the", "and",
];

const ROMAN: [&str; 10] = ["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Exact,
    Words,
    Fuzzy,
}

/// Normalized words of a text
pub fn normalize_words(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|word| {
            let word = word.to_lowercase();
            match word.parse::<usize>() {
                Ok(n @ 1..=10) => ROMAN[n - 1].to_string(),
                _ => word,
            }
        })
        .collect()
}

/// Normalized text: lowercase words joined by single spaces
pub fn normalize_text_for_matching(text: &str) -> String {
    normalize_words(text).join(" ")
}

fn is_numeral(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| matches!(c, 'i' | 'v' | 'x'))
}

fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|window| window == needle)
}

/// Words left after dropping annex words and trailing generic words,
/// plus whether an annex word was present
fn clean_words(words: &[String]) -> (Vec<String>, bool) {
    let mut had_annex_word = false;
    let mut cleaned: Vec<String> = words
        .iter()
        .filter(|word| {
            let annex = ANNEX_WORDS.contains(&word.as_str());
            had_annex_word |= annex;
            !annex
        })
        .cloned()
        .collect();

    while cleaned
        .last()
        .is_some_and(|word| SUFFIX_WORDS.contains(&word.as_str()))
    {
        cleaned.pop();
    }

    (cleaned, had_annex_word)
}

fn numerals(words: &[String]) -> Vec<&str> {
    let mut found: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|word| is_numeral(word))
        .collect();
    found.sort_unstable();
    found.dedup();
    found
}

fn fuzzy_match(paragraph: &[String], header: &[String]) -> bool {
    let (para_clean, para_annex) = clean_words(paragraph);
    let (header_clean, header_annex) = clean_words(header);
    if para_clean.is_empty() || header_clean.is_empty() {
        return false;
    }
    if numerals(&para_clean) != numerals(&header_clean) {
        return false;
    }

    let (short, long) = if para_clean.len() <= header_clean.len() {
        (&para_clean, &header_clean)
    } else {
        (&header_clean, &para_clean)
    };
    if !contains_sequence(long, short) {
        return false;
    }

    // A bare numeral only identifies an annex when both sides named one
    !short.iter().all(|word| is_numeral(word)) || (para_annex && header_annex)
}

/// Which stage, if any, accepts `paragraph` as `header`
pub fn match_header(paragraph: &str, header: &str) -> Option<MatchStage> {
    let header_words = normalize_words(header);
    if header_words.is_empty() {
        return None;
    }
    let paragraph_words = normalize_words(paragraph);
    if paragraph_words.is_empty() {
        return None;
    }

    if paragraph_words == header_words {
        return Some(MatchStage::Exact);
    }
    if contains_sequence(&paragraph_words, &header_words) {
        return Some(MatchStage::Words);
    }
    if fuzzy_match(&paragraph_words, &header_words) {
        return Some(MatchStage::Fuzzy);
    }
    None
}

pub fn is_header_match(paragraph: &str, header: &str) -> bool {
    match_header(paragraph, header).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_drops_punctuation_and_unifies_numerals() {
        assert_eq!(normalize_text_for_matching("  ANNEX 1.  "), "annex i");
        assert_eq!(normalize_text_for_matching("B. PACKAGE  LEAFLET"), "b package leaflet");
    }

    #[test]
    fn stages_in_order() {
        assert_eq!(match_header("ANNEX I", "Annex I"), Some(MatchStage::Exact));
        assert_eq!(
            match_header("ANNEX I SUMMARY OF PRODUCT CHARACTERISTICS", "ANNEX I"),
            Some(MatchStage::Words)
        );
        assert_eq!(match_header("ANNEXE I", "ANNEX I"), Some(MatchStage::Fuzzy));
    }

    #[test]
    fn distinct_annexes_do_not_match() {
        assert_eq!(match_header("ANNEX II", "ANNEX I"), None);
        assert_eq!(match_header("ANNEX IIIB", "ANNEX I"), None);
        assert_eq!(match_header("ANNEX I", "ANNEX II"), None);
        assert_eq!(match_header("Figure I", "ANNEX I"), None);
    }

    #[test]
    fn translated_headers() {
        assert!(is_header_match("I. MELLÉKLET", "I. melléklet"));
        assert!(is_header_match("ΠΑΡΑΡΤΗΜΑ Ι", "ΠΑΡΑΡΤΗΜΑ Ι"));
        assert!(is_header_match("B. NOTICE", "B. NOTICE"));
    }
}

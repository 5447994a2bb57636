use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonical form of a team name used as the join key between rosters,
/// match records and the directory.
///
/// Decomposes, drops diacritics, lowercases, removes punctuation and
/// collapses whitespace, so "Mbabane Swallows", " mbabane swallows " and
/// "MBABANE SWALLOWS" all map to "mbabane swallows".
pub fn normalize(name: &str) -> String {
    let folded: String = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    folded.split_whitespace().collect::<Vec<&str>>().join(" ")
}

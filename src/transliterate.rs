//! Filename normalization.
//!
//! Cyrillic letters are transliterated to Latin, case is preserved and every
//! character that is neither alphanumeric nor transliterable becomes `_`.
//!
//! ```
//! use dirsort::transliterate::normalize;
//!
//! assert_eq!(normalize("Звіт"), "Zvit");
//! assert_eq!(normalize("Щоденник 2024"), "Shchodennyk_2024");
//! ```

/// Returns the Latin form of a lowercase Cyrillic letter.
fn latin_for(lower: char) -> Option<&'static str> {
    let latin = match lower {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' => "ie",
        'ж' => "zh",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' => "yi",
        'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ю' => "iu",
        'я' => "ia",
        'ы' => "y",
        'э' => "e",
        'ё' => "io",
        'ъ' | 'ь' => "",
        _ => return None,
    };
    Some(latin)
}

/// Single-character lowercase mapping, or `None` when lowercasing expands.
fn single_lowercase(ch: char) -> Option<char> {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn push_capitalized(out: &mut String, latin: &str) {
    let mut chars = latin.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}

/// Normalizes a filename stem (no extension).
///
/// Uppercase Cyrillic letters produce a capitalized expansion (`Щ` → `Shch`),
/// lowercase ones the plain expansion. Alphanumerics outside the table are kept
/// unchanged; everything else is replaced by a single underscore.
pub fn normalize(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());

    for ch in stem.chars() {
        let latin = single_lowercase(ch).and_then(latin_for);

        match latin {
            Some(latin) if ch.is_uppercase() => push_capitalized(&mut out, latin),
            Some(latin) => out.push_str(latin),
            None if ch.is_alphanumeric() => out.push(ch),
            None => out.push('_'),
        }
    }

    out
}

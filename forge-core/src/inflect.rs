//! Heuristic English inflection for table and entity names.
//!
//! Only the last `_`-separated segment of a compound is inflected, so
//! `order_item` becomes `order_items`. Leading capitalization is preserved.

const UNCOUNTABLE: &[&str] = &[
    "data",
    "metadata",
    "information",
    "equipment",
    "media",
    "series",
    "species",
    "news",
    "feedback",
    "settings",
];

/// Endings of singulars that already end in a silent `e` before the
/// sibilant, so their plural only adds `s` (`house`, `size`, `case`).
const SILENT_E_ENDINGS: &[&str] = &[
    "ouse", "ause", "ase", "ise", "ose", "urse", "erse", "orse", "ulse", "ense", "onse", "anse",
    "ize", "aze", "eze", "oze", "uze", "yze",
];

/// Sibilant singulars whose `-es` plural would otherwise look like a
/// silent-`e` word (`gases` is not the plural of `gase`).
const SIBILANT_SINGULARS: &[&str] = &["gas", "lens", "bias", "alias", "atlas", "canvas", "quiz"];

/// (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
    ("criterion", "criteria"),
    ("knife", "knives"),
    ("life", "lives"),
    ("wife", "wives"),
    ("leaf", "leaves"),
    ("half", "halves"),
    ("shelf", "shelves"),
    ("wolf", "wolves"),
    ("thief", "thieves"),
    ("hero", "heroes"),
    ("potato", "potatoes"),
    ("tomato", "tomatoes"),
    ("movie", "movies"),
    ("cache", "caches"),
];

/// Pluralize a noun (`category` -> `categories`, `person` -> `people`).
pub fn pluralize(word: &str) -> String {
    inflect_last_segment(word, pluralize_lower)
}

/// Singularize a noun (`categories` -> `category`, `people` -> `person`).
pub fn singularize(word: &str) -> String {
    inflect_last_segment(word, singularize_lower)
}

/// Whether the word looks like a plural.
pub fn is_plural(word: &str) -> bool {
    !singularize(word).eq_ignore_ascii_case(word)
}

fn inflect_last_segment(word: &str, f: fn(&str) -> String) -> String {
    match word.rfind('_') {
        Some(idx) if idx + 1 < word.len() => {
            format!("{}{}", &word[..=idx], restore_case(&word[idx + 1..], f))
        }
        _ => restore_case(word, f),
    }
}

fn restore_case(word: &str, f: fn(&str) -> String) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    let inflected = f(&lower);

    let all_upper = word.len() > 1 && word.chars().all(|c| !c.is_lowercase());
    if all_upper {
        return inflected.to_uppercase();
    }
    if word.chars().next().is_some_and(char::is_uppercase) {
        // Keep inner capitals from camel-cased input (`BlogPost` -> `BlogPosts`).
        let shared = word
            .chars()
            .zip(inflected.chars())
            .take_while(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
            .count();
        let head: String = word.chars().take(shared).collect();
        let tail: String = inflected.chars().skip(shared).collect();
        return head + &tail;
    }
    inflected
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn pluralize_lower(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == word) {
        return plural.to_string();
    }
    if IRREGULAR.iter().any(|(_, p)| *p == word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{}ies", stem);
        }
    }
    if let Some(stem) = word.strip_suffix("sis") {
        return format!("{}ses", stem);
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

fn singularize_lower(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == word) {
        return singular.to_string();
    }
    if IRREGULAR.iter().any(|(s, _)| *s == word) {
        return word.to_string();
    }

    if word.len() > 3 {
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{}y", stem);
        }
        if let Some(stem) = word.strip_suffix("yses") {
            return format!("{}ysis", stem);
        }
        if word.ends_with("xes") || word.ends_with("ches") || word.ends_with("shes") {
            return word[..word.len() - 2].to_string();
        }
        if word.ends_with("ses") || word.ends_with("zes") {
            let stem = &word[..word.len() - 2];
            if SIBILANT_SINGULARS.contains(&stem) {
                return stem.to_string();
            }
            let with_e = &word[..word.len() - 1];
            if SILENT_E_ENDINGS.iter().any(|end| with_e.ends_with(end)) {
                return with_e.to_string();
            }
            return stem.to_string();
        }
    }

    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

//! Client-side ordering of an already-fetched program set

use std::cmp::Ordering;

use crate::models::{Program, SortOrder};

/// Dictionary order of institution names: case-insensitive, with Latin
/// accents folded onto their base letter so `Ümeå` files under `U`. Names
/// equal after folding fall back to their lowercase form. A missing name is
/// the empty string and therefore sorts first in ascending order.
pub fn compare_institutions(a: &Program, b: &Program) -> Ordering {
    let a = a.institution_name().to_lowercase();
    let b = b.institution_name().to_lowercase();
    sort_key(&a).cmp(&sort_key(&b)).then_with(|| a.cmp(&b))
}

/// Lowercase text with diacritics removed
fn sort_key(lower: &str) -> String {
    let mut key = String::with_capacity(lower.len());
    for c in lower.chars() {
        match fold_char(c) {
            Some(base) => key.push_str(base),
            None => key.push(c),
        }
    }
    key
}

fn fold_char(c: char) -> Option<&'static str> {
    let base = match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì'..='ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò'..='ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'ù'..='ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(base)
}

/// Stable sort by institution name
pub fn sort_programs(programs: &mut [Program], order: SortOrder) {
    match order {
        SortOrder::Az => programs.sort_by(compare_institutions),
        SortOrder::Za => programs.sort_by(|a, b| compare_institutions(b, a)),
    }
}

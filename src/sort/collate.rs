use std::cmp::Ordering;

// Character classes in root-collation order.
const CLASS_SEPARATOR: u8 = 0;
const CLASS_DIGIT: u8 = 1;
const CLASS_LETTER: u8 = 2;
const CLASS_OTHER: u8 = 3;

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' | 'ð' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

/// Letters whose base form is two letters. Uppercase forms reach here through `lower`.
fn expansion(c: char) -> Option<&'static str> {
    match c {
        'ß' => Some("ss"),
        'æ' => Some("ae"),
        'œ' => Some("oe"),
        'þ' => Some("th"),
        _ => None,
    }
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn class_of(c: char) -> u8 {
    if c.is_whitespace() || c.is_ascii_punctuation() {
        CLASS_SEPARATOR
    } else if c.is_numeric() {
        CLASS_DIGIT
    } else if c.is_alphabetic() {
        CLASS_LETTER
    } else {
        CLASS_OTHER
    }
}

fn primary(text: &str) -> impl Iterator<Item = (u8, char)> + '_ {
    text.chars().flat_map(|c| {
        let class = class_of(c);
        let l = lower(c);
        let (first, second) = match expansion(l) {
            Some(pair) => {
                let mut chars = pair.chars();
                (chars.next().unwrap_or(l), chars.next())
            }
            None => (fold_accent(l), None),
        };
        std::iter::once((class, first)).chain(second.map(|s| (class, s)))
    })
}

fn accents(text: &str) -> impl Iterator<Item = bool> + '_ {
    text.chars().map(|c| {
        let l = lower(c);
        expansion(l).is_some() || fold_accent(l) != l
    })
}

fn cases(text: &str) -> impl Iterator<Item = bool> + '_ {
    text.chars().map(char::is_uppercase)
}

/// Locale-style string ordering: base letters first, then accents, then case
/// (lower before upper). Falls back to code points so distinct strings never tie.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    primary(a)
        .cmp(primary(b))
        .then_with(|| accents(a).cmp(accents(b)))
        .then_with(|| cases(a).cmp(cases(b)))
        .then_with(|| a.cmp(b))
}

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical form of a game name as stored in the local `games.name` column.
///
/// Normalization steps:
/// - NFKD decomposition, dropping the diacritic marks it splits off (`é` -> `e`)
/// - lowercase
/// - spell out letters that have no decomposition (`ß` -> `ss`, `ø` -> `o`)
/// - replace every `&` with `and`
///
/// Lookups pass the query through the same function, so `"Pokémon"` finds a
/// game stored as `"pokemon"`.
pub fn clean_game_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    let letters = raw
        .nfkd()
        .filter(|c| !is_diacritic(*c))
        .flat_map(char::to_lowercase);
    for c in letters {
        match c {
            '&' => out.push_str("and"),
            c => match spell_out(c) {
                Some(folded) => out.push_str(folded),
                None => out.push(c),
            },
        }
    }
    // Kana voicing marks survive the filter; recompose them.
    out.nfc().collect()
}

/// Combining marks, except the kana voicing marks that change the syllable itself.
fn is_diacritic(c: char) -> bool {
    is_combining_mark(c) && !matches!(c, '\u{3099}' | '\u{309A}')
}

fn spell_out(c: char) -> Option<&'static str> {
    let folded = match c {
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'ø' => "o",
        'ł' => "l",
        'đ' | 'ð' => "d",
        'þ' => "th",
        'ħ' => "h",
        'ŧ' => "t",
        'ı' => "i",
        _ => return None,
    };
    Some(folded)
}

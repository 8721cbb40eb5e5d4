//! Accent stripping for Vietnamese names, used for the accent-free name column
//! and the uploaded image file name.

/// Base letter followed by every precomposed variant that folds to it.
const FOLDS: &[(char, &str)] = &[
    ('a', "àáạảãâầấậẩẫăằắặẳẵäåā"),
    ('A', "ÀÁẠẢÃÂẦẤẬẨẪĂẰẮẶẲẴÄÅĀ"),
    ('e', "èéẹẻẽêềếệểễëē"),
    ('E', "ÈÉẸẺẼÊỀẾỆỂỄËĒ"),
    ('i', "ìíịỉĩïī"),
    ('I', "ÌÍỊỈĨÏĪ"),
    ('o', "òóọỏõôồốộổỗơờớợởỡöøō"),
    ('O', "ÒÓỌỎÕÔỒỐỘỔỖƠỜỚỢỞỠÖØŌ"),
    ('u', "ùúụủũưừứựửữüū"),
    ('U', "ÙÚỤỦŨƯỪỨỰỬỮÜŪ"),
    ('y', "ỳýỵỷỹÿ"),
    ('Y', "ỲÝỴỶỸŸ"),
    ('d', "đ"),
    ('D', "ĐÐ"),
    ('c', "ç"),
    ('C', "Ç"),
    ('n', "ñ"),
    ('N', "Ñ"),
];

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}

fn fold_char(c: char) -> char {
    if c.is_ascii() {
        return c;
    }
    FOLDS
        .iter()
        .find(|(_, variants)| variants.contains(c))
        .map_or(c, |(base, _)| *base)
}

/// Remove diacritics, both precomposed (`ễ`) and decomposed (`e` + U+0302 + U+0303).
pub fn remove_accents(input: &str) -> String {
    input
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .map(fold_char)
        .collect()
}

/// Accent-free, upper-cased form of a full name.
pub fn name_without_accents(full_name: &str) -> String {
    remove_accents(full_name.trim()).to_uppercase()
}

/// `"<ID> <NAME-NO-ACCENT>.<extension>"`; the name part is dropped when empty.
pub fn image_file_name(employee_id: &str, name_no_accent: &str, extension: &str) -> String {
    if name_no_accent.is_empty() {
        format!("{employee_id}.{extension}")
    } else {
        format!("{employee_id} {name_no_accent}.{extension}")
    }
}

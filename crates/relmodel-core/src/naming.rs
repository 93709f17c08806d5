//! Collision-free identifier generation for generated metadata.

use convert_case::{Case, Casing};

/// Return `candidate` unchanged when free, otherwise the candidate with the
/// smallest positive integer suffix that `is_taken` rejects.
pub fn uniquify(candidate: &str, is_taken: impl Fn(&str) -> bool) -> String {
    uniquify_capped(candidate, is_taken, usize::MAX)
}

/// Like [`uniquify`], truncating the stem so the result never exceeds
/// `max_len` bytes.
pub fn uniquify_capped(candidate: &str, is_taken: impl Fn(&str) -> bool, max_len: usize) -> String {
    let base = truncate(candidate, max_len);
    if !is_taken(&base) {
        return base.to_string();
    }
    let mut suffix = 1u64;
    loop {
        let digits = suffix.to_string();
        let stem = truncate(&base, max_len.saturating_sub(digits.len()));
        let name = format!("{stem}{digits}");
        if !is_taken(&name) {
            return name;
        }
        suffix += 1;
    }
}

/// Dependent-end property name for a derived foreign key: the principal type
/// name in snake case composed with the principal key property name.
pub fn foreign_key_property_name(principal: &str, key_property: &str) -> String {
    format!("{}_{}", principal.to_case(Case::Snake), key_property)
}

/// Entity type name in snake case, used for key-discovery candidates.
pub fn entity_snake_case(entity: &str) -> String {
    entity.to_case(Case::Snake)
}

fn truncate(name: &str, max_len: usize) -> &str {
    if name.len() <= max_len {
        return name;
    }
    let mut cut = max_len;
    while cut > 0 && !name.is_char_boundary(cut) {
        cut -= 1;
    }
    &name[..cut]
}

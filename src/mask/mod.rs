use crate::validate::{FieldKind, FormField};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskKind {
    /// Digits and dots only, applied on every keystroke.
    Ip,
    /// Clears the invalid highlight once a date is picked.
    Date,
}

/// Picks the mask for a field from its `data-mask` / `type` attributes.
pub fn mask_for(field: &FormField) -> Option<MaskKind> {
    if field.kind != FieldKind::Input {
        return None;
    }
    if field.mask.as_deref() == Some("ip") {
        return Some(MaskKind::Ip);
    }
    if field.input_type.eq_ignore_ascii_case("date") {
        return Some(MaskKind::Date);
    }
    None
}

pub fn mask_ip(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

pub fn apply_mask(field: &mut FormField, kind: MaskKind) {
    match kind {
        MaskKind::Ip => field.value = mask_ip(&field.value),
        MaskKind::Date => {
            if !field.value.is_empty() {
                field.invalid = false;
            }
        }
    }
}

/// Runs the matching mask over every field; returns how many were touched.
pub fn apply_masks(fields: &mut [FormField]) -> usize {
    let mut touched = 0;
    for field in fields.iter_mut() {
        if let Some(kind) = mask_for(field) {
            apply_mask(field, kind);
            touched += 1;
        }
    }
    touched
}

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Input,
    Select,
    Textarea,
    Other,
}

impl FieldKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "input" => Self::Input,
            "select" => Self::Select,
            "textarea" => Self::Textarea,
            _ => Self::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    /// The `type` attribute for inputs (`text`, `date`, ...), empty otherwise.
    pub input_type: String,
    /// The `data-mask` attribute, if any.
    pub mask: Option<String>,
    pub value: String,
    pub required: bool,
    /// Set when the field should be highlighted as invalid.
    pub invalid: bool,
}

impl FormField {
    pub fn new(name: impl Into<String>, kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            input_type: String::new(),
            mask: None,
            value: value.into(),
            required: false,
            invalid: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = Some(mask.into());
        self
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub invalid_fields: Vec<String>,
}

/// Checks every required field for a non-blank value, flagging failures for highlighting.
///
/// Fields that pass have their flag cleared. Only form controls participate.
pub fn validate_required(fields: &mut [FormField]) -> bool {
    let mut valid = true;
    for field in fields
        .iter_mut()
        .filter(|f| f.required && f.kind != FieldKind::Other)
    {
        field.invalid = field.is_blank();
        if field.invalid {
            valid = false;
        }
    }
    valid
}

pub fn validate_with_report(fields: &mut [FormField]) -> ValidationReport {
    let valid = validate_required(fields);
    let invalid_fields = fields
        .iter()
        .filter(|f| f.invalid)
        .map(|f| f.name.clone())
        .collect();
    ValidationReport {
        valid,
        invalid_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_fields_are_flagged() {
        let mut fields = vec![
            FormField::new("hostname", FieldKind::Input, "  ").required(),
            FormField::new("level", FieldKind::Select, "error").required(),
            FormField::new("notes", FieldKind::Textarea, ""),
        ];
        let report = validate_with_report(&mut fields);
        assert!(!report.valid);
        assert_eq!(report.invalid_fields, vec!["hostname"]);
        assert!(!fields[2].invalid);
    }

    #[test]
    fn filled_fields_clear_previous_flags() {
        let mut fields = vec![FormField::new("ip", FieldKind::Input, "").required()];
        assert!(!validate_required(&mut fields));
        assert!(fields[0].invalid);

        fields[0].value = "10.0.0.1".to_string();
        assert!(validate_required(&mut fields));
        assert!(!fields[0].invalid);
    }

    #[test]
    fn no_required_fields_is_valid() {
        let mut fields = vec![FormField::new("q", FieldKind::Input, "")];
        assert!(validate_required(&mut fields));
        assert!(validate_required(&mut []));
    }
}

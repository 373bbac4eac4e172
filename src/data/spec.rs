use super::model::{AttributeSpec, FieldSpec, FieldType};

/// Fields stored as integers; everything else is read as a float.
const INT_FIELDS: &[&str] = &["id", "connectivity"];

/// Leading header tokens that never name a field (`ITEM:` and `ATOMS`).
const HEADER_SKIP: usize = 2;

/// Trim surrounding whitespace and lower-case a dump line.
pub fn normalize(line: &str) -> String {
    line.trim().to_lowercase()
}

/// Type assigned to a field name.
pub fn field_type(name: &str) -> FieldType {
    if INT_FIELDS.contains(&name) {
        FieldType::Int
    } else {
        FieldType::Float
    }
}

/// Derive the attribute spec from an `ITEM: ATOMS ...` header line.
///
/// The first two tokens are dropped regardless of what they say; the rest
/// become fields in header order. A header with nothing after the first two
/// tokens yields an empty spec.
pub fn atom_data_spec(header: &str) -> AttributeSpec {
    let fields = normalize(header)
        .split_whitespace()
        .skip(HEADER_SKIP)
        .map(|name| FieldSpec::new(name, field_type(name)))
        .collect();
    AttributeSpec::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_fields_follow_marker_tokens() {
        let spec = atom_data_spec("ITEM: ATOMS id type x y z");
        assert_eq!(
            spec.fields,
            vec![
                FieldSpec::new("id", FieldType::Int),
                FieldSpec::new("type", FieldType::Float),
                FieldSpec::new("x", FieldType::Float),
                FieldSpec::new("y", FieldType::Float),
                FieldSpec::new("z", FieldType::Float),
            ]
        );
    }

    #[test]
    fn names_are_lowercased_and_connectivity_is_int() {
        let spec = atom_data_spec("  item: atoms ID X Y Z Diameter Connectivity \n");
        assert_eq!(
            spec.names(),
            vec!["id", "x", "y", "z", "diameter", "connectivity"]
        );
        assert_eq!(spec.fields[0].ty, FieldType::Int);
        assert_eq!(spec.fields[4].ty, FieldType::Float);
        assert_eq!(spec.fields[5].ty, FieldType::Int);
    }

    #[test]
    fn first_two_tokens_are_dropped_by_position_not_name() {
        let spec = atom_data_spec("id type x");
        assert_eq!(spec.names(), vec!["x"]);
    }

    #[test]
    fn short_headers_give_empty_spec() {
        assert!(atom_data_spec("ITEM: ATOMS").is_empty());
        assert!(atom_data_spec("ITEM:").is_empty());
        assert!(atom_data_spec("").is_empty());
    }
}

//! Case helpers shared by method-name defaults and schema naming.

/// Lower-case the first character (`ClassName` -> `className`).
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-case the first character (`fooCollection` -> `FooCollection`).
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_helpers() {
        assert_eq!(decapitalize("ClassName"), "className");
        assert_eq!(decapitalize(""), "");
        assert_eq!(capitalize("fooCollection"), "FooCollection");
        assert_eq!(capitalize("x"), "X");
    }
}

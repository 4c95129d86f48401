// SPDX-License-Identifier: MIT OR Apache-2.0
//! Unique name generation.

/// `base` if unused, otherwise `base` followed by the first free counter (`base1`, `base2`, ...)
pub fn create_unique_name<'a, I>(base: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: std::collections::HashSet<&str> = existing.into_iter().collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_names() {
        assert_eq!(create_unique_name("NewFunction", []), "NewFunction");
        assert_eq!(create_unique_name("NewFunction", ["NewFunction"]), "NewFunction1");
        assert_eq!(
            create_unique_name("NewFunction", ["NewFunction", "NewFunction1", "Other"]),
            "NewFunction2"
        );
    }
}

//! Name derivation - PascalCase to snake_case and English pluralization
//!
//! Pure, stateless string transforms used for table, column, and foreign
//! key names. The pluralizer is a naive English heuristic by design: it
//! does not special-case irregular nouns ("person" becomes "persons").

/// Convert a PascalCase or camelCase name to snake_case.
///
/// An underscore is inserted at every lowercase-to-uppercase or
/// digit-to-uppercase boundary, and before the last letter of an uppercase
/// run that is followed by lowercase, so acronyms stay intact:
/// `"UserID"` becomes `"user_id"` and `"HTMLParser"` becomes
/// `"html_parser"`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || next_is_lower {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// Pluralize an English word with the naive heuristic.
pub fn pluralize(singular: &str) -> String {
    if singular.is_empty() {
        return String::new();
    }

    if singular.ends_with('s')
        || singular.ends_with('x')
        || singular.ends_with('z')
        || singular.ends_with("sh")
        || singular.ends_with("ch")
    {
        format!("{}es", singular)
    } else if singular.ends_with('y') && ends_with_consonant_y(singular) {
        format!("{}ies", &singular[..singular.len() - 1])
    } else {
        format!("{}s", singular)
    }
}

/// Singularize an English word, inverting the heuristic in [`pluralize`].
pub fn singularize(plural: &str) -> String {
    if plural.ends_with("ies") {
        format!("{}y", &plural[..plural.len() - 3])
    } else if plural.ends_with("ses")
        || plural.ends_with("xes")
        || plural.ends_with("zes")
        || plural.ends_with("shes")
        || plural.ends_with("ches")
    {
        plural[..plural.len() - 2].to_string()
    } else if plural.ends_with('s') && plural.len() > 1 {
        plural[..plural.len() - 1].to_string()
    } else {
        plural.to_string()
    }
}

/// Derive the physical table name for a model name.
pub fn to_table_name(model_name: &str) -> String {
    pluralize(&to_snake_case(model_name))
}

/// Derive the physical column name for a property name.
pub fn to_column_name(property_name: &str) -> String {
    to_snake_case(property_name)
}

/// Derive the conventional foreign key column name for a model name.
pub fn to_foreign_key_name(model_name: &str) -> String {
    format!("{}_id", to_snake_case(model_name))
}

fn ends_with_consonant_y(word: &str) -> bool {
    let mut chars = word.chars().rev();
    chars.next();
    match chars.next() {
        Some(prev) => !matches!(prev.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("FirstName"), "first_name");
        assert_eq!(to_snake_case("UserProfile"), "user_profile");
        assert_eq!(to_snake_case("UserID"), "user_id");
        assert_eq!(to_snake_case("HTMLParser"), "html_parser");
        assert_eq!(to_snake_case("APIKey"), "api_key");
        assert_eq!(to_snake_case("Post"), "post");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_to_snake_case_digit_boundary() {
        assert_eq!(to_snake_case("Http2Server"), "http2_server");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("post"), "posts");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("city"), "cities");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("bus"), "buses");
        assert_eq!(pluralize("dish"), "dishes");
        assert_eq!(pluralize("church"), "churches");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn test_pluralize_is_naive_by_design() {
        assert_eq!(pluralize("person"), "persons");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("posts"), "post");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("cities"), "city");
        assert_eq!(singularize("buses"), "bus");
        assert_eq!(singularize("churches"), "church");
    }

    #[test]
    fn test_to_table_name() {
        assert_eq!(to_table_name("BlogPost"), "blog_posts");
        assert_eq!(to_table_name("Category"), "categories");
        assert_eq!(to_table_name("Address"), "addresses");
    }

    #[test]
    fn test_to_column_name() {
        assert_eq!(to_column_name("CreatedAt"), "created_at");
        assert_eq!(to_column_name("title"), "title");
    }

    #[test]
    fn test_to_foreign_key_name() {
        assert_eq!(to_foreign_key_name("BlogPost"), "blog_post_id");
        assert_eq!(to_foreign_key_name("User"), "user_id");
    }
}

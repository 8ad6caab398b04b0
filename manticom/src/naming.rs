//! Pure casing and identifier helpers shared by the route compiler and emitter.

use heck::ToSnakeCase;

/// Uppercases the first letter, leaving the rest untouched.
#[must_use]
pub fn titlecase(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercases the first letter, leaving the rest untouched.
#[must_use]
pub fn anti_titlecase(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// `ChangePassword` -> `change_password`.
#[must_use]
pub fn camel_to_underscore(name: &str) -> String {
    name.to_snake_case()
}

/// Converts an underscore/URL style name to upper camel case, dropping path
/// separators and `:` variable markers: `users/:user_id/` -> `UsersUserId`.
///
/// Only the first letter of each segment changes, so `HTMLPage` stays intact.
#[must_use]
pub fn underscore_to_camel(input: &str) -> String {
    input
        .replace(':', "")
        .split(['_', '/'])
        .map(titlecase)
        .collect()
}

/// Initial character of every alphanumeric run: `silicon_valley_intelligence` -> `svi`.
#[must_use]
pub fn make_suffix(input: &str) -> String {
    input
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .filter_map(|run| run.chars().next())
        .collect()
}

/// Removes a leading `/` and guarantees a trailing `/`.
#[must_use]
pub fn fix_url_path(path: &str) -> String {
    let trimmed: &str = path.strip_prefix('/').unwrap_or(path);
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Renames identifiers the target runtime reserves or treats specially.
///
/// `id` clashes with the object-id accessor, and the `new`/`alloc`/`copy`/
/// `mutableCopy` prefixes imply ownership transfer for synthesized getters.
#[must_use]
pub fn safety_name(name: &str) -> String {
    const RENAMES: [(&str, &str); 4] = [
        ("new", "the"),
        ("alloc", "loc"),
        ("copy", "cpy"),
        ("mutableCopy", "mcpy"),
    ];
    if name == "id" {
        return "theID".to_string();
    }
    for (prefix, replacement) in RENAMES {
        if let Some(rest) = name.strip_prefix(prefix) {
            return format!("{replacement}{}", titlecase(rest));
        }
    }
    name.to_string()
}

/// Selector label for an argument. The first label follows `...With` and is
/// upper camel case; every later label is lower camel case.
#[must_use]
pub fn parameter_name(name: &str, is_first: bool) -> String {
    if name == "id" {
        return if is_first { "Id" } else { "theId" }.to_string();
    }
    let camel: String = underscore_to_camel(name);
    if is_first {
        camel
    } else {
        anti_titlecase(&camel)
    }
}

//! Content type normalization.

/// Reduce a content type to the form factories are registered under.
///
/// Parameters are dropped, case is folded, and vendor types with a
/// structured suffix collapse onto the suffix type:
/// `application/vnd.github+json; charset=utf-8` becomes `application/json`.
pub fn normalize(content_type: &str) -> String {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some((kind, subtype)) if subtype.starts_with("vnd.") => match subtype.rsplit_once('+') {
            Some((_, suffix)) => format!("{kind}/{suffix}"),
            None => essence,
        },
        _ => essence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("application/json"), "application/json");
        assert_eq!(normalize("Application/JSON; charset=utf-8"), "application/json");
        assert_eq!(normalize("application/vnd.github+json"), "application/json");
        assert_eq!(normalize("application/vnd.custom"), "application/vnd.custom");
        assert_eq!(normalize("  text/plain  "), "text/plain");
    }
}

use url::Url;

/// Why a candidate URL was rejected. The message is what gets shown inline
/// next to the input, so the wording stays user-facing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("URL is required")]
    Empty,

    #[error("Please enter a valid URL")]
    NotAUrl,

    #[error("Please enter a valid Wikipedia URL (e.g., https://en.wikipedia.org/wiki/...)")]
    NotWikipedia,

    #[error("Please enter a Wikipedia article URL (must contain /wiki/)")]
    NotAnArticle,
}

/// Checks that the input is a well-formed Wikipedia article URL. Rules are
/// applied in order and the first failure wins; callers must not issue a
/// generation request when this fails.
pub fn validate_wikipedia_url(raw: &str) -> Result<Url, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let url = Url::parse(trimmed).map_err(|_| ValidationError::NotAUrl)?;

    let is_wikipedia = url
        .host_str()
        .map(|host| host.contains("wikipedia.org"))
        .unwrap_or(false);
    if !is_wikipedia {
        return Err(ValidationError::NotWikipedia);
    }

    if !url.path().contains("/wiki/") {
        return Err(ValidationError::NotAnArticle);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_required() {
        assert_eq!(validate_wikipedia_url(""), Err(ValidationError::Empty));
        assert_eq!(validate_wikipedia_url("   "), Err(ValidationError::Empty));
        assert_eq!(ValidationError::Empty.to_string(), "URL is required");
    }

    #[test]
    fn garbage_is_not_a_url() {
        assert_eq!(
            validate_wikipedia_url("not a url"),
            Err(ValidationError::NotAUrl)
        );
        // Relative paths are not absolute URLs.
        assert_eq!(
            validate_wikipedia_url("/wiki/Cat"),
            Err(ValidationError::NotAUrl)
        );
    }

    #[test]
    fn wrong_host_is_rejected() {
        assert_eq!(
            validate_wikipedia_url("https://example.com/wiki/Foo"),
            Err(ValidationError::NotWikipedia)
        );
    }

    #[test]
    fn non_article_path_is_rejected() {
        assert_eq!(
            validate_wikipedia_url("https://en.wikipedia.org/about"),
            Err(ValidationError::NotAnArticle)
        );
    }

    #[test]
    fn article_urls_pass() {
        assert!(validate_wikipedia_url("https://en.wikipedia.org/wiki/Cat").is_ok());
        assert!(validate_wikipedia_url("https://de.wikipedia.org/wiki/Katze").is_ok());
        // Surrounding whitespace is tolerated.
        assert!(validate_wikipedia_url("  https://en.wikipedia.org/wiki/Cat  ").is_ok());
    }
}

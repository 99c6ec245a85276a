//! `Accept-Language` header extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT_LANGUAGE, request::Parts},
};
use std::convert::Infallible;

/// Primary language subtags from `Accept-Language`, best match first.
///
/// `fr-CA,en;q=0.8` yields `["fr", "en"]`. A missing or unreadable header
/// yields an empty list; entries with `q=0` are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptLanguage(pub Vec<String>);

impl AcceptLanguage {
    pub fn parse(header: &str) -> Self {
        let mut ranked: Vec<(f32, usize, String)> = header
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| {
                let mut pieces = entry.trim().split(';');
                let tag = pieces.next()?.trim();
                if tag.is_empty() || tag == "*" {
                    return None;
                }

                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                    .unwrap_or(1.0);
                if quality <= 0.0 {
                    return None;
                }

                let primary = tag.split(['-', '_']).next()?.to_ascii_lowercase();
                Some((quality, position, primary))
            })
            .collect();

        // Stable on position so equal weights keep header order.
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut tags: Vec<String> = Vec::with_capacity(ranked.len());
        for (_, _, tag) in ranked {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Self(tags)
    }
}

impl<S> FromRequestParts<S> for AcceptLanguage
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(AcceptLanguage::parse)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_by_quality() {
        let parsed = AcceptLanguage::parse("en;q=0.5, fr-CA, de;q=0.7");
        assert_eq!(parsed.0, vec!["fr", "de", "en"]);
    }

    #[test]
    fn test_drops_wildcards_and_zero_weight() {
        let parsed = AcceptLanguage::parse("*, es;q=0, pt-BR");
        assert_eq!(parsed.0, vec!["pt"]);
    }

    #[test]
    fn test_deduplicates_primary_tags() {
        let parsed = AcceptLanguage::parse("fr-FR, fr-CA;q=0.9, en;q=0.8");
        assert_eq!(parsed.0, vec!["fr", "en"]);
    }

    #[test]
    fn test_empty_header() {
        assert!(AcceptLanguage::parse("").0.is_empty());
    }
}

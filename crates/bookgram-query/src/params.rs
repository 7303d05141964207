//! Binding request parameters onto a [`SearchQuery`].
//!
//! List parameters may repeat (`q=a&q=b`), use the bracket form (`q[]=a`),
//! or pack several values into one comma-separated string (`q=a,b`).

use std::borrow::Cow;

use bookgram_document::ReadingLevel;

use crate::{QueryError, SearchQuery};

/// Binds `(name, value)` pairs; unknown names are ignored.
pub(crate) fn bind<'a, I>(params: I) -> Result<SearchQuery, QueryError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut query = SearchQuery::default();
    for (name, value) in params {
        match name.strip_suffix("[]").unwrap_or(name) {
            "q" => query.words.extend(split_list(value)),
            "el" => {
                for level in split_list(value) {
                    let parsed = level
                        .parse::<ReadingLevel>()
                        .map_err(|_| QueryError::UnknownLevel { value: level })?;
                    query.levels.push(parsed);
                }
            }
            "tag" => query.tags.extend(split_list(value)),
            "bid" => query.bids.extend(split_list(value)),
            "page" => query.page = Some(positive("page", value)?),
            "perPage" => query.per_page = Some(positive("perPage", value)?),
            _ => {}
        }
    }
    Ok(query)
}

/// Binds a raw `a=b&c=d` query string, percent-decoding names and values.
pub(crate) fn bind_query_string(raw: &str) -> Result<SearchQuery, QueryError> {
    let pairs = raw
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode(name)?, decode(value)?))
        })
        .collect::<Result<Vec<_>, QueryError>>()?;
    bind(pairs.iter().map(|(n, v)| (&**n, &**v)))
}

/// Splits a comma-separated list, dropping blank items.
fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

/// Parses a positive integer parameter.
fn positive(field: &'static str, value: &str) -> Result<usize, QueryError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(QueryError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

/// Decodes one form-encoded component.
fn decode(raw: &str) -> Result<Cow<'_, str>, QueryError> {
    if !raw.contains(['%', '+']) {
        return Ok(Cow::Borrowed(raw));
    }
    urlencoding::decode(&raw.replace('+', " "))
        .map(|s| Cow::Owned(s.into_owned()))
        .map_err(|_| QueryError::Decode {
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_every_list_form() {
        let query = SearchQuery::from_params([
            ("q", "花,月"),
            ("q[]", "雪"),
            ("el[]", "OCR"),
            ("el", "PROOF_READ"),
            ("tag", "ndlocrv2, ndlocrv3"),
            ("bid[]", "200000001"),
            ("page", "2"),
            ("perPage", "50"),
            ("ignored", "x"),
        ])
        .unwrap();
        assert_eq!(query.words, vec!["花", "月", "雪"]);
        assert_eq!(query.levels, vec![ReadingLevel::Ocr, ReadingLevel::ProofRead]);
        assert_eq!(query.tags, vec!["ndlocrv2", "ndlocrv3"]);
        assert_eq!(query.bids, vec!["200000001"]);
        assert_eq!(query.page, Some(2));
        assert_eq!(query.per_page, Some(50));
    }

    #[test]
    fn unknown_level_names_value() {
        let err = SearchQuery::from_params([("el", "OCR,DRAFT")]).unwrap_err();
        assert_eq!(err.to_string(), "unknown reading level: DRAFT");
    }

    #[test]
    fn page_must_be_positive() {
        let err = SearchQuery::from_params([("page", "0")]).unwrap_err();
        assert!(matches!(err, QueryError::InvalidNumber { field: "page", .. }));
        assert!(SearchQuery::from_params([("perPage", "ten")]).is_err());
    }

    #[test]
    fn decodes_query_string() {
        let query =
            SearchQuery::from_query_string("?q=%E8%8A%B1%E9%B3%A5&q[]=a+b&tag=x%2Cy&page=3").unwrap();
        assert_eq!(query.words, vec!["花鳥", "a b"]);
        assert_eq!(query.tags, vec!["x", "y"]);
        assert_eq!(query.page, Some(3));
    }

    #[test]
    fn bad_escape_is_rejected() {
        let err = SearchQuery::from_query_string("q=%FF").unwrap_err();
        assert!(matches!(err, QueryError::Decode { .. }));
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    /// The PDF could not be decoded at all. Nothing of the document is returned.
    #[error("unable to decode menu document: {0}")]
    Decode(String),
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid or malformed URL: {0}")]
    InvalidUrl(String),
    #[error("restaurant list not found on page")]
    Scrape,
}

/// Recovered locally by the legend parser; never reaches callers of `parse_document`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LegendError {
    #[error("document has no rows")]
    NoRows,
}

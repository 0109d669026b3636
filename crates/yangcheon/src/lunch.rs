//! Lunch menu page.
//!
//! The apps only embed the page. Here it is fetched and reduced to its
//! visible text so it can be printed.

use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// Elements whose text is never shown.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

#[derive(Debug, Error)]
pub enum LunchError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("HTTP {status} from lunch page")]
    Status { status: u16 },
}

impl From<reqwest::Error> for LunchError {
    fn from(err: reqwest::Error) -> Self {
        LunchError::Network {
            message: err.to_string(),
        }
    }
}

/// Fetches the lunch page and returns its visible text, one line per text
/// block.
pub async fn fetch_lunch_text(client: &Client, url: &str) -> Result<Vec<String>, LunchError> {
    debug!(url = %url, "Fetching lunch page");

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!(url = %url, status = %status, "Lunch page request failed");
        return Err(LunchError::Status {
            status: status.as_u16(),
        });
    }

    let html = response.text().await?;
    Ok(visible_text(&html))
}

/// Extracts the text a browser would show from `html`, whitespace-collapsed.
pub fn visible_text(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Some(body) = document.select(&BODY_SELECTOR).next() else {
        return Vec::new();
    };

    body.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name));
            (!hidden).then_some(&**text)
        })
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

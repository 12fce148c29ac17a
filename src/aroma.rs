use reqwest::{Client, Url};
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::MenuError;
use crate::layout::LayoutConfig;
use crate::model::WeeklyMenu;
use crate::parser::parse_document;

/// `DateMode` values fetched for one menu: this week, next week, the week after.
pub const PERIODS: [u32; 3] = [1, 2, 3];

const URL_PATTERN: &str = r"https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
}

pub fn build_client(user_agent: &str) -> anyhow::Result<Client> {
    let client = Client::builder()
        // Avoid macOS system proxy lookup that can panic in sandboxed contexts.
        .no_proxy()
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

pub fn validate_url(input: &str) -> Result<Url, MenuError> {
    let matches = regex::Regex::new(URL_PATTERN)
        .map(|re| re.is_match(input))
        .unwrap_or(false);
    if !matches {
        return Err(MenuError::InvalidUrl(input.to_string()));
    }
    Url::parse(input).map_err(|_| MenuError::InvalidUrl(input.to_string()))
}

/// Reads the restaurant dropdown of an Aromi front page.
///
/// The first option is a placeholder and is skipped.
pub fn parse_restaurants(html: &str) -> Result<Vec<Restaurant>, MenuError> {
    let doc = Html::parse_document(html);
    let select = Selector::parse("#MainContent_RestaurantDropDownList").map_err(|_| MenuError::Scrape)?;
    let option = Selector::parse("option").map_err(|_| MenuError::Scrape)?;

    let dropdown = doc.select(&select).next().ok_or(MenuError::Scrape)?;
    let restaurants = dropdown
        .select(&option)
        .skip(1)
        .filter_map(|element| {
            let id = element.value().attr("value")?;
            let name = element.text().collect::<String>();
            Some(Restaurant {
                id: id.to_string(),
                name: name.trim().to_string(),
            })
        })
        .collect();
    Ok(restaurants)
}

fn front_page_url(base: &Url) -> Result<Url, MenuError> {
    let page = format!("{}/Default.aspx", base.as_str().trim_end_matches('/'));
    Url::parse(&page).map_err(|_| MenuError::InvalidUrl(page))
}

pub async fn fetch_restaurants(client: &Client, base: &Url) -> Result<Vec<Restaurant>, MenuError> {
    let page = front_page_url(base)?;
    let html = fetch(client, &page).await?.text().await.map_err(|source| MenuError::Fetch {
        url: page.to_string(),
        source,
    })?;
    let restaurants = parse_restaurants(&html)?;
    info!(url = %page, count = restaurants.len(), "scraped restaurants");
    Ok(restaurants)
}

/// Rewrites (or adds) the `DateMode` query parameter of a menu PDF link.
pub fn period_url(pdf_url: &Url, period: u32) -> Url {
    let pairs: Vec<(String, String)> = pdf_url
        .query_pairs()
        .filter(|(key, _)| !key.eq_ignore_ascii_case("DateMode"))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = pdf_url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("DateMode", &period.to_string());
    url
}

async fn fetch(client: &Client, url: &Url) -> Result<reqwest::Response, MenuError> {
    client
        .get(url.clone())
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|source| MenuError::Fetch {
            url: url.to_string(),
            source,
        })
}

pub async fn download_pdf(client: &Client, url: &Url) -> Result<Vec<u8>, MenuError> {
    let bytes = fetch(client, url).await?.bytes().await.map_err(|source| MenuError::Fetch {
        url: url.to_string(),
        source,
    })?;
    debug!(%url, size = bytes.len(), "downloaded menu pdf");
    Ok(bytes.to_vec())
}

/// Concatenates days in period order. Diets from later periods are added
/// only when no diet of the same name (ignoring case) is already present.
pub fn merge_menus(menus: Vec<WeeklyMenu>) -> WeeklyMenu {
    let mut merged = WeeklyMenu::default();
    for (index, menu) in menus.into_iter().enumerate() {
        merged.days.extend(menu.days);
        if index == 0 {
            merged.diets = menu.diets;
            continue;
        }
        for diet in menu.diets {
            let known = merged
                .diets
                .iter()
                .any(|existing| existing.name.to_lowercase() == diet.name.to_lowercase());
            if !known {
                merged.diets.push(diet);
            }
        }
    }
    merged
}

/// Downloads and parses every period of a restaurant's menu.
///
/// Fails if any single period cannot be fetched or decoded.
pub async fn fetch_menu(
    client: &Client,
    pdf_url: &Url,
    layout: &LayoutConfig,
) -> Result<WeeklyMenu, MenuError> {
    let mut menus = Vec::with_capacity(PERIODS.len());
    for period in PERIODS {
        let url = period_url(pdf_url, period);
        info!(%url, period, "processing menu");
        let bytes = download_pdf(client, &url).await?;

        // PDF decoding is CPU bound; keep it off the async workers.
        let layout = layout.clone();
        let menu = tokio::task::spawn_blocking(move || parse_document(&bytes, &layout))
            .await
            .map_err(|err| MenuError::Decode(err.to_string()))??;
        menus.push(menu);
    }
    Ok(merge_menus(menus))
}

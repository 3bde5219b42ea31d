//! Page regions refreshed by named events in self-contained mode.

use html::SelectorList;
use serde::Deserialize;

use crate::attributes::{Method, SwapMode};
use crate::page::Page;
use crate::swap::swap;
use crate::transport::ExchangeRequest;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Region {
    pub selector: String,
    pub url: String,
    #[serde(default)]
    pub swap: SwapMode,
}

impl Region {
    pub fn new(selector: &str, url: &str, swap: SwapMode) -> Self {
        Self {
            selector: selector.to_owned(),
            url: url.to_owned(),
            swap,
        }
    }
}

/// Regions refreshed, in order, whenever `event` is broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RefreshGroup {
    pub event: String,
    pub regions: Vec<Region>,
}

/// Short-link and subdomain count badges and tables.
pub fn default_groups() -> Vec<RefreshGroup> {
    vec![
        RefreshGroup {
            event: "refresh-links".to_owned(),
            regions: vec![
                Region::new("#short-link-count", "/admin/links/count", SwapMode::Outer),
                Region::new("#links-table", "/admin/links/table", SwapMode::Inner),
            ],
        },
        RefreshGroup {
            event: "refresh-subdomains".to_owned(),
            regions: vec![
                Region::new("#subdomain-count", "/admin/subdomains/count", SwapMode::Outer),
                Region::new("#subdomains-table", "/admin/subdomains/table", SwapMode::Inner),
            ],
        },
    ]
}

/// Re-fetch every region of `group` that is present in the document.
///
/// Failures leave the region as it was.
pub async fn refresh(page: &Page, group: &RefreshGroup) {
    for region in &group.regions {
        let selector = SelectorList::parse(&region.selector);
        let present = {
            let document = page.document();
            document.query_selector(document.root(), &selector).is_some()
        };
        if !present {
            log::trace!("region {} not on page", region.selector);
            continue;
        }
        let result = page
            .transport()
            .exchange(ExchangeRequest::new(Method::Get, &region.url))
            .await;
        if !result.ok {
            log::error!("Failed to refresh {}: {result}", region.selector);
            continue;
        }
        let mut document = page.document_mut();
        // Re-query: the region may have been replaced while the request was out.
        let Some(target) = document.query_selector(document.root(), &selector) else {
            continue;
        };
        if let Err(err) = swap(&mut document, page.hook(), target, &result.text, region.swap) {
            log::error!("Failed to refresh {}: {err:#}", region.selector);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_deserialize_with_default_swap() {
        let groups: Vec<RefreshGroup> = serde_json::from_str(
            r##"[{"event":"refresh-users","regions":[
                {"selector":"#user-count","url":"/admin/users/count","swap":"outerHTML"},
                {"selector":"#users-table","url":"/admin/users/table"}]}]"##,
        )
        .unwrap();
        assert_eq!(groups[0].regions[0].swap, SwapMode::Outer);
        assert_eq!(groups[0].regions[1].swap, SwapMode::Inner);
    }

    #[test]
    fn default_groups_cover_links_and_subdomains() {
        let groups = default_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].regions[1].url, "/admin/subdomains/table");
    }
}

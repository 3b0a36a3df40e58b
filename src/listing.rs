/// List Manager operations: searching, sorting and counting saved records
use crate::price::numeric_price;
use crate::property::{Collection, PropertyKey, PropertyRecord};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Sort orders offered by the List Manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::DateDesc,
        SortOrder::DateAsc,
        SortOrder::PriceAsc,
        SortOrder::PriceDesc,
    ];

    /// Value used by the sort `<select>`.
    pub fn key(self) -> &'static str {
        match self {
            SortOrder::DateDesc => "date-desc",
            SortOrder::DateAsc => "date-asc",
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::DateDesc => "Newest first",
            SortOrder::DateAsc => "Oldest first",
            SortOrder::PriceAsc => "Price: low to high",
            SortOrder::PriceDesc => "Price: high to low",
        }
    }

    pub fn from_key(key: &str) -> Option<SortOrder> {
        SortOrder::ALL.into_iter().find(|order| order.key() == key)
    }
}

/// Records whose title, price or hostname contains `query`, case-insensitively.
/// An empty query keeps everything.
pub fn filter_records(records: &[PropertyRecord], query: &str) -> Vec<PropertyRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|p| {
            [&p.title, &p.price, &p.hostname]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

/// Sort a copy of `records`. Unparsable prices go last in both price orders;
/// records without `savedAt` go last in both date orders. The sort is stable.
pub fn sort_records(records: &[PropertyRecord], order: SortOrder) -> Vec<PropertyRecord> {
    let mut sorted = records.to_vec();
    match order {
        SortOrder::DateDesc => sorted.sort_by(|a, b| missing_last(a.saved_at, b.saved_at, |x, y| y.total_cmp(&x))),
        SortOrder::DateAsc => sorted.sort_by(|a, b| missing_last(a.saved_at, b.saved_at, |x, y| x.total_cmp(&y))),
        SortOrder::PriceAsc => sorted.sort_by(|a, b| {
            missing_last(numeric_price(&a.price), numeric_price(&b.price), |x, y| x.total_cmp(&y))
        }),
        SortOrder::PriceDesc => sorted.sort_by(|a, b| {
            missing_last(numeric_price(&a.price), numeric_price(&b.price), |x, y| y.total_cmp(&x))
        }),
    }
    sorted
}

fn missing_last(a: Option<f64>, b: Option<f64>, cmp: impl Fn(f64, f64) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Both collections as shown in the List Manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedLists {
    pub favorites: Vec<PropertyRecord>,
    pub ignored: Vec<PropertyRecord>,
}

impl SavedLists {
    pub fn list(&self, collection: Collection) -> &[PropertyRecord] {
        match collection {
            Collection::Favorites => &self.favorites,
            Collection::Ignored => &self.ignored,
        }
    }

    /// Drop a record the store confirmed as removed.
    pub fn remove(&mut self, collection: Collection, key: &PropertyKey) {
        let list = match collection {
            Collection::Favorites => &mut self.favorites,
            Collection::Ignored => &mut self.ignored,
        };
        list.retain(|record| !record.same_entity(key));
    }
}

/// Price as stored. Normalization drops the currency, so none is shown.
pub fn price_label(price: &str) -> String {
    if price.is_empty() {
        "Price not listed".to_string()
    } else {
        price.to_string()
    }
}

/// Hostname without a leading `www.`, for display.
pub fn site_label(hostname: &str) -> &str {
    hostname.strip_prefix("www.").unwrap_or(hostname)
}

/// Count records per site label
pub fn count_by_site(records: &[PropertyRecord]) -> HashMap<String, usize> {
    records.iter().fold(HashMap::new(), |mut counts, p| {
        *counts.entry(site_label(&p.hostname).to_string()).or_insert(0) += 1;
        counts
    })
}

/// Sites by count descending, then by name ascending
pub fn sites_by_count(counts: &HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut sites: Vec<(String, usize)> = counts
        .iter()
        .map(|(site, count)| (site.clone(), *count))
        .collect();

    sites.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sites
}

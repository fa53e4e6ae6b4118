use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::users::{AuthorSummary, UserId};
use crate::domains::{is_unfiltered, FlexibleNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub i64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub phone_number: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Listing row joined with the author fields the marketplace feed renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingWithAuthor {
    #[serde(flatten)]
    pub listing: Listing,
    pub author: AuthorSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub phone_number: Option<String>,
    pub image_url: Option<String>,
    pub author_id: UserId,
}

/// Fields of the create-listing form, whether sent as multipart or JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<FlexibleNumber>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author_id: Option<FlexibleNumber>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl ListingForm {
    /// Apply one multipart text field. Unknown names are ignored.
    pub fn assign(&mut self, field: &str, value: String) {
        match field {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "price" => self.price = Some(FlexibleNumber::Text(value)),
            "category" => self.category = Some(value),
            "authorId" => self.author_id = Some(FlexibleNumber::Text(value)),
            "authorEmail" => self.author_email = Some(value),
            "authorName" => self.author_name = Some(value),
            "phoneNumber" => self.phone_number = Some(value),
            _ => {}
        }
    }

    pub fn price_value(&self) -> f64 {
        match &self.price {
            Some(FlexibleNumber::Integer(value)) => *value as f64,
            Some(FlexibleNumber::Float(value)) if value.is_finite() => *value,
            Some(FlexibleNumber::Float(_)) | None => 0.0,
            Some(FlexibleNumber::Text(raw)) => parse_price(raw),
        }
    }
}

/// Parse a free-form price the way the marketplace form expects: surrounding
/// whitespace and a leading `$` are dropped, the longest numeric prefix
/// (optionally with an exponent) wins, and anything unparseable is 0.
pub fn parse_price(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();

    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || &trimmed[digits_start..end] == "." {
        return 0.0;
    }
    // An exponent only counts when at least one digit follows it.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+') | Some(b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits {
            end = exponent_end;
        }
    }

    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Body of `DELETE /api/listings/:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteListingRequest {
    #[serde(default)]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedListing {
    pub id: ListingId,
    pub title: String,
}

/// Exact category match; `All` or an empty selection keeps every listing.
pub fn filter_by_category(
    listings: Vec<ListingWithAuthor>,
    category: Option<&str>,
) -> Vec<ListingWithAuthor> {
    if is_unfiltered(category) {
        return listings;
    }
    let wanted = category.unwrap_or_default().trim();
    listings
        .into_iter()
        .filter(|entry| entry.listing.category == wanted)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_handles_free_form_input() {
        assert_eq!(parse_price("25"), 25.0);
        assert_eq!(parse_price(" $19.99 "), 19.99);
        assert_eq!(parse_price("12 dollars obo"), 12.0);
        assert_eq!(parse_price(".5"), 0.5);
        assert_eq!(parse_price("-3"), -3.0);
        assert_eq!(parse_price("1e3"), 1000.0);
        assert_eq!(parse_price("2.5E-1"), 0.25);
        assert_eq!(parse_price("7e"), 7.0);
        assert_eq!(parse_price("4e+"), 4.0);
    }

    #[test]
    fn parse_price_defaults_to_zero() {
        assert_eq!(parse_price("free"), 0.0);
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("$"), 0.0);
        assert_eq!(parse_price("."), 0.0);
        assert_eq!(parse_price("-"), 0.0);
    }

    #[test]
    fn form_price_accepts_numbers_and_text() {
        let mut form = ListingForm::default();
        assert_eq!(form.price_value(), 0.0);

        form.price = Some(FlexibleNumber::Float(42.5));
        assert_eq!(form.price_value(), 42.5);

        form.assign("price", "abc".to_string());
        assert_eq!(form.price_value(), 0.0);
    }

    #[test]
    fn assign_maps_multipart_field_names() {
        let mut form = ListingForm::default();
        form.assign("title", "Desk lamp".to_string());
        form.assign("authorEmail", "knight@ucf.edu".to_string());
        form.assign("phoneNumber", "407-555-0100".to_string());
        form.assign("unexpected", "ignored".to_string());

        assert_eq!(form.title.as_deref(), Some("Desk lamp"));
        assert_eq!(form.author_email.as_deref(), Some("knight@ucf.edu"));
        assert_eq!(form.phone_number.as_deref(), Some("407-555-0100"));
    }
}

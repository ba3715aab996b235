//! SellerActive pricing policy.
//!
//! Every money value is computed in exact decimal arithmetic and rounded
//! half-up to two places on output. `mrp` is carried on the input row but
//! takes no part in the formula.
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Columns the inventory feed must provide.
pub const INVENTORY_COLUMNS: [&str; 6] = ["sku", "price", "1stclass", "map", "mrp", "list"];

/// Output columns, in file order.
pub const CATALOG_COLUMNS: [&str; 7] = [
    "SellerSKU",
    "Cost",
    "Price (Preferred)",
    "Price (minimum)",
    "Price (maximum)",
    "MAP Price",
    "Price (retail)",
];

const MONEY_SCALE: i64 = 2;
/// Longest numeric cell accepted, after `$` and `,` are stripped.
const MAX_NUMBER_LEN: usize = 32;

/// One raw row of the vendor feed, values untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InventoryRow {
    pub sku: String,
    pub price: String,
    #[serde(rename = "1stclass")]
    pub first_class: String,
    pub map: String,
    pub mrp: String,
    pub list: String,
}

/// One priced row of the channel catalog. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    #[serde(rename = "SellerSKU")]
    pub seller_sku: String,
    #[serde(rename = "Cost", serialize_with = "serialize_money")]
    pub cost: BigDecimal,
    #[serde(rename = "Price (Preferred)", serialize_with = "serialize_money")]
    pub price_preferred: BigDecimal,
    #[serde(rename = "Price (minimum)", serialize_with = "serialize_money")]
    pub price_minimum: BigDecimal,
    #[serde(rename = "Price (maximum)", serialize_with = "serialize_money")]
    pub price_maximum: BigDecimal,
    #[serde(rename = "MAP Price", serialize_with = "serialize_money")]
    pub map_price: BigDecimal,
    #[serde(rename = "Price (retail)", serialize_with = "serialize_money")]
    pub price_retail: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("`{field}` is not a number: `{value}`")]
    InvalidNumber { field: &'static str, value: String },

    #[error("`{field}` is empty")]
    MissingNumber { field: &'static str },

    #[error("`1stclass` is not a recognized flag: `{0}`")]
    InvalidFlag(String),
}

/// Unrounded intermediate values of the formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub shipping_cost: BigDecimal,
    pub seller_cost: BigDecimal,
    pub seller_cost_plus_fee: BigDecimal,
    pub floor_price: BigDecimal,
    pub ceiling_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingPolicy {
    pub standard_shipping: BigDecimal,
    pub first_class_shipping: BigDecimal,
    /// Seller cost is divided by this to gross up the channel commission.
    pub commission_factor: BigDecimal,
    pub ceiling_markup: BigDecimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            standard_shipping: BigDecimal::new(795.into(), 2),
            first_class_shipping: BigDecimal::new(261.into(), 2),
            commission_factor: BigDecimal::new(91.into(), 2),
            ceiling_markup: BigDecimal::new(125.into(), 2),
        }
    }
}

impl PricingPolicy {
    pub fn breakdown(&self, row: &InventoryRow) -> Result<PriceBreakdown, PricingError> {
        let item_cost = parse_money("price", &row.price)?;
        let map_price = parse_optional_money("map", &row.map)?;

        let shipping_cost = if parse_first_class(&row.first_class)? {
            self.first_class_shipping.clone()
        } else {
            self.standard_shipping.clone()
        };
        let seller_cost = &item_cost + &shipping_cost;
        let seller_cost_plus_fee = &seller_cost / &self.commission_factor;
        let floor_price = if map_price > seller_cost_plus_fee {
            map_price
        } else {
            seller_cost_plus_fee.clone()
        };
        let ceiling_price = &floor_price * &self.ceiling_markup;

        Ok(PriceBreakdown {
            shipping_cost,
            seller_cost,
            seller_cost_plus_fee,
            floor_price,
            ceiling_price,
        })
    }

    pub fn price(&self, row: &InventoryRow) -> Result<CatalogRow, PricingError> {
        let b = self.breakdown(row)?;
        let list_price = parse_money("list", &row.list)?;
        let map_price = parse_optional_money("map", &row.map)?;
        let ceiling = round_money(&b.ceiling_price);
        let list = round_money(&list_price);

        Ok(CatalogRow {
            seller_sku: row.sku.clone(),
            cost: round_money(&b.seller_cost),
            price_preferred: ceiling.clone(),
            price_minimum: list.clone(),
            price_maximum: ceiling,
            map_price: round_money(&map_price),
            price_retail: list,
        })
    }
}

/// Price every row in input order. On failure returns the zero-based index of
/// the offending row with its error.
pub fn price_rows(
    policy: &PricingPolicy,
    rows: &[InventoryRow],
) -> Result<Vec<CatalogRow>, (usize, PricingError)> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| policy.price(row).map_err(|e| (idx, e)))
        .collect()
}

pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

/// Render a money value rounded half-up with exactly two decimals, zero
/// included (`0.00`), whatever scale the `BigDecimal` carries.
pub fn format_money(value: &BigDecimal) -> String {
    let rounded = round_money(value);
    let negative = rounded < BigDecimal::zero();
    let (int, scale) = rounded.as_bigint_and_exponent();
    let mut digits = int.magnitude().to_string();

    let frac_len = MONEY_SCALE as usize;
    if scale < 0 {
        digits.push_str(&"0".repeat(scale.unsigned_abs() as usize));
    }
    let scale = scale.clamp(0, MONEY_SCALE) as usize;
    digits.push_str(&"0".repeat(frac_len - scale));
    if digits.len() <= frac_len {
        digits.insert_str(0, &"0".repeat(frac_len + 1 - digits.len()));
    }

    let (whole, frac) = digits.split_at(digits.len() - frac_len);
    let sign = if negative { "-" } else { "" };
    format!("{sign}{whole}.{frac}")
}

fn serialize_money<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_money(value))
}

fn normalize_number(raw: &str) -> String {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
    unsigned.chars().filter(|c| *c != ',').collect()
}

fn parse_money(field: &'static str, raw: &str) -> Result<BigDecimal, PricingError> {
    let cleaned = normalize_number(raw);
    if cleaned.is_empty() {
        return Err(PricingError::MissingNumber { field });
    }
    // Plain decimals only: an exponent like `1e4000000` inflates the scale
    // of every later operation.
    if cleaned.len() > MAX_NUMBER_LEN || cleaned.contains(['e', 'E']) {
        return Err(PricingError::InvalidNumber {
            field,
            value: raw.to_string(),
        });
    }
    BigDecimal::from_str(&cleaned).map_err(|_| PricingError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Blank reads as zero.
fn parse_optional_money(field: &'static str, raw: &str) -> Result<BigDecimal, PricingError> {
    if raw.trim().is_empty() {
        return Ok(BigDecimal::zero());
    }
    parse_money(field, raw)
}

/// `true` for first-class shipping. Blank, numeric zero and the usual "no"
/// words select standard shipping; unknown words are rejected.
pub fn parse_first_class(raw: &str) -> Result<bool, PricingError> {
    let v = raw.trim().to_ascii_lowercase();
    match v.as_str() {
        "" | "false" | "no" | "n" | "off" => return Ok(false),
        "true" | "yes" | "y" | "on" => return Ok(true),
        _ => {}
    }
    BigDecimal::from_str(&v)
        .map(|n| !n.is_zero())
        .map_err(|_| PricingError::InvalidFlag(raw.to_string()))
}

pub mod pricing;

pub use pricing::{
    price_rows, CatalogRow, InventoryRow, PriceBreakdown, PricingError, PricingPolicy,
    CATALOG_COLUMNS, INVENTORY_COLUMNS,
};

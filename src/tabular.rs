//! CSV in and out: the vendor inventory feed and the SellerActive catalog.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use memchr::memchr;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::normalization::pricing::{CatalogRow, InventoryRow, CATALOG_COLUMNS, INVENTORY_COLUMNS};

const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Pick the candidate delimiter that occurs most often, outside quotes, in
/// the first line. Ties and empty input fall back to comma.
pub fn sniff_delimiter(sample: &[u8]) -> u8 {
    let end = memchr(b'\n', sample).unwrap_or(sample.len());
    let header = &sample[..end];

    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;
    for &b in header {
        if b == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(i) = DELIMITER_CANDIDATES.iter().position(|&d| d == b) {
            counts[i] += 1;
        }
    }

    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }
    DELIMITER_CANDIDATES[best]
}

/// Parse an inventory feed held in memory.
pub fn parse_inventory(data: &[u8]) -> Result<Vec<InventoryRow>, String> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let delimiter = sniff_delimiter(data);
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(data);

    let headers = rdr.headers().map_err(|e| e.to_string())?.clone();
    let missing: Vec<&str> = INVENTORY_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing required columns: {}", missing.join(", ")));
    }

    let mut rows = Vec::new();
    for (idx, record) in rdr.deserialize::<InventoryRow>().enumerate() {
        let row = record.map_err(|e| format!("record {}: {e}", idx + 1))?;
        rows.push(row);
    }
    let delimiter = char::from(delimiter);
    debug!(rows = rows.len(), delimiter = ?delimiter, "parsed inventory");
    Ok(rows)
}

pub fn read_inventory(path: &Path) -> SyncResult<Vec<InventoryRow>> {
    let data = fs::read(path).map_err(|e| SyncError::io(path, e))?;
    parse_inventory(&data).map_err(|reason| SyncError::parse(path, reason))
}

/// Write the catalog with the fixed header, replacing `path` atomically.
/// The header is written even when there are no rows.
pub fn write_catalog(path: &Path, rows: &[CatalogRow]) -> SyncResult<()> {
    let tmp = staging_path(path);
    write_rows(&tmp, rows).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        SyncError::io(&tmp, e)
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        SyncError::io(path, e)
    })?;
    debug!(path = %path.display(), rows = rows.len(), "catalog written");
    Ok(())
}

fn write_rows(path: &Path, rows: &[CatalogRow]) -> io::Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(CATALOG_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::pricing::{price_rows, PricingPolicy};

    const FEED: &str = "sku,price,1stclass,map,mrp,list,title\n\
                        A-1,10.00,0,15.00,20.00,18.00,Widget\n\
                        B-2,10.00,1,15.00,20.00,18.00,\"Gadget, large\"\n";

    #[test]
    fn sniffs_common_delimiters() {
        assert_eq!(sniff_delimiter(b"sku;price;map\n1;2;3"), b';');
        assert_eq!(sniff_delimiter(b"sku\tprice\tmap"), b'\t');
        assert_eq!(sniff_delimiter(b"sku|price|map"), b'|');
        assert_eq!(sniff_delimiter(b"sku,price,map"), b',');
        assert_eq!(sniff_delimiter(b"\"a;b;c\",d,e"), b',');
        assert_eq!(sniff_delimiter(b""), b',');
    }

    #[test]
    fn parses_rows_and_ignores_extra_columns() {
        let rows = parse_inventory(FEED.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "A-1");
        assert_eq!(rows[1].first_class, "1");
        assert_eq!(rows[1].list, "18.00");
    }

    #[test]
    fn parses_semicolon_feed_with_bom() {
        let feed = "\u{feff}sku;price;1stclass;map;mrp;list\nA-1; 10.00 ;0;15;20;18\n";
        let rows = parse_inventory(feed.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, "A-1");
        assert_eq!(rows[0].price, "10.00");
    }

    #[test]
    fn reports_missing_columns() {
        let err = parse_inventory(b"sku,price,map\nA,1,2\n").unwrap_err();
        assert_eq!(err, "missing required columns: 1stclass, mrp, list");
    }

    #[test]
    fn ragged_record_is_an_error() {
        let feed = "sku,price,1stclass,map,mrp,list\nA,1,0,2,3\n";
        assert!(parse_inventory(feed.as_bytes()).is_err());
    }

    #[test]
    fn writes_header_in_fixed_order_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("SellerActive.csv");
        std::fs::write(&out, "stale content\n").unwrap();

        let rows = parse_inventory(FEED.as_bytes()).unwrap();
        let priced = price_rows(&PricingPolicy::default(), &rows).unwrap();
        write_catalog(&out, &priced).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "SellerSKU,Cost,Price (Preferred),Price (minimum),Price (maximum),MAP Price,Price (retail)",
                "A-1,17.95,24.66,18.00,24.66,15.00,18.00",
                "B-2,12.61,18.75,18.00,18.75,15.00,18.00",
            ]
        );
        assert!(!tmp.path().join("SellerActive.csv.tmp").exists());
    }

    #[test]
    fn zero_money_is_written_with_two_decimals() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("SellerActive.csv");
        let feed = "sku,price,1stclass,map,mrp,list\nZ,10.00,0,,20,0\n";

        let rows = parse_inventory(feed.as_bytes()).unwrap();
        let priced = price_rows(&PricingPolicy::default(), &rows).unwrap();
        write_catalog(&out, &priced).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            text.lines().nth(1),
            Some("Z,17.95,24.66,0.00,24.66,0.00,0.00")
        );
    }

    #[test]
    fn empty_catalog_still_has_header() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("SellerActive.csv");
        write_catalog(&out, &[]).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn read_inventory_wraps_errors_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.csv");
        std::fs::write(&path, "sku\nA\n").unwrap();
        assert!(matches!(read_inventory(&path), Err(SyncError::Parse { .. })));
        assert!(matches!(
            read_inventory(&tmp.path().join("absent.csv")),
            Err(SyncError::Io { .. })
        ));
    }
}

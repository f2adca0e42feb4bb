//! Spreadsheet importer: CSV exports of the tender register into drafts.
//!
//! Registers are hand-kept spreadsheets with a title block above the real header,
//! so the header row is searched for rather than assumed. Columns are mapped by
//! Russian header keywords. This is a best-effort heuristic, not a validator.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::models::lenient::{parse_date, parse_number};
use crate::models::tender::{NewTender, TenderStatus};

/// The header must appear within this many leading rows.
const HEADER_SCAN_ROWS: usize = 10;

/// Words whose presence marks a header row.
const HEADER_MARKERS: &[&str] = &["откуда", "куда", "дата"];

/// Plausible range of Excel serial dates (1954 to 2119).
const EXCEL_SERIAL_RANGE: std::ops::RangeInclusive<f64> = 20_000.0..=80_000.0;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not find a header row (Откуда, Куда, Дата) in the first {0} rows")]
    HeaderNotFound(usize),
}

/// Column index per tender field, as detected from the header row.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub origin: Option<usize>,
    pub destination: Option<usize>,
    pub date: Option<usize>,
    pub weight: Option<usize>,
    pub pallets: Option<usize>,
    pub cubes: Option<usize>,
    pub places: Option<usize>,
    pub transport_type: Option<usize>,
    pub price: Option<usize>,
    pub carrier_price: Option<usize>,
    pub comment: Option<usize>,
    pub status: Option<usize>,
}

/// Reads CSV text into raw rows. The delimiter is guessed from the first line.
pub fn read_rows(text: &str) -> Result<Vec<Vec<String>>, ImportError> {
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(detect_delimiter(text))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn detect_delimiter(text: &str) -> u8 {
    let first_line = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();

    [b';', b'\t', b',']
        .into_iter()
        .max_by_key(|&d| first_line.matches(d as char).count())
        .filter(|&d| first_line.contains(d as char))
        .unwrap_or(b',')
}

pub fn find_header_row(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().take(HEADER_SCAN_ROWS).position(|row| {
        let joined = row.join(" ").to_lowercase();
        HEADER_MARKERS.iter().any(|marker| joined.contains(marker))
    })
}

/// Maps header cells to fields. Each header goes to the first rule it matches;
/// when two headers claim the same field, the leftmost one is kept.
pub fn map_columns(headers: &[String]) -> ColumnMap {
    let mut map = ColumnMap::default();

    for (index, header) in headers.iter().enumerate() {
        let h = header.to_lowercase();

        let slot = if contains_any(&h, &["откуда"]) {
            &mut map.origin
        } else if contains_any(&h, &["куда"]) {
            &mut map.destination
        } else if contains_any(&h, &["дата"]) {
            &mut map.date
        } else if contains_any(&h, &["вес"]) {
            &mut map.weight
        } else if contains_any(&h, &["паллет"]) {
            &mut map.pallets
        } else if contains_any(&h, &["куб", "м3"]) {
            &mut map.cubes
        } else if contains_any(&h, &["перевозчик", "индикатив"]) {
            &mut map.carrier_price
        } else if contains_any(&h, &["заказчик", "цена", "ставка"]) {
            &mut map.price
        } else if contains_any(&h, &["коммент", "примеч"]) {
            &mut map.comment
        } else if contains_any(&h, &["статус", "результат"]) {
            &mut map.status
        } else if contains_any(&h, &["тип", "транспорт"]) {
            &mut map.transport_type
        } else if contains_any(&h, &["мест"]) {
            &mut map.places
        } else {
            continue;
        };

        slot.get_or_insert(index);
    }

    map
}

/// Converts raw rows into drafts.
///
/// Rows before and including the header are skipped, as are empty rows and rows
/// with neither an origin nor a price. Imported rows default to `Lost`.
pub fn rows_to_drafts(rows: &[Vec<String>]) -> Result<Vec<NewTender>, ImportError> {
    let header_index = find_header_row(rows).ok_or(ImportError::HeaderNotFound(HEADER_SCAN_ROWS))?;
    let columns = map_columns(&rows[header_index]);

    let drafts = rows[header_index + 1..]
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| row_to_draft(row, &columns))
        .filter(|draft| !draft.origin.is_empty() || draft.price.is_some())
        .collect();

    Ok(drafts)
}

fn row_to_draft(row: &[String], columns: &ColumnMap) -> NewTender {
    let text = |idx: Option<usize>| cell(row, idx).map(str::to_string);

    NewTender {
        name: None,
        origin: text(columns.origin).unwrap_or_default(),
        destination: text(columns.destination).unwrap_or_default(),
        transport_type: text(columns.transport_type),
        weight: text(columns.weight),
        pallets: text(columns.pallets),
        cubes: text(columns.cubes),
        places: text(columns.places),
        capacity: None,
        price: cell(row, columns.price).and_then(parse_number),
        carrier_price: cell(row, columns.carrier_price).and_then(parse_number),
        status: cell(row, columns.status)
            .map(TenderStatus::from_loose)
            .unwrap_or_default(),
        comment: text(columns.comment).unwrap_or_default(),
        date: cell(row, columns.date).and_then(parse_cell_date),
    }
}

fn contains_any(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Accepts Excel serial day numbers as well as the usual date spellings.
fn parse_cell_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(serial) = raw.replace(',', ".").parse::<f64>() {
        if !EXCEL_SERIAL_RANGE.contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        return epoch.checked_add_signed(Duration::days(serial.floor() as i64));
    }
    parse_date(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTER: &str = "\
Реестр тендеров;;;;;\n\
;;;;;\n\
Дата;Откуда;Куда;Вес, т;Цена заказчика;Цена перевозчика;Комментарий\n\
45292;Алматы;Астана;20;450 000;410 000;тент\n\
;;;;;;\n\
15.01.2024;Шымкент;;10;;;\n\
;;Караганда;;;;без ставки и отправителя\n";

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_detects_semicolon_delimiter() {
        let rows = read_rows(REGISTER).unwrap();
        assert_eq!(rows[2][1], "Откуда");
    }

    #[test]
    fn test_detects_comma_delimiter() {
        let rows = read_rows("Дата,Откуда,Куда\n2024-01-01,Алматы,Астана\n").unwrap();
        assert_eq!(rows[1], strings(&["2024-01-01", "Алматы", "Астана"]));
    }

    #[test]
    fn test_header_row_found_below_title_block() {
        let rows = read_rows(REGISTER).unwrap();
        assert_eq!(find_header_row(&rows), Some(2));
    }

    #[test]
    fn test_origin_checked_before_destination() {
        let map = map_columns(&strings(&["Куда", "Откуда"]));
        assert_eq!(map.destination, Some(0));
        assert_eq!(map.origin, Some(1));
    }

    #[test]
    fn test_carrier_price_not_mistaken_for_price() {
        let map = map_columns(&strings(&["Цена перевозчика", "Ставка", "Индикатив"]));
        assert_eq!(map.carrier_price, Some(0));
        assert_eq!(map.price, Some(1));
    }

    #[test]
    fn test_unknown_headers_are_ignored() {
        let map = map_columns(&strings(&["№", "Менеджер"]));
        assert_eq!(map, ColumnMap::default());
    }

    #[test]
    fn test_rows_to_drafts() {
        let rows = read_rows(REGISTER).unwrap();
        let drafts = rows_to_drafts(&rows).unwrap();

        assert_eq!(drafts.len(), 2, "Blank row and row without origin/price are skipped");

        let first = &drafts[0];
        assert_eq!(first.origin, "Алматы");
        assert_eq!(first.destination, "Астана");
        assert_eq!(first.weight.as_deref(), Some("20"));
        assert_eq!(first.price, Some(450000.0));
        assert_eq!(first.carrier_price, Some(410000.0));
        assert_eq!(first.comment, "тент");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(first.status, TenderStatus::Lost);

        let second = &drafts[1];
        assert_eq!(second.origin, "Шымкент");
        assert_eq!(second.price, None);
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let rows = read_rows("a;b;c\n1;2;3\n").unwrap();
        assert!(matches!(
            rows_to_drafts(&rows),
            Err(ImportError::HeaderNotFound(10))
        ));
    }

    #[test]
    fn test_excel_serial_outside_range_is_absent() {
        assert_eq!(parse_cell_date("12"), None);
        assert_eq!(
            parse_cell_date("45292.5"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn test_status_column_is_read() {
        let rows = vec![
            strings(&["Откуда", "Статус"]),
            strings(&["Алматы", "Выигран"]),
        ];
        let drafts = rows_to_drafts(&rows).unwrap();
        assert_eq!(drafts[0].status, TenderStatus::Won);
    }
}

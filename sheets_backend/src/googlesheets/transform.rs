use super::columns::{ColumnType, column_definitions};
use super::model::{CellData, GridData};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use sheets_common::{DataFrame, Field, FieldValues};
use tracing::warn;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y",
    "%d %b %Y",
];

/// Resolves the spreadsheet time zone, UTC when absent or unknown.
pub fn resolve_time_zone(name: Option<&str>) -> Tz {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(time_zone = name, "Unknown spreadsheet time zone, using UTC");
            Tz::UTC
        }),
        None => Tz::UTC,
    }
}

/// Wall-clock time in `tz` as UTC. Ambiguous times take the earlier instant;
/// times inside a DST gap use the offset in effect before the gap.
fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt.with_timezone(&Utc));
    }
    let before_gap = naive.checked_sub_signed(Duration::days(1))?;
    let offset = tz.offset_from_utc_datetime(&before_gap).fix();
    let utc = naive.checked_sub_signed(Duration::seconds(offset.local_minus_utc().into()))?;
    Some(Utc.from_utc_datetime(&utc))
}

/// Converts a Sheets serial date (days since 1899-12-30) to a wall-clock time.
fn serial_to_naive(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::try_milliseconds(millis)?)
}

/// Parses a formatted date/time string as local time in `tz`.
pub fn parse_formatted_time(value: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return localize(naive, tz);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return localize(date.and_hms_opt(0, 0, 0)?, tz);
        }
    }
    None
}

/// Point in time of a date cell: the serial value when present, otherwise
/// the formatted text.
fn cell_time(cell: &CellData, tz: Tz) -> Option<DateTime<Utc>> {
    cell.number_value()
        .and_then(serial_to_naive)
        .and_then(|naive| localize(naive, tz))
        .or_else(|| parse_formatted_time(cell.formatted(), tz))
}

/// Result of converting one grid.
#[derive(Debug)]
pub struct Converted {
    pub frame: DataFrame,
    pub warnings: Vec<String>,
}

/// Turns grid data into a frame: first row is the header, one typed field
/// per header cell.
pub fn grid_to_frame(grid: &GridData, ref_id: &str, time_zone: Option<&str>) -> Converted {
    let rows = &grid.row_data;
    let columns = column_definitions(rows);
    let row_count = rows.len().saturating_sub(1);
    let tz = resolve_time_zone(time_zone);
    let mut warnings = Vec::new();

    for column in &columns {
        if column.has_mixed_types() {
            warn!(column = %column.header, "Multiple data types found in column");
            warnings.push(format!(
                "Multiple data types found in column {}. Using string data type",
                column.header
            ));
        }
        if column.has_mixed_units() {
            warn!(column = %column.header, "Multiple units found in column");
            warnings.push(format!(
                "Multiple units found in column {}. Formatted value will be used",
                column.header
            ));
        }
    }

    let mut fields: Vec<Field> = columns
        .iter()
        .map(|column| {
            let values = match column.column_type() {
                ColumnType::Time => FieldValues::Time(vec![None; row_count]),
                ColumnType::Number => FieldValues::Number(vec![None; row_count]),
                ColumnType::String => FieldValues::String(vec![None; row_count]),
            };
            Field::new(column.header.clone(), values).with_unit(column.unit())
        })
        .collect();

    for (row_index, row) in rows.iter().enumerate().skip(1) {
        let target = row_index - 1;
        for (column_index, cell) in row.values.iter().enumerate() {
            let Some(field) = fields.get_mut(column_index) else {
                continue;
            };
            match &mut field.values {
                FieldValues::Time(values) => {
                    if cell.is_empty() {
                        continue;
                    }
                    match cell_time(cell, tz) {
                        Some(t) => values[target] = Some(t),
                        None => warnings.push(format!(
                            "Error while parsing date at row {} in column {}",
                            row_index + 1,
                            field.name
                        )),
                    }
                }
                FieldValues::Number(values) => values[target] = cell.number_value(),
                FieldValues::String(values) => {
                    values[target] = cell.formatted_value.clone();
                }
            }
        }
    }

    Converted {
        frame: DataFrame::new(ref_id).with_fields(fields),
        warnings,
    }
}

use super::model::CellData;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnType {
    Time,
    Number,
    String,
}

/// What the data cells of one sheet column look like.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub header: String,
    pub column_index: usize,
    types: BTreeSet<ColumnType>,
    units: BTreeSet<String>,
}

impl ColumnDefinition {
    pub fn new(header: impl Into<String>, column_index: usize) -> Self {
        Self {
            header: header.into(),
            column_index,
            types: BTreeSet::new(),
            units: BTreeSet::new(),
        }
    }

    /// Records the type and unit of one data cell. Empty cells are ignored.
    pub fn check_cell(&mut self, cell: &CellData) {
        if cell.is_empty() {
            return;
        }

        let format = cell.number_format();
        match cell.number_value() {
            Some(_) => {
                let format_type = format.map(|f| f.format_type.as_str()).unwrap_or_default();
                if matches!(format_type, "DATE" | "TIME" | "DATE_TIME") {
                    self.types.insert(ColumnType::Time);
                } else {
                    self.types.insert(ColumnType::Number);
                    if let Some(unit) = format.and_then(|f| unit_for(&f.format_type, &f.pattern)) {
                        self.units.insert(unit.to_string());
                    }
                }
            }
            None => {
                self.types.insert(ColumnType::String);
            }
        }
    }

    /// A single observed type, otherwise string.
    pub fn column_type(&self) -> ColumnType {
        match (self.types.len(), self.types.first()) {
            (1, Some(t)) => *t,
            _ => ColumnType::String,
        }
    }

    /// The unit, when every unit-carrying cell agrees and the column is numeric.
    pub fn unit(&self) -> Option<String> {
        if self.column_type() != ColumnType::Number || self.has_mixed_units() {
            return None;
        }
        self.units.first().cloned()
    }

    pub fn has_mixed_types(&self) -> bool {
        self.types.len() > 1
    }

    pub fn has_mixed_units(&self) -> bool {
        self.units.len() > 1
    }
}

/// Maps a Sheets number format to a host unit id.
fn unit_for(format_type: &str, pattern: &str) -> Option<&'static str> {
    match format_type {
        "PERCENT" => Some("percent"),
        "CURRENCY" | "NUMBER" => match currency_symbol(pattern) {
            Some("€") => Some("currencyEUR"),
            Some("£") => Some("currencyGBP"),
            Some("¥") => Some("currencyJPY"),
            Some("$") => Some("currencyUSD"),
            _ if strip_brackets(pattern).contains('%') => Some("percent"),
            _ => None,
        },
        _ => None,
    }
}

/// Currency symbol of a pattern: the locale block (`[$€-407]`) wins over bare
/// symbols. A block without a symbol (`[$-409]`) only names a locale.
fn currency_symbol(pattern: &str) -> Option<&'static str> {
    if let Some(start) = pattern.find("[$") {
        let rest = &pattern[start + 2..];
        let end = rest.find([']', '-']).unwrap_or(rest.len());
        return known_symbol(&rest[..end]);
    }
    known_symbol(&strip_brackets(pattern))
}

fn known_symbol(text: &str) -> Option<&'static str> {
    ["€", "£", "¥", "$"]
        .into_iter()
        .find(|symbol| text.contains(symbol))
}

/// Pattern text outside `[...]` blocks (locales, colors, conditions).
fn strip_brackets(pattern: &str) -> String {
    let mut depth = 0usize;
    pattern
        .chars()
        .filter(|c| match c {
            '[' => {
                depth += 1;
                false
            }
            ']' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

/// Header name for column `column_index`: trimmed header text, `Field N` when
/// blank, suffixed with a counter when already taken.
pub fn unique_column_name(formatted: &str, column_index: usize, taken: &HashSet<String>) -> String {
    let base = if formatted.is_empty() {
        format!("Field {}", column_index + 1)
    } else {
        formatted.to_string()
    };

    if !taken.contains(&base) {
        return base;
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{base}{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Builds one definition per header cell and feeds every data cell to it.
pub fn column_definitions(rows: &[super::model::RowData]) -> Vec<ColumnDefinition> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };

    let mut taken = HashSet::new();
    let mut columns: Vec<ColumnDefinition> = header
        .values
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let name = unique_column_name(cell.formatted().trim(), index, &taken);
            taken.insert(name.clone());
            ColumnDefinition::new(name, index)
        })
        .collect();

    for row in data {
        for column in &mut columns {
            if let Some(cell) = row.values.get(column.column_index) {
                column.check_cell(cell);
            }
        }
    }

    columns
}

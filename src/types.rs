use calamine::Data;
use indexmap::IndexMap;
use std::fmt;

//==============================================================================
// Cell Values
//==============================================================================

/// A single raw cell pulled from the Inputs sheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank cell, Excel error value, or one of [`MISSING_MARKERS`]
    Missing,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// True when the cell marks the active slot of a one-hot selector
    pub fn is_active_flag(&self) -> bool {
        match self {
            CellValue::Number(n) => *n == 1.0,
            CellValue::Bool(b) => *b,
            _ => false,
        }
    }

    /// String form written into the document ("" for missing cells)
    pub fn to_param_string(&self) -> String {
        match self {
            CellValue::Missing => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => f.write_str("nan"),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
        }
    }
}

/// Text cells that mean "no value", as spreadsheet tools commonly export them
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty | Data::Error(_) => CellValue::Missing,
            Data::String(s) if MISSING_MARKERS.contains(&s.as_str()) => CellValue::Missing,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// Format a number the way a spreadsheet user typed it: whole numbers lose their
/// fractional part, everything else keeps the shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

//==============================================================================
// Field Records
//==============================================================================

/// Value of one parameter inside a field record
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Plain string value (empty for a missing cell)
    Scalar(String),
    /// One-hot selector flags that have not been resolved to a label yet
    Selector(Vec<CellValue>),
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ParamValue::Scalar(s) => Some(s),
            ParamValue::Selector(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Scalar(s) => f.write_str(s),
            ParamValue::Selector(flags) => {
                let parts: Vec<String> = flags.iter().map(|c| c.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Parameters of one field, keyed by parameter name in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    /// Display name from the header row (or a synthesized one)
    pub name: String,
    pub params: IndexMap<String, ParamValue>,
}

impl FieldRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, param: impl Into<String>, value: ParamValue) {
        self.params.insert(param.into(), value);
    }

    pub fn get(&self, param: &str) -> Option<&ParamValue> {
        self.params.get(param)
    }

    /// Scalar value of a parameter, if present and already a string
    pub fn scalar(&self, param: &str) -> Option<&str> {
        self.params.get(param).and_then(ParamValue::as_scalar)
    }

    /// Remove a parameter while keeping the order of the rest
    pub fn remove(&mut self, param: &str) -> Option<ParamValue> {
        self.params.shift_remove(param)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

//==============================================================================
// Diagnostics
//==============================================================================

/// Problems found while resolving a one-hot selector to its label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorWarning {
    /// No position was set; the flags are kept as-is
    NoneActive { field: String, param: String },
    /// Several positions were set; the last one was used
    SeveralActive {
        field: String,
        param: String,
        positions: Vec<u32>,
    },
    /// The selected position has no label; the flags are kept as-is
    Unmapped {
        field: String,
        param: String,
        position: u32,
    },
}

impl fmt::Display for SelectorWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorWarning::NoneActive { field, param } => {
                write!(f, "{field}: '{param}' has no active option, left unconverted")
            }
            SelectorWarning::SeveralActive {
                field,
                param,
                positions,
            } => write!(
                f,
                "{field}: '{param}' has several active options {positions:?}, using the last"
            ),
            SelectorWarning::Unmapped {
                field,
                param,
                position,
            } => write!(
                f,
                "{field}: '{param}' option {position} has no label, left unconverted"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_whole_and_fractional() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(0.00001), "0.00001");
    }

    #[test]
    fn test_cell_from_calamine_data() {
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Missing);
        assert_eq!(
            CellValue::from(&Data::String(String::new())),
            CellValue::Missing
        );
        assert_eq!(CellValue::from(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(
            CellValue::from(&Data::String("Canada".to_string())),
            CellValue::Text("Canada".to_string())
        );
        assert_eq!(CellValue::from(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn test_missing_markers_read_as_missing() {
        for marker in ["NA", "n/a", "None", "null", "#N/A", "nan"] {
            let cell = CellValue::from(&Data::String(marker.to_string()));
            assert_eq!(cell, CellValue::Missing, "{marker}");
            assert_eq!(cell.to_param_string(), "");
        }
        // Only exact markers; ordinary text containing them stays text
        assert_eq!(
            CellValue::from(&Data::String("NA gas".to_string())),
            CellValue::Text("NA gas".to_string())
        );
        assert_eq!(
            CellValue::from(&Data::String(" none".to_string())),
            CellValue::Text(" none".to_string())
        );
    }

    #[test]
    fn test_param_string() {
        assert_eq!(CellValue::Missing.to_param_string(), "");
        assert_eq!(CellValue::Number(1500.0).to_param_string(), "1500");
        assert_eq!(CellValue::Bool(false).to_param_string(), "False");
    }

    #[test]
    fn test_selector_display() {
        let value = ParamValue::Selector(vec![
            CellValue::Number(0.0),
            CellValue::Missing,
            CellValue::Number(0.0),
        ]);
        assert_eq!(value.to_string(), "[0, nan, 0]");
    }

    #[test]
    fn test_record_remove_keeps_order() {
        let mut record = FieldRecord::new("Alpha");
        record.insert("a", ParamValue::Scalar("1".into()));
        record.insert("b", ParamValue::Scalar("2".into()));
        record.insert("c", ParamValue::Scalar("3".into()));
        record.remove("b");

        let keys: Vec<&String> = record.params.keys().collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(record.scalar("c"), Some("3"));
    }
}

//! Coded value conversion
//!
//! Several Inputs rows hold integer codes (`upgrader_type = 2`) or one-hot
//! selectors (`[0, 0, 1]`) where OPGEE v4 expects the option label. The
//! conversion table maps each code to its label, per parameter.

use crate::types::{CellValue, FieldRecord, ParamValue, SelectorWarning};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Per-parameter code → label mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionTable {
    maps: HashMap<String, BTreeMap<u32, String>>,
}

impl ConversionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the mapping for one parameter
    pub fn with_mapping(mut self, param: &str, pairs: &[(u32, &str)]) -> Self {
        let map = pairs
            .iter()
            .map(|(code, label)| (*code, label.to_string()))
            .collect();
        self.maps.insert(param.to_string(), map);
        self
    }

    /// Labels used by OPGEE v4
    pub fn opgee() -> Self {
        Self::new()
            .with_mapping("flood_gas_type", &[(1, "NG"), (2, "N2"), (3, "CO2")])
            .with_mapping(
                "upgrader_type",
                &[
                    (0, "None"),
                    (1, "Delayed Coking"),
                    (2, "Hydroconvention"),
                    (3, "Combined Hydroconversion and Fluid Coking"),
                ],
            )
            .with_mapping(
                "gas_processing_path",
                &[
                    (1, "None"),
                    (2, "Minimal"),
                    (3, "Acid Gas"),
                    (4, "Wet Gas"),
                    (5, "Acid Wet Gas"),
                    (6, "Sour Gas Reinjection"),
                    (7, "CO2-EOR Membrane"),
                    (8, "CO2-EOR Ryan Holmes"),
                ],
            )
            .with_mapping(
                "ecosystem_richness",
                &[(1, "Low carbon"), (2, "Med carbon"), (3, "High carbon")],
            )
            .with_mapping(
                "field_development_intensity",
                &[(1, "Low"), (2, "Med"), (3, "High")],
            )
    }

    pub fn label(&self, param: &str, code: u32) -> Option<&str> {
        self.maps
            .get(param)
            .and_then(|map| map.get(&code))
            .map(String::as_str)
    }

    /// Replace codes with labels in place.
    ///
    /// Scalars convert only when they are a plain non-negative integer with a
    /// label; anything else passes through. Selectors resolve to the label of
    /// their last active position.
    pub fn apply(&self, record: &mut FieldRecord) -> Vec<SelectorWarning> {
        let mut warnings = Vec::new();
        let field = record.name.clone();

        for (param, value) in record.params.iter_mut() {
            if !self.maps.contains_key(param) {
                continue;
            }

            let converted = match value {
                ParamValue::Scalar(text) => parse_code(text)
                    .and_then(|code| self.label(param, code))
                    .map(str::to_string),
                ParamValue::Selector(flags) => {
                    self.resolve_selector(&field, param, flags, &mut warnings)
                }
            };

            if let Some(label) = converted {
                *value = ParamValue::Scalar(label);
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        warnings
    }
}

fn parse_code(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl ConversionTable {
    fn resolve_selector(
        &self,
        field: &str,
        param: &str,
        flags: &[CellValue],
        warnings: &mut Vec<SelectorWarning>,
    ) -> Option<String> {
        let active: Vec<u32> = flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| flag.is_active_flag())
            .map(|(i, _)| i as u32 + 1)
            .collect();

        let Some(&position) = active.last() else {
            warnings.push(SelectorWarning::NoneActive {
                field: field.to_string(),
                param: param.to_string(),
            });
            return None;
        };

        if active.len() > 1 {
            warnings.push(SelectorWarning::SeveralActive {
                field: field.to_string(),
                param: param.to_string(),
                positions: active.clone(),
            });
        }

        match self.label(param, position) {
            Some(label) => Some(label.to_string()),
            None => {
                warnings.push(SelectorWarning::Unmapped {
                    field: field.to_string(),
                    param: param.to_string(),
                    position,
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(values: &[f64]) -> ParamValue {
        ParamValue::Selector(values.iter().map(|v| CellValue::Number(*v)).collect())
    }

    fn record_with(param: &str, value: ParamValue) -> FieldRecord {
        let mut record = FieldRecord::new("Alpha");
        record.insert(param, value);
        record
    }

    #[test]
    fn test_scalar_code_to_label() {
        let table = ConversionTable::opgee();
        let mut record = record_with("upgrader_type", ParamValue::Scalar("2".into()));
        let warnings = table.apply(&mut record);

        assert!(warnings.is_empty());
        assert_eq!(record.scalar("upgrader_type"), Some("Hydroconvention"));
    }

    #[test]
    fn test_scalar_unmapped_passes_through() {
        let table = ConversionTable::opgee();
        let mut record = record_with("upgrader_type", ParamValue::Scalar("9".into()));
        table.apply(&mut record);
        assert_eq!(record.scalar("upgrader_type"), Some("9"));
    }

    #[test]
    fn test_scalar_non_numeric_passes_through() {
        let table = ConversionTable::opgee();
        for raw in ["", "2.5", "-1", "Acid Gas"] {
            let mut record = record_with("gas_processing_path", ParamValue::Scalar(raw.into()));
            table.apply(&mut record);
            assert_eq!(record.scalar("gas_processing_path"), Some(raw));
        }
    }

    #[test]
    fn test_parameter_without_mapping_untouched() {
        let table = ConversionTable::opgee();
        let mut record = record_with("API", ParamValue::Scalar("1".into()));
        table.apply(&mut record);
        assert_eq!(record.scalar("API"), Some("1"));
    }

    #[test]
    fn test_selector_resolves_position() {
        let table = ConversionTable::opgee();

        let mut high = record_with("ecosystem_richness", flags(&[0.0, 0.0, 1.0]));
        assert!(table.apply(&mut high).is_empty());
        assert_eq!(high.scalar("ecosystem_richness"), Some("High carbon"));

        let mut low = record_with("ecosystem_richness", flags(&[1.0, 0.0, 0.0]));
        table.apply(&mut low);
        assert_eq!(low.scalar("ecosystem_richness"), Some("Low carbon"));

        let mut med = record_with("field_development_intensity", flags(&[0.0, 1.0, 0.0]));
        table.apply(&mut med);
        assert_eq!(med.scalar("field_development_intensity"), Some("Med"));
    }

    #[test]
    fn test_selector_none_active_left_unconverted() {
        let table = ConversionTable::opgee();
        let mut record = record_with("ecosystem_richness", flags(&[0.0, 0.0, 0.0]));
        let warnings = table.apply(&mut record);

        assert_eq!(
            warnings,
            vec![SelectorWarning::NoneActive {
                field: "Alpha".to_string(),
                param: "ecosystem_richness".to_string(),
            }]
        );
        assert_eq!(record.get("ecosystem_richness"), Some(&flags(&[0.0, 0.0, 0.0])));
    }

    #[test]
    fn test_selector_several_active_uses_last() {
        let table = ConversionTable::opgee();
        let mut record = record_with("field_development_intensity", flags(&[1.0, 0.0, 1.0]));
        let warnings = table.apply(&mut record);

        assert_eq!(record.scalar("field_development_intensity"), Some("High"));
        assert!(matches!(
            &warnings[..],
            [SelectorWarning::SeveralActive { positions, .. }] if positions == &vec![1, 3]
        ));
    }

    #[test]
    fn test_selector_unmapped_position() {
        let table = ConversionTable::opgee();
        let mut record = record_with("ecosystem_richness", flags(&[0.0, 0.0, 0.0, 1.0]));
        let warnings = table.apply(&mut record);

        assert!(matches!(
            &warnings[..],
            [SelectorWarning::Unmapped { position: 4, .. }]
        ));
        assert!(matches!(
            record.get("ecosystem_richness"),
            Some(ParamValue::Selector(_))
        ));
    }

    #[test]
    fn test_custom_table() {
        let table = ConversionTable::new().with_mapping("offshore", &[(0, "No"), (1, "Yes")]);
        assert_eq!(table.label("offshore", 1), Some("Yes"));
        assert_eq!(table.label("offshore", 2), None);
        assert_eq!(table.label("upgrader_type", 2), None);

        let mut record = record_with("offshore", ParamValue::Scalar("1".into()));
        record.insert("upgrader_type", ParamValue::Scalar("2".into()));
        table.apply(&mut record);
        assert_eq!(record.scalar("offshore"), Some("Yes"));
        assert_eq!(record.scalar("upgrader_type"), Some("2"));
    }
}

//! Row schema of the OPGEE Inputs sheet
//!
//! The Inputs sheet stores one field per column. Parameters sit in fixed row
//! blocks separated by blank or heading rows. The schema lists those blocks in
//! order together with the parameter names their rows carry, so the mapping
//! from rows to names is checked once at construction time.

use crate::error::{FuseError, FuseResult};
use std::collections::HashSet;

/// Inclusive, 1-indexed range of table rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u32,
    pub end: u32,
}

impl RowRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn rows(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// What the rows of a block hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// One scalar parameter per row, in row order
    Scalars(Vec<String>),
    /// One parameter encoded one-hot across all rows of the block
    Selector(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaBlock {
    pub rows: RowRange,
    pub kind: BlockKind,
}

impl SchemaBlock {
    pub fn scalars(start: u32, end: u32, names: &[&str]) -> Self {
        Self {
            rows: RowRange::new(start, end),
            kind: BlockKind::Scalars(names.iter().map(|n| n.to_string()).collect()),
        }
    }

    pub fn selector(start: u32, end: u32, name: &str) -> Self {
        Self {
            rows: RowRange::new(start, end),
            kind: BlockKind::Selector(name.to_string()),
        }
    }
}

/// Location of a one-hot selector inside the extracted values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSlot {
    pub name: String,
    pub offset: usize,
    pub width: usize,
}

/// Named, versioned table of row blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    name: String,
    blocks: Vec<SchemaBlock>,
}

impl RowSchema {
    /// Build a schema, rejecting blocks whose names do not cover their rows
    pub fn new(name: impl Into<String>, blocks: Vec<SchemaBlock>) -> FuseResult<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        let mut last_end = 0;

        for block in &blocks {
            let RowRange { start, end } = block.rows;
            if start == 0 || end < start {
                return Err(FuseError::Schema(format!(
                    "{name}: invalid row range ({start}, {end})"
                )));
            }
            if start <= last_end {
                return Err(FuseError::Schema(format!(
                    "{name}: row range ({start}, {end}) overlaps or precedes row {last_end}"
                )));
            }
            last_end = end;

            let names: Vec<&String> = match &block.kind {
                BlockKind::Scalars(names) => {
                    if names.len() != block.rows.len() {
                        return Err(FuseError::Schema(format!(
                            "{name}: rows ({start}, {end}) hold {} values but {} names are given",
                            block.rows.len(),
                            names.len()
                        )));
                    }
                    names.iter().collect()
                }
                BlockKind::Selector(param) => vec![param],
            };
            for param in names {
                if !seen.insert(param.clone()) {
                    return Err(FuseError::Schema(format!(
                        "{name}: parameter '{param}' appears twice"
                    )));
                }
            }
        }

        Ok(Self { name, blocks })
    }

    /// OPGEE 3.0c Inputs sheet layout
    pub fn opgee_3_0c() -> Self {
        Self::new("opgee-3.0c", Self::opgee_3_0c_blocks())
            .expect("built-in OPGEE 3.0c schema is consistent")
    }

    fn opgee_3_0c_blocks() -> Vec<SchemaBlock> {
        vec![
            SchemaBlock::scalars(
                8,
                16,
                &[
                    "downhole_pump",
                    "water_reinjection",
                    "natural_gas_reinjection",
                    "water_flooding",
                    "gas_lifting",
                    "gas_flooding",
                    "steam_flooding",
                    "oil_sands_mine_upgrader",
                    "oil_sands_mine_no_upgrader",
                ],
            ),
            SchemaBlock::scalars(
                19,
                30,
                &[
                    "country",
                    "name",
                    "age",
                    "depth",
                    "oil_prod",
                    "num_prod_wells",
                    "num_water_inj_wells",
                    "well_diam",
                    "prod_index",
                    "res_press",
                    "res_temp",
                    "offshore",
                ],
            ),
            SchemaBlock::scalars(33, 33, &["API"]),
            SchemaBlock::scalars(
                35,
                41,
                &[
                    "gas_comp_N2",
                    "gas_comp_CO2",
                    "gas_comp_C1",
                    "gas_comp_C2",
                    "gas_comp_C3",
                    "gas_comp_C4",
                    "gas_comp_H2S",
                ],
            ),
            SchemaBlock::scalars(
                45,
                50,
                &["GOR", "WOR", "WIR", "GLIR", "GFIR", "flood_gas_type"],
            ),
            SchemaBlock::scalars(57, 58, &["frac_CO2_breakthrough", "FILLER_source_of_CO2"]),
            SchemaBlock::scalars(
                61,
                67,
                &[
                    "FILLER_perc_seq_credit",
                    "SOR",
                    "fraction_elec_onsite",
                    "fraction_remaining_gas_inj",
                    "fraction_water_reinjected",
                    "fraction_steam_cogen",
                    "fraction_steam_solar",
                ],
            ),
            SchemaBlock::scalars(
                69,
                71,
                &["heater_treater", "stabilizer_column", "upgrader_type"],
            ),
            SchemaBlock::scalars(76, 76, &["gas_processing_path"]),
            SchemaBlock::scalars(85, 87, &["FOR", "frac_venting", "fraction_diluent"]),
            SchemaBlock::selector(91, 93, "ecosystem_richness"),
            SchemaBlock::selector(95, 97, "field_development_intensity"),
            SchemaBlock::scalars(
                101,
                105,
                &[
                    "frac_transport_tanker",
                    "frac_transport_barge",
                    "frac_transport_pipeline",
                    "frac_transport_rail",
                    "frac_transport_truck",
                ],
            ),
            SchemaBlock::scalars(
                107,
                112,
                &[
                    "transport_dist_tanker",
                    "transport_dist_barge",
                    "transport_dist_pipeline",
                    "transport_dist_rail",
                    "transport_dist_truck",
                    "ocean_tanker_size",
                ],
            ),
            SchemaBlock::scalars(114, 114, &["small_sources_emissions"]),
        ]
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ranges(&self) -> impl Iterator<Item = RowRange> + '_ {
        self.blocks.iter().map(|b| b.rows)
    }

    /// Number of values extracted per column
    pub fn row_count(&self) -> usize {
        self.blocks.iter().map(|b| b.rows.len()).sum()
    }

    /// Last table row the schema reads
    pub fn last_row(&self) -> u32 {
        self.blocks.last().map(|b| b.rows.end).unwrap_or(0)
    }

    /// All parameter names in document order
    pub fn parameter_names(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .flat_map(|b| match &b.kind {
                BlockKind::Scalars(names) => names.iter().map(String::as_str).collect::<Vec<_>>(),
                BlockKind::Selector(name) => vec![name.as_str()],
            })
            .collect()
    }

    /// Scalar parameter names, i.e. the names flat values map onto positionally
    pub fn scalar_names(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match &b.kind {
                BlockKind::Scalars(names) => Some(names.iter().map(String::as_str)),
                BlockKind::Selector(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Positions of the one-hot selectors within the extracted values
    pub fn selectors(&self) -> Vec<SelectorSlot> {
        let mut offset = 0;
        let mut slots = Vec::new();
        for block in &self.blocks {
            if let BlockKind::Selector(name) = &block.kind {
                slots.push(SelectorSlot {
                    name: name.clone(),
                    offset,
                    width: block.rows.len(),
                });
            }
            offset += block.rows.len();
        }
        slots
    }

}

impl Default for RowSchema {
    fn default() -> Self {
        Self::opgee_3_0c()
    }
}

/// Where things live on the Inputs sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub sheet_name: String,
    /// Table row holding the field display names
    pub name_row: u32,
    /// 0-based index of the first field column
    pub first_data_column: u32,
    /// Rows above table row 1 (the sheet's title row)
    pub header_rows: u32,
}

impl SheetLayout {
    /// Absolute 0-based sheet row of a 1-indexed table row
    pub fn sheet_row(&self, table_row: u32) -> u32 {
        table_row + self.header_rows - 1
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Inputs".to_string(),
            name_row: 4,
            first_data_column: 7,
            header_rows: 1,
        }
    }
}

/// Parameters read from the sheet but never written to the document
pub const REMOVED_PARAMETERS: &[&str] = &[
    "ocean_tanker_size",
    "small_sources_emissions",
    "FILLER_source_of_CO2",
    "FILLER_perc_seq_credit",
    "oil_sands_mine_no_upgrader",
    "oil_sands_mine_upgrader",
];

// ABOUTME: Table rendering for CLI output

use std::collections::HashMap;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use keel_settings::UNKNOWN_SETTING_LABEL;
use keel_storage::{SettingSource, StoredRecord};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

pub fn effective_values_table(values: &HashMap<String, String>) -> Table {
    let mut table = new_table(vec!["Name", "Effective Value"]);

    let mut names: Vec<&String> = values.keys().collect();
    names.sort();
    for name in names {
        table.add_row(vec![name.clone(), values[name].clone()]);
    }
    table
}

pub fn records_table(records: &[StoredRecord]) -> Table {
    let mut table = new_table(vec!["Name", "Value", "Default", "Source", "Unknown"]);

    for record in records {
        let source = match record.source {
            SettingSource::Env => "env",
            SettingSource::Stored => "-",
        };
        let unknown = if record.labels.contains_key(UNKNOWN_SETTING_LABEL) {
            "yes"
        } else {
            ""
        };

        table.add_row(vec![
            record.name.clone(),
            record.value.clone(),
            record.default.clone(),
            source.to_string(),
            unknown.to_string(),
        ]);
    }
    table
}

//! Markdown rendering for the quick-access index

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

/// Render the index: letter-grouped sections sorted case-insensitively,
/// one bullet per entity listing the files that mention it
pub fn render(entities: &BTreeMap<String, Vec<String>>, generated_at: DateTime<Local>) -> String {
    let mut names: Vec<&String> = entities.keys().collect();
    names.sort_by_key(|name| name.to_lowercase());

    let mut out = String::new();
    out.push_str("# Quick Access Index\n\n");
    out.push_str("**Purpose:** Find which study guide covers a drug or condition\n\n");
    out.push_str(&format!("**Last Updated:** {}\n\n", generated_at.format("%Y-%m-%d %H:%M")));
    out.push_str("---\n\n");

    let mut current_letter: Option<char> = None;
    for name in &names {
        let letter = leading_letter(name);
        if current_letter != Some(letter) {
            if current_letter.is_some() {
                out.push('\n');
            }
            current_letter = Some(letter);
            out.push_str(&format!("## {letter}\n\n"));
        }
        out.push_str(&format!("- **{}** → {}\n", name, entities[*name].join(", ")));
    }

    out.push_str("\n---\n\n");
    out.push_str(&format!("**Total Entities:** {}\n\n", names.len()));
    out.push_str("**How to use:**\n");
    out.push_str("1. Search this page for a drug or condition (Ctrl+F / Cmd+F)\n");
    out.push_str("2. Note which file(s) list it\n");
    out.push_str("3. Open that file for the full chart\n");
    out
}

fn leading_letter(name: &str) -> char {
    name.chars().next().map(|c| c.to_uppercase().next().unwrap_or(c)).unwrap_or('#')
}

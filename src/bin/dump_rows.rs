use std::fs;

use aroma_menu_api::extract::collect_rows;
use aroma_menu_api::{LayoutConfig, init_tracing, parser};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/menu.pdf".to_string());
    let bytes = fs::read(&path)?;
    let rows = collect_rows(&bytes)?;

    println!("=== ROWS ({}) ===", rows.len());
    for row in &rows {
        let cells: Vec<String> = row
            .tokens
            .iter()
            .map(|t| format!("{:.3}:{:?}", t.x, t.text))
            .collect();
        println!("{:>9.3} | {}", row.y, cells.join("  "));
    }

    let menu = parser::parse_rows(&rows, &LayoutConfig::default());
    println!("\n=== PARSED ===");
    println!("{}", serde_json::to_string_pretty(&menu)?);

    Ok(())
}

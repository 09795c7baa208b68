use super::ui;
use crate::core::config::AppConfig;
use crate::core::{QuoteRecord, QuoteStore};
use crate::store::SqliteQuoteStore;
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Prints the most recent persisted quotes, newest first.
pub async fn show_history(config: &AppConfig, limit: u32) -> Result<()> {
    let store = SqliteQuoteStore::initialize(&config.store)
        .await
        .with_context(|| format!("Failed to open database: {}", config.store.path.display()))?;
    let records = store
        .recent(limit)
        .await
        .context("Failed to read quote history")?;

    if records.is_empty() {
        println!(
            "{}",
            ui::style_text("No quotes recorded yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    println!("{}", ui::style_text("USD-BRL bids", ui::StyleType::Title));
    println!("{}", history_table(&records));
    Ok(())
}

fn history_table(records: &[QuoteRecord]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Bid"),
        ui::header_cell("Recorded at (UTC)"),
    ]);

    for record in records {
        table.add_row(vec![
            ui::number_cell(record.id),
            ui::bid_cell(&record.bid),
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_history_table_lists_every_record() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 6, 11)
            .unwrap()
            .and_hms_opt(16, 59, 59)
            .unwrap();
        let records = vec![
            QuoteRecord {
                id: 2,
                bid: "5.2601".to_string(),
                timestamp,
            },
            QuoteRecord {
                id: 1,
                bid: "5.2543".to_string(),
                timestamp,
            },
        ];

        let rendered = history_table(&records);
        assert!(rendered.contains("5.2601"));
        assert!(rendered.contains("5.2543"));
        assert!(rendered.contains("2024-06-11 16:59:59"));
    }

    #[tokio::test]
    async fn test_show_history_on_fresh_database() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut config = AppConfig::default();
        config.store.path = dir.path().join("cotacoes.db");

        show_history(&config, 5).await?;
        assert!(config.store.path.exists());
        Ok(())
    }
}

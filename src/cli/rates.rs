use super::ui;
use crate::cache::RateCacheManager;
use crate::core::snapshot::{RateSnapshot, normalize_code};
use anyhow::{Result, bail};

impl RateSnapshot {
    /// Renders rates against the snapshot base. With no `codes`, every rate is listed.
    pub fn display_as_table(&self, codes: &[String]) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell(&format!("Rate ({})", self.base)),
        ]);

        let selected: Vec<&str> = if codes.is_empty() {
            self.rates.keys().map(String::as_str).collect()
        } else {
            codes.iter().map(String::as_str).collect()
        };

        for code in selected {
            let rate = self
                .rate(code)
                .map_or("N/A".to_string(), |r| format!("{r:.4}"));
            table.add_row(vec![comfy_table::Cell::new(code), ui::number_cell(rate)]);
        }

        let title = format!("Rates for {} (base {})", self.date, self.base);
        format!(
            "{}\n\n{}",
            ui::style_text(&title, ui::StyleType::Title),
            table
        )
    }
}

pub async fn run(manager: &RateCacheManager, codes: &[String]) -> Result<()> {
    let mut normalized = Vec::with_capacity(codes.len());
    for code in codes {
        match normalize_code(code) {
            Some(code) => normalized.push(code),
            None => bail!("Invalid currency code: {code}"),
        }
    }

    let spinner = ui::new_spinner("Loading today's rates...");
    let snapshot = manager.get_current_snapshot().await;
    spinner.finish_and_clear();

    println!("{}", snapshot?.display_as_table(&normalized));
    Ok(())
}

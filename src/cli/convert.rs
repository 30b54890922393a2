use super::ui;
use crate::cache::RateCacheManager;
use crate::convert::convert;
use anyhow::{Result, bail};

/// One-shot conversion against today's snapshot, the same way the bot answers `/convert`.
pub async fn run(manager: &RateCacheManager, from: &str, to: &str, amount: &str) -> Result<()> {
    let spinner = ui::new_spinner("Loading today's rates...");
    let snapshot = manager.get_current_snapshot().await;
    spinner.finish_and_clear();
    let snapshot = snapshot?;

    match convert(&snapshot, Some(from), Some(to), Some(amount)) {
        Ok(conversion) => {
            println!(
                "{}",
                ui::style_text(&conversion.to_string(), ui::StyleType::Result)
            );
            println!(
                "{}",
                ui::style_text(
                    &format!("Rates as of {} (base {})", snapshot.date, snapshot.base),
                    ui::StyleType::Subtle
                )
            );
            Ok(())
        }
        Err(rejected) => bail!("{rejected}"),
    }
}

//! List supported encodings

use anyhow::Result;
use overseer_core::Encoding;
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    println!("{}", "Encodings".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{:<4} {:<14} {:<10} {:<6}", "#", "label", "bom", "unit");

    for encoding in Encoding::ALL {
        let bom = encoding.bom();
        let bom = if bom.is_empty() {
            "-".to_string()
        } else {
            bom.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ")
        };
        println!(
            "{:<4} {:<14} {:<10} {:<6}",
            encoding.ordinal(),
            encoding.label().cyan(),
            bom,
            encoding.code_unit_width()
        );
    }
    Ok(())
}

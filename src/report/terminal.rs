use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use license_discovery::models::{LicenseSource, ShortLicense};

/// Render a colored terminal report for one discovery run.
pub fn render(found: Option<&ShortLicense>, path: &Path, remote_url: Option<&str>, quiet: bool) -> Result<()> {
    if quiet {
        match found {
            Some(license) => println!("{}", license.name),
            None => println!("{}", "not found".red()),
        }
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "license-discovery".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Searching: {}", path.display());
    if let Some(url) = remote_url {
        println!(" Remote:    {}", url);
    }
    println!();

    let Some(license) = found else {
        println!(" {} No license could be discovered.\n", "[MISSING]".red().bold());
        return Ok(());
    };

    let source_color = match license.source() {
        LicenseSource::Packaged => Color::Green,
        LicenseSource::External => Color::Yellow,
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Location").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
        ]);
    table.add_row(vec![
        Cell::new(&license.name).add_attribute(Attribute::Bold),
        Cell::new(license.location.display()),
        Cell::new(license.source().to_string()).fg(source_color),
    ]);

    println!(" {} License discovered:\n", "[FOUND]".green().bold());
    println!("{}", table);
    if !license.is_packaged {
        println!(
            "\n {} license text lives outside the project; remove {} when done.",
            "note:".yellow(),
            license.location.display()
        );
    }
    println!();

    Ok(())
}

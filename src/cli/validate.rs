use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

/// Validate an input workbook
pub fn run(input: PathBuf, substance_id: String) -> Result<()> {
    use platescreen::validator::validate_workbook;
    use platescreen::workbook::Workbook;

    info!("platescreen Validator");
    info!("=====================");
    info!("Workbook: {}", input.display());
    info!("");

    let workbook = Workbook::from_dir(&input)
        .with_context(|| format!("Failed to read workbook {}", input.display()))?;
    let report = validate_workbook(&workbook, &substance_id);

    // Use colorized output if available
    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    // Exit with error code if validation failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

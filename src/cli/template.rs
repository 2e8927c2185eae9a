use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use platescreen::geometry::PlateFormat;
use platescreen::metadata::generate_input_table;
use platescreen::reader::read_readerfiles;
use platescreen::writer::write_template;

/// Write an input table template
pub fn run(readouts: Option<PathBuf>, format: PlateFormat, output: PathBuf) -> Result<()> {
    let mut barcodes: Vec<String> = Vec::new();
    if let Some(dir) = readouts {
        let files = read_readerfiles(&dir)
            .with_context(|| format!("Failed to read exports from {}", dir.display()))?;
        for file in files {
            if !barcodes.contains(&file.barcode) {
                barcodes.push(file.barcode);
            }
        }
    }

    let rows = generate_input_table(&barcodes, format);
    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let count = write_template(BufWriter::new(file), &rows, format)?;
    println!("Wrote {} template rows to {}", count, output.display());
    Ok(())
}

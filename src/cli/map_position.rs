use anyhow::{Context, Result};

use platescreen::position::{format_position, map_96_to_384, parse_position};

/// Print the 384-well position of a 96-well position in a quadrant
pub fn run(position: &str, quadrant: u8) -> Result<()> {
    let (row, column) = parse_position(position)?;
    let (row384, col384) = map_96_to_384(row, column, quadrant)
        .with_context(|| format!("Cannot map {} in quadrant {}", position, quadrant))?;
    println!("{}", format_position(row384, col384));
    Ok(())
}

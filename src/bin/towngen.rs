use clap::Parser;
use townsim::game_logic::errors::{TownError, TownResult};
use townsim::map::TownLayout;

#[derive(Parser, Clone)]
#[command(name = "towngen")]
#[command(about = "Generate demo town files for townsim")]
struct Args {
    /// Town name
    #[arg(long, default_value = "Demo Town")]
    name: String,

    /// Building lots (format: COLUMNSxROWS)
    #[arg(long, default_value = "3x2")]
    lots: String,

    /// Output file path relative to the towns/ directory (e.g. "town.bin" or "folder/town.bin")
    #[arg(long, default_value = "town.bin")]
    output: String,
}

fn parse_lots(lots: &str) -> TownResult<(u32, u32)> {
    let invalid = |reason: String| TownError::InvalidTownData { reason };
    let (columns, rows) = lots
        .split_once('x')
        .ok_or_else(|| invalid(format!("Invalid lots format '{lots}'. Expected COLUMNSxROWS")))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid(format!("Invalid lot count: '{value}'")))
    };
    let (columns, rows) = (parse(columns)?, parse(rows)?);

    if columns == 0 || rows == 0 {
        return Err(invalid("Columns and rows must be greater than 0".to_string()));
    }
    if columns * rows > 400 {
        return Err(invalid("A town may have at most 400 lots".to_string()));
    }
    Ok((columns, rows))
}

fn validate_output_path(filename: &str) -> TownResult<()> {
    let path = std::path::Path::new(filename);
    if path.is_absolute() {
        return Err(TownError::InvalidTownData {
            reason: format!("Output path must be relative to towns/, got absolute path: {filename}"),
        });
    }
    if filename.contains("..") {
        return Err(TownError::InvalidTownData {
            reason: "Output path cannot contain '..'".to_string(),
        });
    }
    Ok(())
}

fn main() -> TownResult<()> {
    let args = Args::parse();
    let (columns, rows) = parse_lots(&args.lots)?;
    validate_output_path(&args.output)?;

    let mut town = TownLayout::create_demo(columns, rows)?;
    town.name = args.name;
    town.save_to_file(&args.output)?;

    let full_path = TownLayout::get_towns_dir()?.join(&args.output);
    println!("Town saved to: {}", full_path.display());
    println!(
        "  {} ({}x{} cells, {} buildings)",
        town.name,
        town.terrain.width,
        town.terrain.height,
        town.buildings.len()
    );
    for building in &town.buildings {
        println!(
            "    {} at ({:.1}, {:.1}), {}x{}",
            building.address, building.position.x, building.position.y, building.size.x, building.size.y
        );
    }
    Ok(())
}

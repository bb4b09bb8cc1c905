use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use savegroup::{DataGroup, DecodeMode, SaveSlots, ScalarKind, ScalarValue, printer, storage};

#[derive(Parser)]
#[command(name = "savetool", about = "Inspect and edit save slot files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Show {
        file: String,
        #[arg(long)]
        compact: bool,
    },
    Get {
        file: String,
        path: String,
        name: String,
    },
    Set {
        file: String,
        path: String,
        name: String,
        kind: ScalarKind,
        value: String,
    },
    New {
        data_dir: String,
        slot: u32,
        #[arg(long)]
        template: String,
    },
    Check {
        file: String,
        #[arg(long)]
        lenient: bool,
    },
    Digest { file: String },
    Export { file: String },
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn load(file: &str, mode: DecodeMode) -> Result<DataGroup> {
    let mut group = DataGroup::new();
    group
        .load_from_disk_with(file, mode)
        .with_context(|| format!("Failed to load save file: {}", file))?;
    Ok(group)
}

fn count(group: &DataGroup) -> (usize, usize) {
    group
        .children()
        .fold((1, group.leaves().count()), |(groups, leaves), (_, child)| {
            let (g, l) = count(child);
            (groups + g, leaves + l)
        })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { file, compact } => {
            let node = storage::read_node(&file)
                .with_context(|| format!("Failed to read save file: {}", file))?;
            println!("{}", printer::print(&node, !compact));
        }
        Commands::Get { file, path, name } => {
            let group = load(&file, DecodeMode::Strict)?;
            let target = group
                .path(&segments(&path))
                .ok_or_else(|| anyhow!("Group not found: {}", path))?;
            match target.leaf(&name) {
                Some(value) => println!("{}", value),
                None => println!("Leaf '{}' not found in {}", name, path),
            }
        }
        Commands::Set {
            file,
            path,
            name,
            kind,
            value,
        } => {
            let mut group = load(&file, DecodeMode::Strict)?;
            let parsed = ScalarValue::parse_as(&value, kind)?;
            group
                .path_mut(&segments(&path), true)?
                .set(&name, parsed.clone())?;
            group
                .save_to_disk(&file)
                .with_context(|| format!("Failed to write save file: {}", file))?;
            println!("Set {}/{} = {} {}", path.trim_end_matches('/'), name, kind, parsed);
        }
        Commands::New {
            data_dir,
            slot,
            template,
        } => {
            let mut slots = SaveSlots::new(&data_dir, &template);
            slots.load_global()?;
            if slots.slot_exists(slot) {
                println!("Slot {} already exists: {}", slot, slots.slot_path(slot).display());
                return Ok(());
            }
            slots.new_slot(slot)?;
            println!("Created slot {} at {}", slot, slots.slot_path(slot).display());
        }
        Commands::Check { file, lenient } => {
            let mode = if lenient {
                DecodeMode::Lenient
            } else {
                DecodeMode::Strict
            };
            let group = load(&file, mode)?;
            let (groups, leaves) = count(&group);
            println!("{}: {} groups, {} leaves", file, groups, leaves);
        }
        Commands::Digest { file } => {
            let group = load(&file, DecodeMode::Strict)?;
            let hex: String = group.digest().iter().map(|b| format!("{:02x}", b)).collect();
            println!("{}", hex);
        }
        Commands::Export { file } => {
            let node = storage::read_node(&file)
                .with_context(|| format!("Failed to read save file: {}", file))?;
            println!("{}", serde_json::to_string_pretty(&node)?);
        }
    }

    Ok(())
}

//! Kifu-Rust command line interface.
//!
//! ## Usage
//!
//! - `kifu-rust` - Walk the built-in demo record
//! - `kifu-rust demo` - Same, explicitly
//! - `kifu-rust collections list --dir <d>` - List collections under a directory
//! - `kifu-rust collections new <name> --dir <d>` - Create a collection

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use kifu_rust::board::Color;
use kifu_rust::collection::CollectionList;
use kifu_rust::delta::BoardDelta;
use kifu_rust::record::{GameRecord, Marker, MarkerKind, NodeId};
use kifu_rust::tracker::PositionTracker;

/// Kifu-Rust: a navigator for Go game records
#[derive(Parser)]
#[command(name = "kifu-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a built-in demo record and print each change-set
    Demo,
    /// Manage collections of game records
    Collections {
        #[command(subcommand)]
        action: CollectionsAction,
    },
}

#[derive(Subcommand)]
enum CollectionsAction {
    /// List the collections under a directory
    List {
        /// Library directory holding the collection indexes
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Create a new, empty collection
    New {
        /// Name of the collection
        name: String,
        /// Library directory holding the collection indexes
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Collections { action }) => run_collections(action)?,
        Some(Commands::Demo) | None => run_demo(),
    }
    Ok(())
}

fn run_collections(action: CollectionsAction) -> Result<()> {
    match action {
        CollectionsAction::List { dir } => {
            let list = CollectionList::load(&dir)?;
            if list.collections().is_empty() {
                println!("no collections under {}", dir.display());
            }
            for collection in list.collections() {
                println!("{}: {} games", collection.name(), collection.game_count());
            }
        }
        CollectionsAction::New { name, dir } => {
            let mut list = CollectionList::load(&dir).unwrap_or_else(|_| CollectionList::new(&dir));
            let collection = list.create_collection(&name)?;
            println!(
                "created collection '{}' at {}",
                collection.name(),
                collection.dir().display()
            );
        }
    }
    Ok(())
}

fn run_demo() {
    println!("Kifu-Rust: Go record navigation demo\n");

    let mut tracker = PositionTracker::new(9);
    let (record, deep) = demo_record();
    tracker.load_record(record);

    println!("=== Advancing through the main line ===");
    for _ in 0..4 {
        print_delta(&tracker.advance());
    }

    println!("\n=== Browsing the variations of the last move ===");
    print_delta(&tracker.next_variation());
    print_delta(&tracker.next_variation());

    println!("\n=== Stepping back ===");
    print_delta(&tracker.retreat());

    println!("\n=== Jumping to the end of the first variation ===");
    print_delta(&tracker.jump_to_node(deep));

    println!("\nFinal position (prisoners: {:?}):", tracker.prisoners());
    println!("{}", tracker.board());
}

/// A short 9x9 opening with a marker and a three-way branch. Also returns
/// the leaf of the first variation as a jump target.
fn demo_record() -> (GameRecord, NodeId) {
    let mut record = GameRecord::new(9);
    let root = record.root();
    let a = record.add_move(root, Color::Black, (4, 4));
    let b = record.add_move(a, Color::White, (4, 5));
    let c = record.add_move(b, Color::Black, (3, 5));
    record.add_marker(c, Marker::Shape((3, 5), MarkerKind::Triangle));

    // three candidate continuations for White
    let d = record.add_move(c, Color::White, (5, 5));
    let deep = record.add_move(d, Color::Black, (4, 6));
    record.add_move(c, Color::White, (2, 2));
    record.add_move(c, Color::White, (6, 6));
    (record, deep)
}

fn print_delta(delta: &BoardDelta) {
    if delta.is_empty() {
        println!("(no visual change)");
        return;
    }
    let mut parts = Vec::new();
    if !delta.add.is_empty() {
        parts.push(format!("add {:?}", delta.add));
    }
    if !delta.remove.is_empty() {
        parts.push(format!("remove {:?}", delta.remove));
    }
    if !delta.empty.is_empty() {
        parts.push(format!("clear {:?}", delta.empty));
    }
    if let Some(point) = delta.playmarker {
        parts.push(format!("playmarker {point:?}"));
    }
    if !delta.markers.is_empty() {
        parts.push(format!("markers {:?}", delta.markers));
    }
    println!("{}", parts.join(", "));
}

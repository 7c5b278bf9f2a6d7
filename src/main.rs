//! # pagegrid CLI
//!
//! Usage:
//!   pagegrid export layout.json -o layout.pdf
//!   pagegrid export layout.json --page-size letter
//!   cat layout.json | pagegrid export -
//!   pagegrid example > layout.json
//!   pagegrid templates
//!   pagegrid pages
//!   pagegrid cells layout.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;

use pagegrid::export::{export_document, export_metrics, ExportOptions};
use pagegrid::grid::{canvas_metrics, compute_cells, page_dimensions, Rect};
use pagegrid::model::{element_templates, GridPosition, Layout, PageSize};
use pagegrid::{parse_layout, LayoutEngine, PageGridError};

#[derive(Parser, Debug)]
#[command(version, about = "Grid-cell page layouts exported to single-page PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a saved layout to PDF
    Export {
        /// Layout JSON file, or `-` for stdin
        input: String,

        /// Output path; defaults to the export filename
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JPEG quality in (0, 1]
        #[arg(short, long)]
        quality: Option<f64>,

        /// Write uncompressed streams
        #[arg(long)]
        no_compression: bool,

        /// Replace the page with a preset (a4, a3, a5, letter, legal, tabloid)
        #[arg(long)]
        page_size: Option<String>,
    },
    /// Print a sample layout
    Example,
    /// Print the element template catalog as JSON
    Templates,
    /// List the page size presets
    Pages,
    /// Print every cell rectangle of a layout, in points
    Cells {
        /// Layout JSON file, or `-` for stdin
        input: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CellReport {
    row: u32,
    col: u32,
    canvas: Rect,
    export: Rect,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("pagegrid=info"))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), PageGridError> {
    match command {
        Command::Export {
            input,
            output,
            quality,
            no_compression,
            page_size,
        } => {
            let mut layout = parse_layout(&read_input(&input)?)?;
            if let Some(name) = page_size {
                layout = with_page_size(layout, &name)?;
            }
            let options = ExportOptions {
                filename: output
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned()),
                quality,
                compression: Some(!no_compression),
            };
            let artifact = export_document(&layout, &options, None)?;
            let path = output.unwrap_or_else(|| PathBuf::from(&artifact.filename));
            artifact.write_to(&path)?;
            eprintln!(
                "✓ Written {} bytes to {} ({}, {:.0}x{:.0}pt)",
                artifact.bytes.len(),
                path.display(),
                PageSize::detect(&layout.grid.page).display_name(),
                artifact.page_width,
                artifact.page_height
            );
        }
        Command::Example => print!("{}", example_layout_json()),
        Command::Templates => {
            println!("{}", serde_json::to_string_pretty(&element_templates())?);
        }
        Command::Pages => {
            for size in PageSize::ALL {
                println!("{:<8} {}", size.name(), size.display_name());
            }
        }
        Command::Cells { input } => {
            let layout = parse_layout(&read_input(&input)?)?;
            let page = page_dimensions(&layout.grid.page);
            let canvas = canvas_metrics(&layout.grid, page);
            let exported = export_metrics(&layout, page);
            let report: Vec<CellReport> = compute_cells(&layout.grid)
                .into_iter()
                .map(|cell| {
                    let pos = GridPosition::cell(cell.row, cell.col);
                    CellReport {
                        row: cell.row,
                        col: cell.col,
                        canvas: canvas.span_rect(&pos),
                        export: exported.span_rect(&pos),
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn with_page_size(layout: Layout, name: &str) -> Result<Layout, PageGridError> {
    let size = PageSize::from_name(name)
        .filter(|s| *s != PageSize::Custom)
        .ok_or_else(|| PageGridError::InvalidLayout(format!("unknown page size '{}'", name)))?;
    let mut engine = LayoutEngine::with_layout(layout)?;
    engine.set_page_size(size);
    Ok(engine.snapshot())
}

fn read_input(input: &str) -> Result<String, PageGridError> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn example_layout_json() -> &'static str {
    r##"{
  "grid": {
    "columns": 12,
    "rows": 8,
    "gap": 10,
    "page": { "width": "210mm", "height": "297mm", "orientation": "portrait" }
  },
  "elements": [
    {
      "id": "element-title",
      "type": "text",
      "gridPosition": { "startCol": 1, "endCol": 13, "startRow": 1, "endRow": 2 },
      "content": "<h1>Quarterly Report</h1>",
      "styles": {
        "color": "#1a1a26",
        "fontSize": "28px",
        "fontWeight": "bold",
        "textAlign": "center",
        "backgroundColor": "#f4f4f8",
        "padding": "12px",
        "borderRadius": "6px"
      }
    },
    {
      "id": "element-summary",
      "type": "text",
      "gridPosition": { "startCol": 1, "endCol": 7, "startRow": 2, "endRow": 5 },
      "content": "<p>Revenue grew 12% over the previous quarter.</p><p>Operating costs held flat &amp; margins improved.</p>",
      "styles": {
        "fontSize": "14px",
        "lineHeight": 1.5,
        "border": "1px solid #cccccc",
        "padding": "8px"
      }
    },
    {
      "id": "element-chart",
      "type": "image",
      "gridPosition": { "startCol": 7, "endCol": 13, "startRow": 2, "endRow": 5 },
      "src": "",
      "fit": "contain"
    }
  ]
}
"##
}

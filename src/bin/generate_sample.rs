//! Writes synthetic red/white wine sheets shaped like real exports: a banner
//! row above the header, a blank-header notes column, the odd junk cell, an
//! empty row and one duplicated wine.
//!
//! Output: `winequality-red.csv`, `winequality-white.csv` and
//! `winequality-white.parquet` (the white sheet again, as a string grid).

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const FEATURES: [&str; 5] = ["fixed acidity", "residual sugar", "pH", "alcohol", "quality"];

/// Per-feature (mean, std dev, decimals) for one wine type.
type Profile = [(f64, f64, usize); 5];

const RED: Profile = [
    (8.3, 1.7, 1),
    (2.5, 1.4, 1),
    (3.31, 0.15, 2),
    (10.4, 1.1, 1),
    (5.6, 0.8, 0),
];

const WHITE: Profile = [
    (6.9, 0.8, 1),
    (6.4, 5.0, 1),
    (3.19, 0.15, 2),
    (10.5, 1.2, 1),
    (5.9, 0.9, 0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Build the sheet as a grid of text cells, banner and header rows included.
/// The last column has a blank header and carries free-text notes.
fn sheet(title: &str, profile: &Profile, n: usize, rng: &mut SimpleRng) -> Vec<Vec<String>> {
    let width = FEATURES.len() + 1;
    let mut banner = vec![String::new(); width];
    banner[0] = title.to_string();

    let mut header: Vec<String> = FEATURES.iter().map(|f| f.to_string()).collect();
    header.push(String::new());

    let mut grid = vec![banner, header];
    for i in 0..n {
        let mut row: Vec<String> = profile
            .iter()
            .map(|&(mean, sd, decimals)| format!("{:.*}", decimals, rng.gauss(mean, sd).abs()))
            .collect();
        row.push(if i % 7 == 0 { "checked".to_string() } else { String::new() });
        grid.push(row);
    }

    // Junk cell, an empty line and a repeated wine.
    if n > 3 {
        grid[4][1] = "n/a".to_string();
        grid.push(vec![String::new(); width]);
        let dup = grid[2].clone();
        grid.push(dup);
    }
    grid
}

fn write_csv(path: &str, grid: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in grid {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, grid: &[Vec<String>]) -> Result<()> {
    let width = grid.first().map(Vec::len).unwrap_or(0);
    let fields: Vec<Field> = (0..width)
        .map(|i| Field::new(format!("c{i}"), DataType::Utf8, true))
        .collect();
    let columns: Vec<ArrayRef> = (0..width)
        .map(|i| {
            let cells: StringArray = grid
                .iter()
                .map(|row| row.get(i).filter(|c| !c.is_empty()).map(String::as_str))
                .collect();
            Arc::new(cells) as ArrayRef
        })
        .collect();

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let red = sheet("Red wine quality export", &RED, 40, &mut rng);
    let white = sheet("White wine quality export", &WHITE, 60, &mut rng);

    write_csv("winequality-red.csv", &red)?;
    write_csv("winequality-white.csv", &white)?;
    write_parquet("winequality-white.parquet", &white)?;

    println!(
        "Wrote {} red and {} white grid rows (banner and header included)",
        red.len(),
        white.len()
    );
    Ok(())
}

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const GRAVITY: f64 = 9.81;
const INITIAL_HEIGHT: f64 = 100.0;
const DT: f64 = 0.1;

const COLUMNS: [&str; 4] = ["time", "position", "velocity", "acceleration"];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One row per sample: time, position, velocity, acceleration.
type Row = [Option<f64>; 4];

fn free_fall(rng: &mut SimpleRng) -> Vec<Row> {
    let total_time = (2.0 * INITIAL_HEIGHT / GRAVITY).sqrt();
    let n = (total_time / DT).floor() as usize + 1;

    let mut rows: Vec<Row> = (0..n)
        .map(|i| {
            let t = i as f64 * DT;
            [
                Some(t),
                Some(INITIAL_HEIGHT - 0.5 * GRAVITY * t * t + rng.gauss(0.0, 0.5)),
                Some(-GRAVITY * t + rng.gauss(0.0, 0.8)),
                Some(-GRAVITY + rng.gauss(0.0, 0.2)),
            ]
        })
        .collect();

    // ~10% missing cells in the measured columns
    for row in &mut rows {
        for cell in row.iter_mut().skip(1) {
            if rng.next_f64() < 0.1 {
                *cell = None;
            }
        }
    }

    // ~5% exact duplicates
    for _ in 0..(n * 5 / 100) {
        let pick = rows[rng.below(n)];
        rows.push(pick);
    }

    // ~2% outliers
    let total = rows.len();
    for _ in 0..(n * 2 / 100).max(1) {
        let idx = rng.below(total);
        let factor = 1.5 + 0.5 * rng.next_f64();
        for cell in rows[idx].iter_mut().skip(1) {
            *cell = cell.map(|v| v * factor);
        }
    }

    rows.sort_by(|a, b| a[0].unwrap_or(0.0).total_cmp(&b[0].unwrap_or(0.0)));
    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(row.iter().map(|v| v.map(|v| v.to_string()).unwrap_or_default()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = (0..COLUMNS.len())
        .map(|c| Arc::new(Float64Array::from(rows.iter().map(|r| r[c]).collect::<Vec<_>>())) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "free_fall.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let rows = free_fall(&mut rng);

    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(path, &rows)?;
    } else {
        write_csv(path, &rows)?;
    }

    println!("Wrote {} samples to {output}", rows.len());
    Ok(())
}

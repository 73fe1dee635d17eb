use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

struct DemoRow {
    gene: String,
    log2_fold_change: Option<f64>,
    padj: Option<f64>,
    regulation: String,
}

/// Synthesize a differential expression result set.  Most genes sit near
/// zero fold change with large p-values; a minority get strong fold changes
/// with small adjusted p-values, and a handful of cells are dropped to `NA`
/// to exercise coercion.
fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<DemoRow> {
    (0..n)
        .map(|i| {
            let differential = rng.next_f64() < 0.2;
            let fc = if differential {
                let magnitude = 1.0 + rng.next_f64() * 3.5;
                if rng.next_f64() < 0.5 { magnitude } else { -magnitude }
            } else {
                rng.gauss(0.0, 0.4)
            };

            // Stronger fold changes get smaller adjusted p-values, with noise.
            let exponent = (fc.abs() * 1.8 + rng.gauss(0.0, 0.8)).max(0.0);
            let padj = (10f64.powf(-exponent)).min(1.0);

            let log2_fold_change = (rng.next_f64() >= 0.01).then_some(fc);
            let padj = (rng.next_f64() >= 0.01).then_some(padj);

            DemoRow {
                gene: format!("GENE{:04}", i + 1),
                log2_fold_change,
                padj,
                regulation: if fc >= 0.0 { "Upregulated" } else { "Downregulated" }.to_string(),
            }
        })
        .collect()
}

fn write_csv(rows: &[DemoRow], path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV output");
    writer
        .write_record(["Gene", "log2FoldChange", "padj", "regulation"])
        .expect("Failed to write CSV header");
    for row in rows {
        writer
            .write_record([
                row.gene.clone(),
                row.log2_fold_change.map(|v| format!("{v:.4}")).unwrap_or_else(|| "NA".into()),
                row.padj.map(|v| format!("{v:.6e}")).unwrap_or_else(|| "NA".into()),
                row.regulation.clone(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV output");
}

fn write_parquet(rows: &[DemoRow], path: &str) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Gene", DataType::Utf8, false),
        Field::new("log2FoldChange", DataType::Float64, true),
        Field::new("padj", DataType::Float64, true),
        Field::new("regulation", DataType::Utf8, false),
    ]));

    let gene_array = StringArray::from(rows.iter().map(|r| r.gene.as_str()).collect::<Vec<_>>());
    let fc_array = Float64Array::from(rows.iter().map(|r| r.log2_fold_change).collect::<Vec<_>>());
    let padj_array = Float64Array::from(rows.iter().map(|r| r.padj).collect::<Vec<_>>());
    let regulation_array =
        StringArray::from(rows.iter().map(|r| r.regulation.as_str()).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(gene_array),
            Arc::new(fc_array),
            Arc::new(padj_array),
            Arc::new(regulation_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(400, &mut rng);

    write_csv(&rows, "demo_expression.csv");
    write_parquet(&rows, "demo_expression.parquet");

    println!(
        "Wrote {} genes to demo_expression.csv and demo_expression.parquet",
        rows.len()
    );
}

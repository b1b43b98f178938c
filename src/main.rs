use anyhow::{Context, Result};
use bpaf::Bpaf;
use fisher_pearson::{Moments, Seed};
use log::info;
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Reads a headed CSV of numeric columns from stdin and prints the
/// running skewness estimate of each column after every row.
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
struct Options {
    /// Resume from accumulator state previously written with --save
    #[bpaf(long, argument("FILE"))]
    resume: Option<PathBuf>,
    /// Write the final accumulator state to FILE as JSON
    #[bpaf(long, argument("FILE"))]
    save: Option<PathBuf>,
    /// Only print the final row of estimates
    #[bpaf(long)]
    last: bool,
}

fn main() {
    env_logger::init();
    match run(options().run()) {
        Ok(()) => (),
        Err(e) => {
            // Ignore EPIPE
            if let Some(e) = e.downcast_ref::<std::io::Error>() {
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    return;
                }
            }
            eprintln!("Error: {}", e);
            std::process::exit(1)
        }
    }
}

fn run(opts: Options) -> Result<()> {
    let mut rdr = csv::Reader::from_reader(std::io::stdin());
    let labels = rdr
        .headers()?
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<String>>();
    info!("Tracking {} columns: {}", labels.len(), labels.join(", "));

    let mut accs = match &opts.resume {
        Some(path) => restore(path, &labels)?,
        None => vec![Moments::default(); labels.len()],
    };

    let stdout = std::io::stdout();
    let mut stdout = BufWriter::new(stdout.lock());
    writeln!(stdout, "{}", labels.join(","))?;

    for row in rdr.into_records() {
        let row = row?;
        for (x, acc) in row.into_iter().zip(&mut accs) {
            let x = x
                .parse::<f64>()
                .with_context(|| format!("Not a number: {:?}", x))?;
            acc.update(x);
        }
        if !opts.last {
            write_row(&mut stdout, &accs)?;
        }
    }
    if opts.last {
        write_row(&mut stdout, &accs)?;
    }
    stdout.flush()?;

    if let Some(path) = &opts.save {
        let states = labels
            .into_iter()
            .zip(accs.iter().copied())
            .collect::<BTreeMap<String, Moments>>();
        let file = std::fs::File::create(path)
            .with_context(|| format!("Couldn't create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &states)?;
        info!("Saved accumulator state to {}", path.display());
    }
    Ok(())
}

fn write_row(out: &mut impl Write, accs: &[Moments]) -> Result<()> {
    let mut sep = "";
    for acc in accs {
        write!(out, "{}{}", sep, acc.skewness())?;
        sep = ",";
    }
    out.write_all(b"\n")?;
    Ok(())
}

/// Loads saved per-column state and freezes it into live accumulators.
/// Columns with no saved state start from the empty accumulator.
fn restore(path: &Path, labels: &[String]) -> Result<Vec<Moments>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Couldn't open {}", path.display()))?;
    let states: BTreeMap<String, Moments> = serde_json::from_reader(file)?;
    labels
        .iter()
        .map(|label| {
            let saved = states.get(label).copied().unwrap_or_default();
            // Round-trip through the seed so hand-edited state files still
            // get validated
            let seed = Seed::new()
                .with_count(saved.count())
                .with_mean(saved.mean())?
                .with_moments(&[saved.m2(), saved.m3()])?;
            Ok(Moments::from(seed))
        })
        .collect()
}

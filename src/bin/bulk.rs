use clap::Parser;
use persistent_survey::{logging, read_bulk, Error, FileStorage, ResponseStore};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::warn;

/// Import paper-form answers (gender, smeq_1..5, se_1..10) from a CSV file.
#[derive(Parser)]
struct Args {
    path: PathBuf,
    #[arg(long, env = "SURVEY_DATA_DIR", default_value = "survey-data")]
    data_dir: PathBuf,
}

fn main() -> Result<(), Error> {
    logging::init();
    let args = Args::parse();
    let reader = BufReader::new(File::open(&args.path)?);

    let mut store = ResponseStore::open(FileStorage::new(&args.data_dir));
    if let Some(notice) = store.take_notice() {
        warn!(%notice, "existing responses were unreadable and will be replaced");
    }

    let (mut imported, mut skipped) = (0, 0);
    for row in read_bulk(reader) {
        match row {
            Ok((line, record)) => {
                let (smeq, self_esteem) = (record.smeq_score(), record.self_esteem_score());
                store.append(record)?;
                imported += 1;
                println!(
                    "row = {}, SMEQ_Score = {}, Self_Esteem_Score = {}",
                    line, smeq, self_esteem
                );
            }
            Err(e) => {
                skipped += 1;
                warn!(error = %e, "row skipped");
            }
        }
    }

    println!("{} imported, {} skipped, {} stored", imported, skipped, store.len());
    println!("{}", store.aggregate());
    store.close();
    Ok(())
}

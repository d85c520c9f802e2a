use std::collections::BTreeMap;
use std::fs::File;
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use persistent_survey::{
    clamp_smeq, logging, write_csv, Error, FileStorage, Likert, ResponseRecord,
    ResponseStore, EXPORT_FILE_NAME, QUESTIONNAIRE,
};

#[derive(Parser)]
#[command(about = "Social media engagement & self-esteem questionnaire")]
struct Args {
    /// Directory holding the stored responses.
    #[arg(long, env = "SURVEY_DATA_DIR", default_value = "survey-data", global = true)]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Answer the questionnaire (default).
    Survey,
    /// Show every stored response with its row index.
    List,
    /// Show the dashboard figures.
    Stats,
    /// Delete the response at a row index.
    Delete { index: usize },
    /// Write all responses as CSV.
    Export {
        #[arg(long, default_value = EXPORT_FILE_NAME)]
        out: PathBuf,
    },
}

type Store = ResponseStore<FileStorage>;

fn main() -> Result<(), Error> {
    logging::init();
    let args = Args::parse();

    let mut store = ResponseStore::open(FileStorage::new(&args.data_dir));
    if let Some(notice) = store.take_notice() {
        println!("Stored responses could not be read ({notice}); starting with an empty table.");
    }

    match args.command.unwrap_or(Command::Survey) {
        Command::Survey => survey(&mut store)?,
        Command::List => list(&store),
        Command::Stats => stats(&store),
        Command::Delete { index } => {
            store.delete_at(index)?;
            println!("Deleted entry {index}.");
        }
        Command::Export { out } => {
            write_csv(store.records(), File::create(&out)?)?;
            println!("Wrote {} responses to {}", store.len(), out.display());
        }
    }

    store.close();
    Ok(())
}

fn survey(store: &mut Store) -> Result<(), Error> {
    let mut buffer = String::new();

    println!("What is your gender?");
    for (i, gender) in QUESTIONNAIRE.genders.iter().enumerate() {
        print!("  {} => {}", i + 1, gender);
    }
    let gender = ask(&mut buffer, "Enter 1-3.", |value| {
        choice(value, &QUESTIONNAIRE.genders)
    })?;

    let smeq_section = &QUESTIONNAIRE.smeq;
    println!("\n{}\n{}", smeq_section.title, smeq_section.instruction);
    let mut smeq = BTreeMap::new();
    for question in &smeq_section.questions {
        print!(
            "{}. {} ({}-{}, default {})",
            question.id, question.text, smeq_section.min, smeq_section.max, smeq_section.default
        );
        let value = ask(&mut buffer, "Enter a whole number.", |value| {
            if value.is_empty() {
                return Ok(smeq_section.default);
            }
            value
                .parse::<i64>()
                .map(clamp_smeq)
                .map_err(|_| Error::InvalidScoreInput(format!("{value:?} is not a number")))
        })?;
        smeq.insert(question.id, value);
    }

    let se_section = &QUESTIONNAIRE.self_esteem;
    println!("\n{}\n{}", se_section.title, se_section.instruction);
    let mut self_esteem = BTreeMap::new();
    for question in &se_section.questions {
        println!("{}. {}", question.id, question.text);
        for (i, option) in se_section.options.iter().enumerate() {
            print!("  {} => {}", i + 1, option);
        }
        let answer: Likert = ask(&mut buffer, "Enter 1-4.", |value| {
            choice(value, &se_section.options)
        })?;
        self_esteem.insert(question.id, answer);
    }

    let record = ResponseRecord::from_answers(gender, &smeq, &self_esteem)?;
    store.append(record)?;
    println!("\nResponse recorded and saved.\n");
    stats(store);
    Ok(())
}

/// Prompt until `parse` accepts the trimmed line. EOF aborts the questionnaire.
fn ask<T>(
    buffer: &mut String,
    retry: &str,
    parse: impl Fn(&str) -> Result<T, Error>,
) -> Result<T, Error> {
    loop {
        println!();
        stdout().flush()?;
        buffer.clear();
        if stdin().read_line(buffer)? == 0 {
            return Err(Error::Io(std::io::ErrorKind::UnexpectedEof.into()));
        }
        match parse(buffer.trim()) {
            Ok(value) => return Ok(value),
            Err(_) => print!("{retry}"),
        }
    }
}

fn choice<T: Copy>(value: &str, options: &[T]) -> Result<T, Error> {
    value
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i).copied())
        .ok_or_else(|| Error::InvalidScoreInput(format!("{value:?} is not a listed option")))
}

fn list(store: &Store) {
    if store.is_empty() {
        println!("No data submitted yet.");
        return;
    }
    for (index, record) in store.records().iter().enumerate() {
        let answers = record
            .self_esteem()
            .iter()
            .map(|answer| answer.label())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{index}: {} smeq = {:?}, se = [{answers}], SMEQ_Score = {}, Self_Esteem_Score = {}",
            record.gender(),
            record.smeq(),
            record.smeq_score(),
            record.self_esteem_score()
        );
    }
}

fn stats(store: &Store) {
    if store.is_empty() {
        println!("No data submitted yet. Your first entry will be saved in {}.", store_dir(store));
        return;
    }
    println!("{}", store.aggregate());
}

fn store_dir(store: &Store) -> String {
    store.storage().dir().display().to_string()
}

use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::datetime;

use fraud_catch::{
    FraudCase, NewTransaction, create_fraud_case, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the REST API server of fraud_catch.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let user = create_user("Test User", "test@example.com", &conn)?;

    println!("Creating test transaction...");
    let transaction = create_transaction(
        NewTransaction {
            user_id: user.id,
            amount: 42.5,
            location: "NYC".to_owned(),
            timestamp: datetime!(2024-01-01 00:00:00),
        },
        &conn,
    )?;

    println!("Creating test fraud case...");
    create_fraud_case(FraudCase::build(transaction.id), &conn)?;

    println!("Success!");

    Ok(())
}

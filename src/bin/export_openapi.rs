//! Export the OpenAPI documents to JSON
//!
//! Usage:
//!   cargo run --bin export_openapi -- --service booking > booking.json
//!   cargo run --bin export_openapi -- --service payment --output docs/payment.json

use clap::{Parser, ValueEnum};
use utoipa::OpenApi;

use stayline::api::openapi::{BookingApiDoc, PaymentApiDoc};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Service {
    Booking,
    Payment,
}

#[derive(Debug, Parser)]
struct Args {
    #[arg(short, long, value_enum)]
    service: Service,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let spec = match args.service {
        Service::Booking => BookingApiDoc::openapi(),
        Service::Payment => PaymentApiDoc::openapi(),
    };
    let json = spec.to_pretty_json()?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, &json)?;
            eprintln!("OpenAPI spec exported to: {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

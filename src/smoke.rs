//! Inserts a device and a reading, then fetches both back.

use std::io::{self, Write};

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json::Value;

use crate::config::{Config, ConfigError};
use crate::db::schema::{self, NewDevice, NewReading};
use crate::db::{self, ApiError, Backend};

const DEVICE_NAME: &str = "Test Device (Rust)";
const DEVICE_LOCATION: &str = "Test Lab";
const DEVICE_LAT: f64 = 40.7128;
const DEVICE_LNG: f64 = -74.0060;
const CO_LEVEL: f64 = 55.5;

#[derive(Debug, PartialEq)]
pub enum Outcome {
    MissingConfig,
    DeviceInsertFailed,
    ReadingInsertFailed,
    VerificationFailed,
    Verified(Value),
    Unexpected(String),
}

/// Runs every step once and reports progress to `out`. Only a failing
/// writer makes this return `Err`; every backend failure ends up in the
/// returned `Outcome`.
pub fn run<B, C, W>(
    config: Result<Config, ConfigError>,
    connect: C,
    out: &mut W,
) -> io::Result<Outcome>
where
    B: Backend,
    C: FnOnce(&Config) -> Result<B>,
    W: Write,
{
    writeln!(out, "--- Supabase Backend Test Script ---")?;
    writeln!(out, "Loading environment variables from .env file...")?;

    let config = match config {
        Ok(config) => config,
        Err(error) => {
            log::debug!("{}", error);
            writeln!(
                out,
                "\nERROR: SUPABASE_URL and SUPABASE_SERVICE_KEY must be set."
            )?;
            writeln!(
                out,
                "Please create a .env file in the working directory and add them."
            )?;
            return Ok(Outcome::MissingConfig);
        }
    };

    match insert_and_verify(&config, connect, out) {
        Ok(outcome) => Ok(outcome),
        Err(error) => {
            log::debug!("{:?}", error);
            writeln!(out, "\nAn unexpected error occurred: {:#}", error)?;
            writeln!(
                out,
                "Please check your Supabase URL and network connection."
            )?;
            Ok(Outcome::Unexpected(format!("{:#}", error)))
        }
    }
}

fn insert_and_verify<B, C, W>(config: &Config, connect: C, out: &mut W) -> Result<Outcome>
where
    B: Backend,
    C: FnOnce(&Config) -> Result<B>,
    W: Write,
{
    writeln!(out, "Connecting to Supabase...")?;
    let mut backend = connect(config)?;
    writeln!(out, "Connection successful.")?;

    writeln!(out, "\nAttempting to insert a new device...")?;
    let device = NewDevice::new(DEVICE_NAME, DEVICE_LOCATION, DEVICE_LAT, DEVICE_LNG);
    let inserted = backend.insert(schema::DEVICES, &device)?;
    let device_row = match inserted.data.first() {
        Some(row) => row,
        None => {
            writeln!(out, "\n--- DEVICE INSERT FAILED ---")?;
            writeln!(
                out,
                "Error inserting device: {}",
                describe(inserted.error.as_ref())
            )?;
            writeln!(out, "  -> Double-check your SUPABASE_SERVICE_KEY.")?;
            writeln!(
                out,
                "  -> Ensure you have run the SQL script to create the 'devices' table."
            )?;
            return Ok(Outcome::DeviceInsertFailed);
        }
    };
    let device_id = device_row
        .get("id")
        .filter(|id| !id.is_null())
        .ok_or_else(|| anyhow!("inserted device row has no id: {}", device_row))?;
    writeln!(
        out,
        "  -> Successfully inserted device with ID: {}",
        db::literal(device_id)
    )?;

    writeln!(out, "\nAttempting to insert a reading...")?;
    let reading = NewReading::new(device_id, CO_LEVEL, Utc::now());
    let inserted = backend.insert(schema::READINGS, &reading)?;
    if inserted.data.is_empty() {
        writeln!(out, "\n--- READING INSERT FAILED ---")?;
        writeln!(
            out,
            "Error inserting reading: {}",
            describe(inserted.error.as_ref())
        )?;
        return Ok(Outcome::ReadingInsertFailed);
    }
    writeln!(out, "  -> Successfully inserted reading.")?;

    writeln!(
        out,
        "\nVerifying data by fetching device {}...",
        db::literal(device_id)
    )?;
    let fetched = backend.select_eq(
        schema::DEVICES,
        schema::DEVICE_WITH_READINGS,
        "id",
        device_id,
    )?;
    match fetched.data.into_iter().next() {
        Some(row) => {
            writeln!(out, "\n--- VERIFICATION SUCCESS ---")?;
            writeln!(out, "Fetched data from Supabase:")?;
            writeln!(out, "{}", row)?;
            writeln!(out, "\nTest complete! Your backend is working correctly.")?;
            writeln!(
                out,
                "You can now check your 'devices' and 'readings' tables in the Supabase dashboard."
            )?;
            Ok(Outcome::Verified(row))
        }
        None => {
            writeln!(out, "\n--- VERIFICATION FAILED ---")?;
            writeln!(
                out,
                "Could not fetch the device data back. Check your RLS policies or table schema."
            )?;
            Ok(Outcome::VerificationFailed)
        }
    }
}

fn describe(error: Option<&ApiError>) -> String {
    match error {
        Some(error) => error.to_string(),
        None => "no rows returned".to_string(),
    }
}

use anyhow::Context;
use api_shared::{CreatePatientReq, ListPatientsRes, MessageRes, PatientRes, SortedPatientsRes, UpdatePatientReq};
use clap::{Parser, Subcommand};
use pms_core::{CoreConfig, PatientService, PatientUpdate, DEFAULT_DATA_FILE};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pms")]
#[command(about = "Patient management system CLI")]
struct Cli {
    /// JSON file holding the record set
    #[arg(long, global = true, env = "PATIENT_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient
    Get {
        /// Patient ID
        id: String,
    },
    /// List patients sorted by height, weight or bmi
    Sort {
        /// Field to sort by (height, weight, bmi)
        field: String,
        /// asc (default) or desc
        #[arg(long)]
        order: Option<String>,
    },
    /// Create a patient
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        age: i64,
        /// male, female or others
        #[arg(long)]
        gender: String,
        /// Height in metres
        #[arg(long)]
        height: f64,
        /// Weight in kilograms
        #[arg(long)]
        weight: f64,
    },
    /// Change some fields of a patient
    Update {
        /// Patient ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        age: Option<i64>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Delete a patient
    Delete {
        /// Patient ID
        id: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    if let Err(e) = run(cli, &mut stdout) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let cfg = CoreConfig::new(cli.data_file)?;
    let service = PatientService::from_config(&cfg)
        .with_context(|| format!("opening {}", cfg.data_file().display()))?;

    let result = execute(&service, cli.command, out);
    service.shutdown()?;
    result
}

fn execute(service: &PatientService, command: Commands, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::List => {
            let records = service.list()?;
            print_json(out, &ListPatientsRes::from(&records))
        }
        Commands::Get { id } => {
            let patient = service.get(&id)?;
            print_json(out, &PatientRes::from(&patient))
        }
        Commands::Sort { field, order } => {
            let patients = service.sort(&field, order.as_deref())?;
            print_json(out, &SortedPatientsRes::from(patients.as_slice()))
        }
        Commands::Create {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        } => {
            let req = CreatePatientReq {
                id,
                name,
                city,
                age,
                gender,
                height,
                weight,
            };
            let patient = service.create(req.into())?;
            print_json(out, &PatientRes::from(&patient))
        }
        Commands::Update {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        } => {
            let req = UpdatePatientReq {
                name,
                city,
                age,
                gender,
                height,
                weight,
            };
            let update = match serde_json::to_value(&req)? {
                serde_json::Value::Object(fields) => PatientUpdate::from_json(&fields)?,
                other => anyhow::bail!("unexpected update encoding: {other}"),
            };
            let patient = service.update(&id, &update)?;
            print_json(out, &PatientRes::from(&patient))
        }
        Commands::Delete { id } => {
            service.delete(&id)?;
            print_json(out, &MessageRes::new("Patient deleted successfully"))
        }
    }
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use clinic_crm_fixtures::{
    export_dataset, write_manifest, DatasetAuditor, DatasetGenerator, DefectConfig,
    GeneratorConfig, StrategyKind,
};

#[derive(Parser)]
#[command(name = "clinic-crm-fixtures", version, about = "Synthetic CRM fixtures and CRM extraction")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate import_companies/contacts/deals CSV files
    Generate(GenerateArgs),

    /// Pull contacts, companies and deals from the CRM into SQLite
    #[cfg(feature = "hubspot")]
    Extract(ExtractArgs),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value_t = 20)]
    doctors: usize,

    /// Unique patients
    #[arg(long, default_value_t = 50)]
    patients: usize,

    #[arg(long, default_value_t = 100)]
    deals: usize,

    #[arg(long, value_enum, default_value_t = StrategyKind::Independent)]
    strategy: StrategyKind,

    #[arg(long, default_value_t = 1)]
    duplicate_doctors: usize,

    #[arg(long, default_value_t = 3)]
    duplicate_patients: usize,

    #[arg(long, default_value_t = 5)]
    missing_last_names: usize,

    /// Ignored by the recurrence strategy
    #[arg(long, default_value_t = 10)]
    doctorless_deals: usize,

    #[arg(long)]
    no_specialty_skew: bool,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = ".")]
    out: PathBuf,
}

impl Default for GenerateArgs {
    fn default() -> Self {
        let config = GeneratorConfig::default();
        GenerateArgs {
            doctors: config.doctors,
            patients: config.patients,
            deals: config.deals,
            strategy: config.strategy,
            duplicate_doctors: config.defects.duplicate_doctors,
            duplicate_patients: config.defects.duplicate_patients,
            missing_last_names: config.defects.missing_last_names,
            doctorless_deals: config.defects.doctorless_deals,
            no_specialty_skew: !config.defects.specialty_skew,
            seed: None,
            out: PathBuf::from("."),
        }
    }
}

impl GenerateArgs {
    fn to_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            doctors: self.doctors,
            patients: self.patients,
            deals: self.deals,
            strategy: self.strategy,
            defects: DefectConfig {
                duplicate_doctors: self.duplicate_doctors,
                duplicate_patients: self.duplicate_patients,
                missing_last_names: self.missing_last_names,
                doctorless_deals: self.doctorless_deals,
                specialty_skew: !self.no_specialty_skew,
            },
            seed: self.seed,
            ..GeneratorConfig::default()
        }
    }
}

#[cfg(feature = "hubspot")]
#[derive(Args)]
struct ExtractArgs {
    /// Overrides CRM_DB_PATH
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Generate(args)) => run_generate(&args)?,
        #[cfg(feature = "hubspot")]
        Some(Command::Extract(args)) => run_extract(&args)?,
        None => run_generate(&GenerateArgs::default())?,
    }

    Ok(())
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    println!("🧪 Generating synthetic CRM data...");

    let generator = DatasetGenerator::new(args.to_config());
    let dataset = generator.run()?;

    let summary = export_dataset(&dataset, &args.out)?;
    let manifest = write_manifest(&dataset, &args.out)?;

    println!("\n--- Generated data ---");
    println!("Doctors  (companies): {} rows", dataset.doctors.len());
    println!("Patients (contacts):  {} rows", dataset.patients.len());
    println!("Deals:                {} rows ({} strategy)", dataset.deals.len(), dataset.strategy.name());
    for file in &summary.files {
        println!("✓ {} ({} rows)", file.path.display(), file.rows);
    }
    println!("✓ {}", manifest.display());

    println!("\n--- Injected data-quality issues ---");
    for line in dataset.defects.lines() {
        println!("-> {}", line);
    }

    let audit = DatasetAuditor::new().audit(&dataset)?;
    if audit.matches(&dataset.defects) && !audit.has_critical_issues() {
        println!("\n✅ Audit agrees with the injected defect counts");
    } else {
        println!("\n⚠️  Audit disagrees: {}", audit.summary());
        for issue in &audit.issues {
            println!("   {:?} {}.{}: {} ({})", issue.severity, issue.table, issue.field, issue.issue, issue.count);
        }
    }

    println!("\nNext step: import into the CRM in this order: 1. companies, 2. contacts, 3. deals.");
    Ok(())
}

#[cfg(feature = "hubspot")]
fn run_extract(args: &ExtractArgs) -> Result<()> {
    use clinic_crm_fixtures::crm::HubSpotClient;
    use clinic_crm_fixtures::{extract_all, load_tables, open_database, CrmConfig, ExtractionPlan};

    // Fails before any request when the token is missing
    let config = CrmConfig::from_env()?;
    let db_path = args.db.clone().unwrap_or_else(|| PathBuf::from(&config.db_path));

    println!("📥 Extracting from CRM at {}...", config.base_url);
    let client = HubSpotClient::new(&config)?;
    let tables = extract_all(&client, &ExtractionPlan::defaults());

    for (table, rows) in &tables {
        println!("✓ {}: {} records", table, rows.len());
    }

    println!("\n💾 Writing to {}...", db_path.display());
    let mut conn = open_database(&db_path)?;
    let summary = load_tables(&mut conn, &tables)?;

    for (table, rows) in &summary.written {
        println!("✓ Table '{}': {} rows", table, rows);
    }
    for (table, reason) in &summary.skipped {
        println!("- Skipped '{}' ({})", table, reason);
    }

    println!("\n✅ Export to {} complete", db_path.display());
    Ok(())
}

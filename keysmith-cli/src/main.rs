use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use keysmith_core::{
    generate_by_level, generate_password, generate_pin, generate_pronounceable, resolve_vault_path,
    score_password, CharacterPolicy, RecordUpdate, SharedVault, StrengthReport, VaultSession,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Keysmith - password generator and encrypted credential vault
#[derive(Parser)]
#[command(name = "keysmith", version)]
#[command(about = "Generate strong passwords and keep them in an encrypted vault")]
#[command(long_about = None)]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a password
    Generate(GenerateArgs),

    /// Score the strength of a password (prompts if not given)
    Check { password: Option<String> },

    /// Manage the encrypted vault
    Vault {
        /// Vault file (defaults to $KEYSMITH_VAULT or the platform data dir)
        #[arg(long)]
        path: Option<PathBuf>,

        #[command(subcommand)]
        action: VaultCommand,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Password length
    #[arg(short, long)]
    length: Option<usize>,

    /// Preset: low, medium, high, very-high
    #[arg(long, conflicts_with_all = ["no_lower", "no_upper", "no_digits", "no_symbols"])]
    level: Option<String>,

    #[arg(long)]
    no_lower: bool,

    #[arg(long)]
    no_upper: bool,

    #[arg(long)]
    no_digits: bool,

    #[arg(long)]
    no_symbols: bool,

    /// Leave out I, l, 1, O and 0
    #[arg(long)]
    exclude_ambiguous: bool,

    /// Generate a numeric PIN
    #[arg(long, conflicts_with_all = ["level", "pronounceable"])]
    pin: bool,

    /// Generate a pronounceable password
    #[arg(long, conflicts_with = "level")]
    pronounceable: bool,

    /// Number of passwords to print
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Print a strength report for each password
    #[arg(long)]
    check: bool,
}

#[derive(Subcommand)]
enum VaultCommand {
    /// Create a new vault (overwrites an existing one)
    Init,

    /// List stored credentials
    List {
        /// Show passwords in plain text
        #[arg(long)]
        show_passwords: bool,
    },

    /// Add a credential
    Add {
        #[arg(long)]
        service: String,

        #[arg(long)]
        username: String,

        /// Password (generated with the High preset if omitted)
        #[arg(long)]
        password: Option<String>,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Change fields of a credential
    Update {
        id: u64,

        #[arg(long)]
        service: Option<String>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a credential
    Delete { id: u64 },

    /// Change the master password
    Passwd,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::INFO } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    match cli.command {
        Commands::Generate(args) => generate(args)?,
        Commands::Check { password } => {
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password to check: ")?,
            };
            print_report(&score_password(&password));
        }
        Commands::Vault { path, action } => {
            let path = resolve_vault_path(path);
            info!(path = %path.display(), "Using vault");
            run_vault(SharedVault::new(VaultSession::new(path)), action).await?;
        }
    }

    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    for _ in 0..args.count.max(1) {
        let password = if args.pin {
            generate_pin(args.length.unwrap_or(6))?
        } else if args.pronounceable {
            generate_pronounceable(args.length.unwrap_or(12))?
        } else if let Some(level) = &args.level {
            generate_by_level(level, args.length)?
        } else {
            let policy = CharacterPolicy::new()
                .length(args.length.unwrap_or(16))
                .with_lowercase(!args.no_lower)
                .with_uppercase(!args.no_upper)
                .with_digits(!args.no_digits)
                .with_symbols(!args.no_symbols)
                .exclude_ambiguous(args.exclude_ambiguous);
            generate_password(&policy)?
        };

        println!("{}", password);
        if args.check {
            print_report(&score_password(&password));
        }
    }
    Ok(())
}

fn print_report(report: &StrengthReport) {
    println!(
        "{}{}\x1b[0m ({}/{}, ~{:.0} bits)",
        report.tag.color_code(),
        report.rating,
        report.score,
        keysmith_core::crypto::strength::MAX_SCORE,
        report.entropy_bits
    );
    for line in &report.feedback {
        println!("  {}", line);
    }
}

async fn run_vault(vault: SharedVault, action: VaultCommand) -> Result<()> {
    match action {
        VaultCommand::Init => {
            let path = vault.path().await;
            if path.exists() {
                eprintln!(
                    "Warning: {} already exists and will be overwritten",
                    path.display()
                );
            }
            let master = rpassword::prompt_password("New master password: ")?;
            let confirm = rpassword::prompt_password("Confirm master password: ")?;
            if master != confirm {
                bail!("Passwords do not match");
            }
            vault.create(master).await.context("Failed to create vault")?;
            println!("Vault created at {}", path.display());
        }
        VaultCommand::List { show_passwords } => {
            unlock(&vault).await?;
            let records = vault.list().await?;
            if records.is_empty() {
                println!("No credentials stored");
            }
            for r in records {
                let password = if show_passwords { r.password.as_str() } else { "********" };
                println!(
                    "{:>4}  {:<20} {:<24} {}  (updated {})",
                    r.id,
                    r.service,
                    r.username,
                    password,
                    r.updated_at.format(keysmith_core::vault::record::TIMESTAMP_FORMAT)
                );
            }
        }
        VaultCommand::Add {
            service,
            username,
            password,
            notes,
        } => {
            unlock(&vault).await?;
            let password = match password {
                Some(p) => p,
                None => generate_by_level("High", None)?,
            };
            let id = vault.add(service, username, password, notes).await?;
            println!("Added credential {}", id);
        }
        VaultCommand::Update {
            id,
            service,
            username,
            password,
            notes,
        } => {
            let fields = RecordUpdate {
                service,
                username,
                password,
                notes,
            };
            if fields.is_empty() {
                bail!("Nothing to update");
            }
            unlock(&vault).await?;
            vault.update(id, fields).await?;
            println!("Updated credential {}", id);
        }
        VaultCommand::Delete { id } => {
            unlock(&vault).await?;
            vault.delete(id).await?;
            println!("Deleted credential {}", id);
        }
        VaultCommand::Passwd => {
            unlock(&vault).await?;
            let new = rpassword::prompt_password("New master password: ")?;
            vault
                .change_master_password(new)
                .await
                .context("Failed to change master password")?;
            println!("Master password changed");
        }
    }

    vault.lock().await;
    Ok(())
}

async fn unlock(vault: &SharedVault) -> Result<()> {
    let master = rpassword::prompt_password("Master password: ")?;
    vault.unlock(master).await.context("Failed to unlock vault")
}

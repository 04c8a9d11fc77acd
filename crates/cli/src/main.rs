//! CLI for the hrdesk employee-management API.
//!
//! Flow: build client -> restore session -> run one command -> reload the
//! employee list after any mutation.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hrdesk_client::config::{DEFAULT_BASE_URL, ENV_BASE_URL, ENV_TIMEOUT_SECS};
use hrdesk_client::{ApiClient, ClientConfig, EmployeeApi};
use hrdesk_core::{Employee, EmployeeUpdate, EmploymentStatus, Gender, MaritalStatus, NewEmployee};
use hrdesk_store::{AuthSession, EmployeeCollection, FileTokenStorage, RefreshOutcome};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "hrdesk", version, about = "Manage employee records over the HR API")]
struct Cli {
    #[arg(long, global = true, env = ENV_BASE_URL, default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Where the session token is kept (default: <config dir>/hrdesk/token).
    #[arg(long, global = true, env = "HRDESK_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, env = ENV_TIMEOUT_SECS, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and remember the session token.
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "HRDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the session token.
    Logout,
    /// Show whether a session token is present.
    Whoami,
    /// List all employees.
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show one employee.
    Show {
        id: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Create an employee; every server-required field must be given.
    Create(CreateArgs),
    /// Change some fields of an employee.
    Update {
        id: String,

        #[command(flatten)]
        changes: UpdateArgs,
    },
    /// Delete an employee.
    Delete { id: String },
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    user_id: String,
    #[arg(long)]
    employee_id: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    date_of_birth: NaiveDate,
    /// male, female or other
    #[arg(long)]
    gender: Gender,
    /// single, married, divorced or widowed
    #[arg(long)]
    marital_status: MaritalStatus,
    #[arg(long)]
    phone_number: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    emergency_contact_name: String,
    #[arg(long)]
    emergency_contact_phone: String,
    #[arg(long)]
    department_id: Option<String>,
    #[arg(long)]
    position_id: Option<String>,
    #[arg(long)]
    manager_id: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    hire_date: NaiveDate,
    /// active, inactive or terminated
    #[arg(long, default_value = "active")]
    employment_status: EmploymentStatus,
}

impl From<CreateArgs> for NewEmployee {
    fn from(a: CreateArgs) -> Self {
        NewEmployee {
            user_id: a.user_id,
            employee_id: a.employee_id,
            first_name: a.first_name,
            last_name: a.last_name,
            date_of_birth: a.date_of_birth,
            gender: a.gender,
            marital_status: a.marital_status,
            phone_number: a.phone_number,
            email: a.email,
            address: a.address,
            emergency_contact_name: a.emergency_contact_name,
            emergency_contact_phone: a.emergency_contact_phone,
            department_id: a.department_id,
            position_id: a.position_id,
            manager_id: a.manager_id,
            hire_date: a.hire_date,
            employment_status: a.employment_status,
        }
    }
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    gender: Option<Gender>,
    #[arg(long)]
    marital_status: Option<MaritalStatus>,
    #[arg(long)]
    phone_number: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    emergency_contact_name: Option<String>,
    #[arg(long)]
    emergency_contact_phone: Option<String>,
    #[arg(long)]
    department_id: Option<String>,
    #[arg(long)]
    position_id: Option<String>,
    #[arg(long)]
    manager_id: Option<String>,
    #[arg(long)]
    hire_date: Option<NaiveDate>,
    #[arg(long)]
    employment_status: Option<EmploymentStatus>,
}

impl From<UpdateArgs> for EmployeeUpdate {
    fn from(a: UpdateArgs) -> Self {
        EmployeeUpdate {
            first_name: a.first_name,
            last_name: a.last_name,
            date_of_birth: a.date_of_birth,
            gender: a.gender,
            marital_status: a.marital_status,
            phone_number: a.phone_number,
            email: a.email,
            address: a.address,
            emergency_contact_name: a.emergency_contact_name,
            emergency_contact_phone: a.emergency_contact_phone,
            department_id: a.department_id,
            position_id: a.position_id,
            manager_id: a.manager_id,
            hire_date: a.hire_date,
            employment_status: a.employment_status,
        }
    }
}

/// Everything a command needs, built once per invocation.
struct App {
    session: AuthSession,
    employees: EmployeeApi,
    collection: EmployeeCollection,
}

impl App {
    fn build(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let config = ClientConfig::new(&cli.api_url)?.with_timeout(Duration::from_secs(cli.timeout));
        let client = ApiClient::new(config)?;

        let token_path = match &cli.token_file {
            Some(p) => p.clone(),
            None => default_token_path()?,
        };
        tracing::debug!(path = %token_path.display(), "token storage");

        let session = AuthSession::new(client, Arc::new(FileTokenStorage::new(token_path)));
        let employees = EmployeeApi::new(session.client());
        let collection = EmployeeCollection::new(employees.clone());

        Ok(Self {
            session,
            employees,
            collection,
        })
    }

    /// Reloads the list; a failed reload is an error for the command.
    async fn reload(&self) -> Result<Vec<Employee>, Box<dyn std::error::Error>> {
        let state = self.collection.state();
        let watch = state.subscribe(|s| {
            tracing::debug!(loading = s.loading, items = s.items.len(), error = ?s.error, "employee state");
        });
        let outcome = self.collection.refresh().await;
        watch.unsubscribe();

        let snapshot = state.get();
        match outcome {
            RefreshOutcome::Applied => Ok(snapshot.items),
            _ => Err(snapshot.error.unwrap_or_else(|| "employee list refresh failed".into()).into()),
        }
    }
}

fn default_token_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base = dirs::config_dir().ok_or("no config directory on this platform; pass --token-file")?;
    Ok(base.join("hrdesk").join("token"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::build(&cli)?;

    match cli.command {
        Commands::Login { email, password } => {
            app.session.login(&email, &password).await?;
            println!("Logged in as {email}");
        }
        Commands::Logout => {
            app.session.logout();
            println!("Logged out");
        }
        Commands::Whoami => {
            let session = app.session.state().get();
            match (&session.token, &session.user) {
                (None, _) => println!("Not logged in"),
                (Some(_), Some(user)) => println!(
                    "Logged in as {}",
                    user.email.as_deref().or(user.username.as_deref()).unwrap_or("unknown user")
                ),
                (Some(_), None) => println!("Logged in (session token present)"),
            }
        }
        Commands::List { json } => {
            let items = app.reload().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print!("{}", render_table(&items));
            }
        }
        Commands::Show { id, json } => {
            let employee = app.employees.get(&id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&employee)?);
            } else {
                print!("{}", render_detail(&employee));
            }
        }
        Commands::Create(args) => {
            let created = app.employees.create(&NewEmployee::from(args)).await?;
            println!("Created employee {}", created.id);
            let items = app.reload().await?;
            println!("{} employees on record", items.len());
        }
        Commands::Update { id, changes } => {
            let updated = app.employees.update(&id, &EmployeeUpdate::from(changes)).await?;
            println!("Updated employee {}", updated.id);
            let items = app.reload().await?;
            println!("{} employees on record", items.len());
        }
        Commands::Delete { id } => {
            app.employees.delete(&id).await?;
            println!("Deleted employee {id}");
            let items = app.reload().await?;
            println!("{} employees on record", items.len());
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn short(id: Option<&str>) -> String {
    match id {
        Some(id) if id.chars().count() > 8 => format!("{}...", id.chars().take(8).collect::<String>()),
        Some(id) => id.to_string(),
        None => "-".into(),
    }
}

fn render_table(items: &[Employee]) -> String {
    use std::fmt::Write;

    if items.is_empty() {
        return "No employees found.\n".into();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<16} {:<16} {:<32} {:<12}",
        "ID", "FIRST NAME", "LAST NAME", "EMAIL", "POSITION"
    );
    for e in items {
        let _ = writeln!(
            out,
            "{:<12} {:<16} {:<16} {:<32} {:<12}",
            short(Some(e.id.as_str())),
            e.first_name.as_deref().unwrap_or("-"),
            e.last_name.as_deref().unwrap_or("-"),
            e.email.as_deref().unwrap_or("-"),
            short(e.position_id.as_deref()),
        );
    }
    out
}

fn render_detail(e: &Employee) -> String {
    use std::fmt::Write;

    let date = |d: Option<chrono::DateTime<chrono::Utc>>| {
        d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".into())
    };
    let text = |s: &Option<String>| s.clone().unwrap_or_else(|| "-".into());

    let mut out = String::new();
    let rows = [
        ("ID", e.id.clone()),
        ("Employee no.", text(&e.employee_id)),
        ("Name", e.full_name()),
        ("Email", text(&e.email)),
        ("Phone", text(&e.phone_number)),
        ("Address", text(&e.address)),
        ("Date of birth", date(e.date_of_birth)),
        ("Gender", text(&e.gender)),
        ("Marital status", text(&e.marital_status)),
        ("Department", text(&e.department_id)),
        ("Position", text(&e.position_id)),
        ("Manager", text(&e.manager_id)),
        ("Hire date", date(e.hire_date)),
        ("Status", text(&e.employment_status)),
        ("Emergency contact", format!("{} ({})", text(&e.emergency_contact_name), text(&e.emergency_contact_phone))),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<18} {value}");
    }
    for (key, value) in &e.extra {
        let _ = writeln!(out, "{key:<18} {value}");
    }
    out
}

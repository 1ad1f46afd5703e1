use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use vitals_core::metrics::WeightRange;
use vitals_core::*;

/// Environment variable consulted when --password is not given
const PASSWORD_ENV: &str = "VITALS_PASSWORD";

/// Exit status for rejected credentials or registrations
const EXIT_AUTH_FAILED: u8 = 3;

#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Personal daily health tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use an alternative config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct Credentials {
    /// Username
    #[arg(long, short)]
    user: String,

    /// Password (falls back to $VITALS_PASSWORD, then a prompt)
    #[arg(long)]
    password: Option<String>,
}

#[derive(Args)]
struct OptionalCredentials {
    /// Username, to read defaults from or save to a profile
    #[arg(long, short)]
    user: Option<String>,

    /// Password (falls back to $VITALS_PASSWORD, then a prompt)
    #[arg(long, requires = "user")]
    password: Option<String>,
}

#[derive(Args)]
struct ProfileFields {
    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    age: Option<u32>,

    /// Height in cm
    #[arg(long)]
    height: Option<f64>,

    /// Weight in kg
    #[arg(long)]
    weight: Option<f64>,

    /// male or female
    #[arg(long)]
    gender: Option<Gender>,
}

impl From<ProfileFields> for ProfileUpdate {
    fn from(fields: ProfileFields) -> Self {
        Self {
            email: fields.email,
            name: fields.name,
            age: fields.age,
            height: fields.height,
            weight: fields.weight,
            gender: fields.gender,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[command(flatten)]
        creds: Credentials,

        #[command(flatten)]
        profile: ProfileFields,
    },

    /// Check credentials and record the login
    Login {
        #[command(flatten)]
        creds: Credentials,
    },

    /// Record a day's sleep, water, mood, meals and reflection
    Log {
        #[command(flatten)]
        creds: Credentials,

        /// Hours slept (0-24)
        #[arg(long)]
        sleep: f64,

        /// Cups of water (0-50)
        #[arg(long)]
        water: f64,

        /// Mood from 1 (bad) to 5 (great)
        #[arg(long)]
        mood: u8,

        #[arg(long, default_value = "")]
        meals: String,

        #[arg(long, default_value = "")]
        reflection: String,

        /// Day to record, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show one day's record
    Show {
        #[command(flatten)]
        creds: Credentials,

        /// Day to show, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List records, newest first
    History {
        #[command(flatten)]
        creds: Credentials,

        /// Show at most this many days
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Averages, health score and recommendations for recent days
    Report {
        #[command(flatten)]
        creds: Credentials,
    },

    /// Calculate BMI
    Bmi {
        #[command(flatten)]
        creds: OptionalCredentials,

        /// Height in cm
        #[arg(long)]
        height: f64,

        /// Weight in kg
        #[arg(long)]
        weight: f64,

        /// Save the result to the BMI history
        #[arg(long, requires = "user")]
        save: bool,

        /// Store height and weight in the profile
        #[arg(long, requires = "user")]
        update_profile: bool,
    },

    /// List saved BMI snapshots
    BmiHistory {
        #[command(flatten)]
        creds: Credentials,
    },

    /// Calculate daily calorie needs
    Calories {
        #[command(flatten)]
        creds: OptionalCredentials,

        #[arg(long)]
        age: Option<u32>,

        /// male or female
        #[arg(long)]
        gender: Option<Gender>,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// sedentary, light, moderate, active or very_active
        #[arg(long, default_value = "moderate")]
        activity: ActivityLevel,

        /// lose, maintain or gain
        #[arg(long, default_value = "maintain")]
        goal: Goal,
    },

    /// Show the profile, updating any given fields first
    Profile {
        #[command(flatten)]
        creds: Credentials,

        #[command(flatten)]
        fields: ProfileFields,
    },

    /// Change the password
    Passwd {
        #[command(flatten)]
        creds: Credentials,

        /// The new password
        #[arg(long)]
        new: String,
    },

    /// Export all records to CSV
    Export {
        #[command(flatten)]
        creds: Credentials,

        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    vitals_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_auth() => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_AUTH_FAILED)
        }
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }
    tracing::debug!("Using data directory {:?}", config.data.data_dir);

    let mut store = HealthStore::open(config)?;

    match cli.command {
        Commands::Register { creds, profile } => cmd_register(&mut store, creds, profile),
        Commands::Login { creds } => {
            let user = login(&mut store, &creds)?;
            println!("Welcome back, {}!", user.username());
            Ok(())
        }
        Commands::Log {
            creds,
            sleep,
            water,
            mood,
            meals,
            reflection,
            date,
        } => {
            let user = login(&mut store, &creds)?;
            let entry = DailyEntry {
                sleep,
                water,
                mood,
                meals,
                reflection,
            };
            cmd_log(&mut store, &user, date.unwrap_or_else(today), entry)
        }
        Commands::Show { creds, date } => {
            let user = login(&mut store, &creds)?;
            cmd_show(&store, &user, date.unwrap_or_else(today))
        }
        Commands::History { creds, limit } => {
            let user = login(&mut store, &creds)?;
            cmd_history(&store, &user, limit)
        }
        Commands::Report { creds } => {
            let user = login(&mut store, &creds)?;
            cmd_report(&store, &user)
        }
        Commands::Bmi {
            creds,
            height,
            weight,
            save,
            update_profile,
        } => cmd_bmi(&mut store, creds, height, weight, save, update_profile),
        Commands::BmiHistory { creds } => {
            let user = login(&mut store, &creds)?;
            cmd_bmi_history(&store, &user)
        }
        Commands::Calories {
            creds,
            age,
            gender,
            height,
            weight,
            activity,
            goal,
        } => {
            let profile = match creds.user {
                Some(ref username) => {
                    let user = login_as(&mut store, username, creds.password.clone())?;
                    Some(store.account(&user)?.profile.clone())
                }
                None => None,
            };
            let missing = |field: &str| {
                Error::validation(format!(
                    "Missing {}: pass --{} or set it in your profile",
                    field, field
                ))
            };
            let input = CalorieInput {
                age: age
                    .or_else(|| profile.as_ref().and_then(|p| p.age))
                    .ok_or_else(|| missing("age"))?,
                gender: gender
                    .or_else(|| profile.as_ref().map(|p| p.gender))
                    .ok_or_else(|| missing("gender"))?,
                height_cm: height
                    .or_else(|| profile.as_ref().and_then(|p| p.height))
                    .ok_or_else(|| missing("height"))?,
                weight_kg: weight
                    .or_else(|| profile.as_ref().and_then(|p| p.weight))
                    .ok_or_else(|| missing("weight"))?,
                activity,
                goal,
            };
            cmd_calories(&store, &input)
        }
        Commands::Profile { creds, fields } => {
            let user = login(&mut store, &creds)?;
            cmd_profile(&mut store, &user, fields.into())
        }
        Commands::Passwd { creds, new } => {
            let current = resolve_password(creds.password.clone())?;
            let user = store.login(&creds.user, &current)?;
            store.change_password(&user, &current, &new)?;
            println!("✓ Password changed");
            Ok(())
        }
        Commands::Export { creds, out } => {
            let user = login(&mut store, &creds)?;
            let count = export_records_csv(store.records(&user)?, &out)?;
            println!("✓ Exported {} record(s) to {}", count, out.display());
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn login(store: &mut HealthStore, creds: &Credentials) -> Result<AuthenticatedUser> {
    login_as(store, &creds.user, creds.password.clone())
}

fn login_as(
    store: &mut HealthStore,
    username: &str,
    password: Option<String>,
) -> Result<AuthenticatedUser> {
    let password = resolve_password(password)?;
    store.login(username, &password)
}

fn resolve_password(flag: Option<String>) -> Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }

    print!("Password: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn cmd_register(store: &mut HealthStore, creds: Credentials, profile: ProfileFields) -> Result<()> {
    let password = resolve_password(creds.password)?;
    let details = RegistrationDetails {
        email: profile.email,
        name: profile.name,
        age: profile.age,
        height: profile.height,
        weight: profile.weight,
        gender: profile.gender,
    };
    store.register(&creds.user, &password, details)?;
    println!("✓ Registration successful! You can now log in as {}.", creds.user.trim());
    Ok(())
}

fn cmd_log(
    store: &mut HealthStore,
    user: &AuthenticatedUser,
    date: NaiveDate,
    entry: DailyEntry,
) -> Result<()> {
    let replaced = store.record(user, date)?.is_some();
    let record = store.log_day(user, date, entry)?;

    println!(
        "✓ Health data {} for {}",
        if replaced { "updated" } else { "saved" },
        date
    );
    display_record(date, &record);
    Ok(())
}

fn cmd_show(store: &HealthStore, user: &AuthenticatedUser, date: NaiveDate) -> Result<()> {
    match store.record(user, date)? {
        Some(record) => display_record(date, record),
        None => println!("No record for {}", date),
    }
    Ok(())
}

fn cmd_history(store: &HealthStore, user: &AuthenticatedUser, limit: Option<usize>) -> Result<()> {
    let records = store.records(user)?;
    if records.is_empty() {
        println!("No health records yet. Log a day with `vitals log`.");
        return Ok(());
    }

    let window = store.config().reports.window_days;
    let recent = records.recent(window);
    let averages = WindowAverages::from_records(recent.iter().map(|(_, r)| *r));

    println!("Total days logged: {}", records.len());
    println!(
        "{}-day average: sleep {:.1} h • water {:.1} cups • mood {:.1}/5",
        window, averages.sleep, averages.water, averages.mood
    );
    println!();

    for (date, record) in records.recent(limit.unwrap_or(records.len())) {
        println!(
            "{} {:<9}  sleep {:>4.1} h  water {:>4.1} cups  mood {} {}",
            date,
            date.format("%A"),
            record.sleep,
            record.water,
            mood_face(record.mood),
            record.mood
        );
        if !record.meals.is_empty() {
            println!("    Meals: {}", record.meals);
        }
        if !record.reflection.is_empty() {
            println!("    Reflection: {}", record.reflection);
        }
    }
    Ok(())
}

fn cmd_report(store: &HealthStore, user: &AuthenticatedUser) -> Result<()> {
    let report = store.report(user)?;
    if report.total_days == 0 {
        println!("No health records yet. Log a day with `vitals log`.");
        return Ok(());
    }

    println!("Overall statistics");
    println!("  Days logged: {}", report.total_days);
    let avg = &report.averages;
    println!("  Average sleep (last {} days): {:.1} hours", avg.days, avg.sleep);
    println!("  Average water (last {} days): {:.1} cups", avg.days, avg.water);
    println!("  Average mood (last {} days): {:.1}/5", avg.days, avg.mood);
    println!();
    println!("Health score: {:.0}/100 ({})", report.score, report.rating);
    println!("  {}", report.rating.feedback());

    for rec in &report.recommendations {
        println!();
        println!("{} recommendations", rec.metric);
        println!("  {}", rec.summary);
        for tip in rec.tips {
            println!("  • {}", tip);
        }
    }
    Ok(())
}

fn cmd_bmi(
    store: &mut HealthStore,
    creds: OptionalCredentials,
    height: f64,
    weight: f64,
    save: bool,
    update_profile: bool,
) -> Result<()> {
    let result = compute_bmi(height, weight, &store.config().limits)?;
    let range = healthy_weight_range(height);
    display_bmi(height, weight, &result, &range);

    if let Some(ref username) = creds.user {
        if save || update_profile {
            let user = login_as(store, username, creds.password.clone())?;
            if save {
                let snapshot = store.save_bmi(&user, height, weight)?;
                println!("\n✓ BMI {:.1} saved to history", snapshot.bmi);
            }
            if update_profile {
                store.sync_profile_body(&user, height, weight)?;
                println!("✓ Profile updated with new height and weight");
            }
        }
    }
    Ok(())
}

fn cmd_bmi_history(store: &HealthStore, user: &AuthenticatedUser) -> Result<()> {
    let history = store.bmi_history(user)?;
    if history.is_empty() {
        println!("No BMI records saved yet.");
        return Ok(());
    }
    for snapshot in history.iter().rev() {
        println!(
            "{}  BMI {:>4.1} ({})  {:.1} cm  {:.1} kg",
            snapshot.taken_at.format(TIMESTAMP_FORMAT),
            snapshot.bmi,
            BmiCategory::from_bmi(snapshot.bmi),
            snapshot.height,
            snapshot.weight
        );
    }
    Ok(())
}

fn cmd_calories(store: &HealthStore, input: &CalorieInput) -> Result<()> {
    let target = compute_calorie_target(input, &store.config().limits)?;

    println!("Calorie calculation");
    println!(
        "  Age: {} • Gender: {} • Height: {:.1} cm • Weight: {:.1} kg",
        input.age, input.gender, input.height_cm, input.weight_kg
    );
    println!("  Activity level: {} • Goal: {}", input.activity, input.goal);
    println!();
    println!("  BMR:  {:.0} calories/day", target.bmr);
    println!("  TDEE: {:.0} calories/day", target.tdee);
    println!("  Target calories: {:.0} calories/day", target.target);
    println!();
    println!("Tips for your goal:");
    for tip in input.goal.tips() {
        println!("  • {}", tip);
    }
    Ok(())
}

fn cmd_profile(store: &mut HealthStore, user: &AuthenticatedUser, update: ProfileUpdate) -> Result<()> {
    if !update.is_empty() {
        store.update_profile(user, update)?;
        println!("✓ Profile updated successfully!\n");
    }

    let account = store.account(user)?;
    let profile = &account.profile;
    let or_unset = |v: Option<String>| v.unwrap_or_else(|| "Not set".to_string());

    println!("Username: {}", account.username);
    println!("Name: {}", or_unset(profile.name.clone().filter(|n| !n.is_empty())));
    println!(
        "Email: {}",
        or_unset(Some(account.email.clone()).filter(|e| !e.is_empty()))
    );
    println!("Age: {}", or_unset(profile.age.map(|a| a.to_string())));
    println!("Height: {}", or_unset(profile.height.map(|h| format!("{} cm", h))));
    println!("Weight: {}", or_unset(profile.weight.map(|w| format!("{} kg", w))));
    println!("Gender: {}", profile.gender);
    println!("Member since: {}", profile.created_at.format(TIMESTAMP_FORMAT));
    println!(
        "Last login: {}",
        or_unset(profile.last_login.map(|t| t.format(TIMESTAMP_FORMAT).to_string()))
    );
    Ok(())
}

fn display_record(date: NaiveDate, record: &DailyRecord) {
    println!();
    println!("  {} ({})", date, date.format("%A"));
    println!("  • Sleep: {} hours", record.sleep);
    println!("  • Water: {} cups", record.water);
    println!("  • Mood: {} ({}/5)", mood_face(record.mood), record.mood);
    if !record.meals.is_empty() {
        println!("  • Meals: {}", record.meals);
    }
    if !record.reflection.is_empty() {
        println!("  • Reflection: {}", record.reflection);
    }
    println!("  Saved at {}", record.timestamp.format(TIMESTAMP_FORMAT));
}

fn display_bmi(height: f64, weight: f64, result: &BmiResult, range: &WeightRange) {
    println!("BMI: {:.1}", result.bmi);
    println!("Category: {}", result.category);
    println!("  Height: {} cm • Weight: {} kg", height, weight);
    println!("  Status: {}", result.category.message());
    println!();
    println!("Ideal weight range: {:.1} - {:.1} kg", range.min_kg, range.max_kg);
    match range.position(weight) {
        RangePosition::Under(kg) => println!("  You are underweight by {:.1} kg", kg),
        RangePosition::Over(kg) => println!("  You are overweight by {:.1} kg", kg),
        RangePosition::Within => println!("  You are within the healthy range!"),
    }
    println!();
    println!("Health advice:");
    for tip in result.category.advice() {
        println!("  • {}", tip);
    }
}

fn mood_face(mood: u8) -> &'static str {
    match mood {
        1 => "😢",
        2 => "😕",
        3 => "😐",
        4 => "😊",
        5 => "😄",
        _ => "😐",
    }
}

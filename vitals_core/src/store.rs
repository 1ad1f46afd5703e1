//! The health store: accounts, daily logs and BMI snapshots on disk.
//!
//! A `HealthStore` is opened once at startup and passed to whatever needs
//! it. It keeps the whole user database in memory and writes it back after
//! each mutation. Mutations are applied to a copy first; the in-memory state
//! only changes once the copy has been persisted.

use crate::config::Config;
use crate::history::BmiHistory;
use crate::metrics::compute_bmi;
use crate::password::{hash_password, verify_password, PasswordCheck};
use crate::records::RecordStore;
use crate::report::HealthReport;
use crate::state::UserDatabase;
use crate::types::now_local;
use crate::{
    BmiSnapshot, DailyEntry, DailyRecord, Error, Gender, Profile, Result, UserAccount,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Proof that a user logged in; required by user-scoped operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    username: String,
}

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Optional profile fields collected at registration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<Gender>,
}

/// Profile fields to change; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<Gender>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<RegistrationDetails> for ProfileUpdate {
    fn from(details: RegistrationDetails) -> Self {
        Self {
            email: details.email,
            name: details.name,
            age: details.age,
            height: details.height,
            weight: details.weight,
            gender: details.gender,
        }
    }
}

/// A user database opened from disk, plus the configuration it is validated against
///
/// All per-user operations take an [`AuthenticatedUser`] obtained from
/// [`HealthStore::login`]. Mutations are applied to a copy of the database and
/// only become visible once that copy has been saved.
pub struct HealthStore {
    path: PathBuf,
    db: UserDatabase,
    config: Config,
    clock: fn() -> NaiveDateTime,
}

impl HealthStore {
    /// Open the user database in the configured data directory
    pub fn open(config: Config) -> Result<Self> {
        let path = config.data.users_path();
        Self::open_at(path, config)
    }

    /// Open the user database at an explicit path
    pub fn open_at(path: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let path = path.into();
        let db = UserDatabase::load(&path)?;
        tracing::debug!("Opened health store at {:?}", path);
        Ok(Self {
            path,
            db,
            config,
            clock: now_local,
        })
    }

    /// Replace the clock used to stamp records and logins
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &UserDatabase {
        &self.db
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Create a new account
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        details: RegistrationDetails,
    ) -> Result<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::validation("Username must not be empty"));
        }
        if self.db.contains(username) {
            return Err(Error::DuplicateUser(username.to_string()));
        }
        self.check_password_strength(password)?;

        let mut account = UserAccount::new(username, hash_password(password)?, (self.clock)());
        apply_profile_update(&mut account, details.into(), &self.config)?;

        let mut next = self.db.clone();
        next.insert(account);
        next.save(&self.path)?;
        self.db = next;

        tracing::info!("Registered user {}", username);
        Ok(())
    }

    /// Check credentials and record the login time
    pub fn login(&mut self, username: &str, password: &str) -> Result<AuthenticatedUser> {
        let username = username.trim();
        let account = self
            .db
            .get(username)
            .ok_or_else(|| Error::UserNotFound(username.to_string()))?;

        let check = verify_password(password, &account.password_hash)?;
        if !check.is_match() {
            tracing::warn!("Rejected login for {}", username);
            return Err(Error::InvalidCredential);
        }

        let upgraded = match check {
            PasswordCheck::LegacyMatch => Some(hash_password(password)?),
            _ => None,
        };

        let now = (self.clock)();
        self.commit(username, |account| {
            account.profile.last_login = Some(now);
            if let Some(hash) = upgraded {
                tracing::info!("Upgraded password hash for {}", account.username);
                account.password_hash = hash;
            }
            Ok(())
        })?;

        tracing::info!("User {} logged in", username);
        Ok(AuthenticatedUser {
            username: username.to_string(),
        })
    }

    /// Replace the password after re-checking the current one
    pub fn change_password(
        &mut self,
        user: &AuthenticatedUser,
        current: &str,
        new_password: &str,
    ) -> Result<()> {
        let account = self.account(user)?;
        if !verify_password(current, &account.password_hash)?.is_match() {
            return Err(Error::InvalidCredential);
        }
        self.check_password_strength(new_password)?;

        let hash = hash_password(new_password)?;
        self.commit(user.username(), |account| {
            account.password_hash = hash;
            Ok(())
        })?;

        tracing::info!("Changed password for {}", user.username());
        Ok(())
    }

    fn check_password_strength(&self, password: &str) -> Result<()> {
        let min_len = self.config.auth.min_password_len;
        if password.chars().count() < min_len {
            return Err(Error::WeakPassword { min_len });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    pub fn account(&self, user: &AuthenticatedUser) -> Result<&UserAccount> {
        self.db
            .get(user.username())
            .ok_or_else(|| Error::UserNotFound(user.username().to_string()))
    }

    /// Validate and apply a partial profile update
    pub fn update_profile(&mut self, user: &AuthenticatedUser, update: ProfileUpdate) -> Result<Profile> {
        let config = self.config.clone();
        let profile = self.commit(user.username(), |account| {
            apply_profile_update(account, update, &config)?;
            Ok(account.profile.clone())
        })?;
        tracing::info!("Updated profile for {}", user.username());
        Ok(profile)
    }

    /// Copy a height and weight from the BMI calculator into the profile
    pub fn sync_profile_body(
        &mut self,
        user: &AuthenticatedUser,
        height_cm: f64,
        weight_kg: f64,
    ) -> Result<Profile> {
        self.update_profile(
            user,
            ProfileUpdate {
                height: Some(height_cm),
                weight: Some(weight_kg),
                ..ProfileUpdate::default()
            },
        )
    }

    // ------------------------------------------------------------------
    // Daily records
    // ------------------------------------------------------------------

    /// Validate `entry` and store it as the record for `date`
    ///
    /// Any existing record for that date is replaced.
    pub fn log_day(
        &mut self,
        user: &AuthenticatedUser,
        date: NaiveDate,
        entry: DailyEntry,
    ) -> Result<DailyRecord> {
        let record = DailyRecord::from_entry(entry, &self.config.limits, (self.clock)())?;
        let stored = record.clone();
        self.commit(user.username(), |account| {
            account.health_data.upsert(date, record);
            Ok(())
        })?;
        tracing::info!("Logged {} for {}", date, user.username());
        Ok(stored)
    }

    pub fn record(&self, user: &AuthenticatedUser, date: NaiveDate) -> Result<Option<&DailyRecord>> {
        Ok(self.records(user)?.get(date))
    }

    /// The `n` most recent records, newest first
    pub fn recent(
        &self,
        user: &AuthenticatedUser,
        n: usize,
    ) -> Result<Vec<(NaiveDate, &DailyRecord)>> {
        Ok(self.records(user)?.recent(n))
    }

    pub fn records(&self, user: &AuthenticatedUser) -> Result<&RecordStore> {
        Ok(&self.account(user)?.health_data)
    }

    /// Report over the configured window of recent records
    pub fn report(&self, user: &AuthenticatedUser) -> Result<HealthReport> {
        Ok(HealthReport::build(
            self.records(user)?,
            self.config.reports.window_days,
        ))
    }

    // ------------------------------------------------------------------
    // BMI snapshots
    // ------------------------------------------------------------------

    /// Compute BMI and append it to the user's bounded snapshot history
    pub fn save_bmi(
        &mut self,
        user: &AuthenticatedUser,
        height_cm: f64,
        weight_kg: f64,
    ) -> Result<BmiSnapshot> {
        let result = compute_bmi(height_cm, weight_kg, &self.config.limits)?;
        let snapshot = BmiSnapshot {
            bmi: (result.bmi * 10.0).round() / 10.0,
            height: height_cm,
            weight: weight_kg,
            taken_at: (self.clock)(),
        };

        let cap = self.config.reports.bmi_history_cap;
        let saved = snapshot.clone();
        self.commit(user.username(), |account| {
            account.bmi_history.push(snapshot, cap);
            Ok(())
        })?;

        tracing::info!("Saved BMI {:.1} for {}", saved.bmi, user.username());
        Ok(saved)
    }

    pub fn bmi_history(&self, user: &AuthenticatedUser) -> Result<&BmiHistory> {
        Ok(&self.account(user)?.bmi_history)
    }

    /// Apply `f` to a copy of the account, persist, then adopt the copy
    fn commit<T, F>(&mut self, username: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut UserAccount) -> Result<T>,
    {
        let mut next = self.db.clone();
        let account = next
            .get_mut(username)
            .ok_or_else(|| Error::UserNotFound(username.to_string()))?;
        let out = f(account)?;
        next.save(&self.path)?;
        self.db = next;
        Ok(out)
    }
}

/// Validate every provided field, then apply them all
fn apply_profile_update(
    account: &mut UserAccount,
    update: ProfileUpdate,
    config: &Config,
) -> Result<()> {
    let limits = &config.limits;
    if let Some(age) = update.age {
        limits.age.check("Age", f64::from(age), " years")?;
    }
    if let Some(height) = update.height {
        limits.height_cm.check("Height", height, " cm")?;
    }
    if let Some(weight) = update.weight {
        limits.weight_kg.check("Weight", weight, " kg")?;
    }

    let profile = &mut account.profile;
    if let Some(email) = update.email {
        let email = email.trim().to_string();
        account.email = email.clone();
        profile.email = Some(email);
    }
    if let Some(name) = update.name {
        profile.name = Some(name.trim().to_string());
    }
    if update.age.is_some() {
        profile.age = update.age;
    }
    if update.height.is_some() {
        profile.height = update.height;
    }
    if update.weight.is_some() {
        profile.weight = update.weight;
    }
    if let Some(gender) = update.gender {
        profile.gender = gender;
    }
    Ok(())
}

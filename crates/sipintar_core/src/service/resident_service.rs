//! Resident registry use cases.
//!
//! # Invariants
//! - NIK is unique across the working set; the record being edited does not
//!   collide with itself.
//! - NIK and KK numbers are 1 to 16 ASCII decimal digits.

use crate::model::account::Account;
use crate::model::new_record_id;
use crate::model::resident::{Gender, Resident};
use crate::repo::EntityRepository;
use crate::service::{require_admin, required, ServiceResult, ValidationError};
use crate::working_set::{LoadState, WorkingSet};
use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

static DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,16}$").expect("valid digit-string regex"));

/// Head counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Demographics {
    pub total: usize,
    pub male: usize,
    pub female: usize,
    /// Distinct non-empty KK numbers.
    pub households: usize,
    pub age_0_17: usize,
    pub age_18_40: usize,
    pub age_41_60: usize,
    pub age_over_60: usize,
    /// Residents without a birth date.
    pub age_unknown: usize,
}

pub struct ResidentService {
    repo: Arc<dyn EntityRepository<Resident>>,
    set: Arc<WorkingSet<Resident>>,
}

impl ResidentService {
    pub fn new(repo: Arc<dyn EntityRepository<Resident>>, set: Arc<WorkingSet<Resident>>) -> Self {
        Self { repo, set }
    }

    pub fn working_set(&self) -> &Arc<WorkingSet<Resident>> {
        &self.set
    }

    pub async fn load(&self) -> ServiceResult<LoadState> {
        Ok(self.set.load(self.repo.as_ref()).await?)
    }

    /// Registers a new resident under a fresh id and returns the stored value.
    pub async fn register(&self, mut resident: Resident) -> ServiceResult<Resident> {
        resident.id = new_record_id();
        let resident = self.checked(resident)?;
        self.set.save(self.repo.as_ref(), resident.clone()).await?;
        Ok(resident)
    }

    /// Replaces an existing resident, keyed by `resident.id`.
    pub async fn update(&self, resident: Resident) -> ServiceResult<Resident> {
        if self.set.find(&resident.id).is_none() {
            return Err(ValidationError::NotFound { key: resident.id }.into());
        }
        let resident = self.checked(resident)?;
        self.set.save(self.repo.as_ref(), resident.clone()).await?;
        Ok(resident)
    }

    pub async fn remove(&self, actor: &Account, id: &str) -> ServiceResult<()> {
        require_admin(actor, "delete residents")?;
        self.set.delete(self.repo.as_ref(), id).await?;
        Ok(())
    }

    /// Case-insensitive match on name or address, substring match on NIK.
    pub fn search(&self, term: &str) -> Vec<Resident> {
        let needle = term.trim().to_lowercase();
        self.set
            .get()
            .into_iter()
            .filter(|resident| {
                needle.is_empty()
                    || resident.name.to_lowercase().contains(&needle)
                    || resident.nik.contains(&needle)
                    || resident.address.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn demographics(&self) -> Demographics {
        demographics_on(&self.set.get(), Local::now().date_naive())
    }

    fn checked(&self, mut resident: Resident) -> Result<Resident, ValidationError> {
        resident.name = required(&resident.name, "name")?;
        resident.nik = required(&resident.nik, "nik")?;
        resident.kk_number = resident.kk_number.trim().to_string();

        if !is_digit_string(&resident.nik) {
            return Err(ValidationError::InvalidNumber { field: "nik" });
        }
        if !resident.kk_number.is_empty() && !is_digit_string(&resident.kk_number) {
            return Err(ValidationError::InvalidNumber { field: "kk_number" });
        }
        if nik_taken(&self.set.get(), &resident.nik, &resident.id) {
            return Err(ValidationError::DuplicateNik);
        }
        Ok(resident)
    }
}

fn demographics_on(residents: &[Resident], today: NaiveDate) -> Demographics {
    let mut stats = Demographics {
        total: residents.len(),
        ..Demographics::default()
    };
    let mut households = HashSet::new();
    for resident in residents {
        match resident.gender {
            Gender::Male => stats.male += 1,
            Gender::Female => stats.female += 1,
        }
        if !resident.kk_number.is_empty() {
            households.insert(resident.kk_number.as_str());
        }
        match resident.birth_date.map(|born| age_on(born, today)) {
            None => stats.age_unknown += 1,
            Some(age) if age <= 17 => stats.age_0_17 += 1,
            Some(age) if age <= 40 => stats.age_18_40 += 1,
            Some(age) if age <= 60 => stats.age_41_60 += 1,
            Some(_) => stats.age_over_60 += 1,
        }
    }
    stats.households = households.len();
    stats
}

/// Completed years between `born` and `today`.
fn age_on(born: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    age
}

fn is_digit_string(value: &str) -> bool {
    DIGITS_RE.is_match(value)
}

fn nik_taken(residents: &[Resident], nik: &str, own_id: &str) -> bool {
    residents
        .iter()
        .any(|other| other.nik == nik && other.id != own_id)
}

#[cfg(test)]
mod tests {
    use super::{age_on, demographics_on, is_digit_string, nik_taken, Demographics};
    use crate::model::resident::{Gender, Resident};
    use chrono::NaiveDate;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn digit_strings_are_bounded() {
        assert!(is_digit_string("3201123456780001"));
        assert!(is_digit_string("123"));
        assert!(!is_digit_string("32011234567800011"));
        assert!(!is_digit_string("12a4"));
        assert!(!is_digit_string(""));
    }

    #[test]
    fn non_ascii_digits_are_rejected() {
        assert!(!is_digit_string("\u{0661}\u{0662}\u{0663}"));
        assert!(!is_digit_string("\u{FF11}\u{FF12}"));
        assert!(!is_digit_string("12\u{0663}"));
    }

    #[test]
    fn age_counts_completed_years() {
        let today = ymd(2024, 6, 15);
        assert_eq!(age_on(ymd(2006, 6, 15), today), 18);
        assert_eq!(age_on(ymd(2006, 6, 16), today), 17);
    }

    #[test]
    fn demographics_bucket_ages_and_count_households() {
        let today = ymd(2024, 6, 15);
        let person = |id: &str, kk: &str, born: Option<NaiveDate>, gender: Gender| Resident {
            kk_number: kk.to_string(),
            birth_date: born,
            gender,
            ..Resident::new(id, id, "Warga")
        };
        let residents = vec![
            person("1", "K1", Some(ymd(2010, 1, 1)), Gender::Male),
            person("2", "K1", Some(ymd(1984, 6, 15)), Gender::Female),
            person("3", "K2", Some(ymd(1983, 6, 16)), Gender::Female),
            person("4", "K2", Some(ymd(1963, 6, 16)), Gender::Male),
            person("5", "", Some(ymd(1950, 1, 1)), Gender::Male),
            person("6", "", None, Gender::Female),
        ];

        assert_eq!(
            demographics_on(&residents, today),
            Demographics {
                total: 6,
                male: 3,
                female: 3,
                households: 2,
                age_0_17: 1,
                age_18_40: 2,
                age_41_60: 1,
                age_over_60: 1,
                age_unknown: 1,
            }
        );
    }

    #[test]
    fn nik_collision_excludes_self() {
        let residents = vec![Resident::new("1", "111", "A"), Resident::new("2", "222", "B")];
        assert!(nik_taken(&residents, "111", "3"));
        assert!(!nik_taken(&residents, "111", "1"));
        assert!(nik_taken(&residents, "222", "1"));
        assert!(!nik_taken(&residents, "333", "3"));
    }
}

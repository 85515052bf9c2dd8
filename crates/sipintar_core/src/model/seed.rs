//! Bundled first-run datasets for the local fallback store.
//!
//! Returned only while a collection's namespace key has never been written;
//! reading a seed never persists it.

use crate::model::account::{Account, Role};
use crate::model::announcement::Announcement;
use crate::model::resident::{Gender, MaritalStatus, Resident};
use crate::model::transaction::{Transaction, TransactionType};
use chrono::NaiveDate;

const DISTRICT_SUFFIX: &str = "RT 002/006";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn resident(
    id: &str,
    nik: &str,
    name: &str,
    gender: Gender,
    birth_date: NaiveDate,
    street: &str,
    job: &str,
    marital_status: MaritalStatus,
    phone: &str,
) -> Resident {
    Resident {
        gender,
        birth_date: Some(birth_date),
        address: format!("{street}, {DISTRICT_SUFFIX}"),
        job: job.to_string(),
        marital_status,
        phone: phone.to_string(),
        ..Resident::new(id, nik, name)
    }
}

pub fn residents() -> Vec<Resident> {
    vec![
        resident(
            "1",
            "3171012001900001",
            "Budi Santoso",
            Gender::Male,
            date(1990, 1, 20),
            "Jl. Merpati No. 4B",
            "Wiraswasta",
            MaritalStatus::Married,
            "081234567890",
        ),
        resident(
            "2",
            "3171015505920002",
            "Siti Aminah",
            Gender::Female,
            date(1992, 5, 15),
            "Jl. Merpati No. 4B",
            "Ibu Rumah Tangga",
            MaritalStatus::Married,
            "081234567891",
        ),
        resident(
            "3",
            "3171011010850003",
            "Agus Setiawan",
            Gender::Male,
            date(1985, 10, 10),
            "Jl. Kutilang No. 10",
            "PNS",
            MaritalStatus::Single,
            "081234567892",
        ),
        resident(
            "4",
            "3171016512700004",
            "Ratna Sari",
            Gender::Female,
            date(1970, 12, 25),
            "Jl. Elang No. 5",
            "Pedagang",
            MaritalStatus::Divorced,
            "081234567893",
        ),
        resident(
            "5",
            "3171012008000005",
            "Joko Widodo",
            Gender::Male,
            date(2000, 8, 20),
            "Jl. Pipit No. 12",
            "Mahasiswa",
            MaritalStatus::Single,
            "081234567894",
        ),
    ]
}

pub fn transactions() -> Vec<Transaction> {
    let entry = |id: &str,
                 day: u32,
                 description: &str,
                 category: &str,
                 amount: i64,
                 kind: TransactionType| Transaction {
        id: id.to_string(),
        date: date(2023, 10, day),
        description: description.to_string(),
        category: category.to_string(),
        amount,
        kind,
    };

    vec![
        entry(
            "T1",
            1,
            "Iuran Warga Bulan Oktober",
            "Iuran Wajib",
            2_500_000,
            TransactionType::Income,
        ),
        entry(
            "T2",
            5,
            "Perbaikan Lampu Jalan",
            "Infrastruktur",
            350_000,
            TransactionType::Expense,
        ),
        entry(
            "T3",
            15,
            "Konsumsi Kerja Bakti",
            "Kegiatan",
            150_000,
            TransactionType::Expense,
        ),
    ]
}

pub fn announcements() -> Vec<Announcement> {
    vec![
        Announcement {
            id: "A1".to_string(),
            title: "Kerja Bakti Minggu Ini".to_string(),
            content: "Diberitahukan kepada seluruh warga RT 002 RW 006 untuk mengikuti kegiatan \
                      kerja bakti membersihkan lingkungan pada hari Minggu, 29 Oktober 2023 pukul \
                      07.00 WIB. Diharapkan membawa peralatan kebersihan masing-masing."
                .to_string(),
            date: date(2023, 10, 25),
            is_ai_generated: false,
        },
        Announcement {
            id: "A2".to_string(),
            title: "Jadwal Posyandu Balita".to_string(),
            content: "Posyandu Balita bulan November akan dilaksanakan pada tanggal 5 November \
                      2023 di Balai Warga. Mohon ibu-ibu membawa balitanya untuk penimbangan dan \
                      imunisasi."
                .to_string(),
            date: date(2023, 10, 26),
            is_ai_generated: true,
        },
    ]
}

// Demo credentials; changed through the account service on first use.
pub fn accounts() -> Vec<Account> {
    vec![
        Account {
            username: "admin".to_string(),
            name: "Bapak Ketua RT".to_string(),
            role: Role::Admin,
            password: "password123".to_string(),
        },
        Account {
            username: "staff".to_string(),
            name: "Petugas Administrasi".to_string(),
            role: Role::Staff,
            password: "password123".to_string(),
        },
    ]
}

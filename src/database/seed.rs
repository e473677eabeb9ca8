use chrono::NaiveDate;

use crate::models::user::{User, UserRole, UserStatus};

use UserRole::{Admin, Editor, Viewer};
use UserStatus::{Active, Inactive, Pending};

type SeedRow = (
    &'static str,
    &'static str,
    &'static str,
    UserRole,
    UserStatus,
    (i32, u32, u32),
    (i32, u32, u32),
    &'static str,
);

const SEED: [SeedRow; 20] = [
    ("1", "Aria Chen", "aria.chen@company.io", Admin, Active, (2023, 1, 15), (2024, 1, 10), "Engineering"),
    ("2", "Marcus Webb", "marcus.webb@company.io", Editor, Active, (2023, 2, 20), (2024, 1, 9), "Design"),
    ("3", "Sophia Laurent", "sophia.l@company.io", Viewer, Inactive, (2023, 3, 10), (2023, 12, 1), "Marketing"),
    ("4", "Dante Rivera", "dante.r@company.io", Editor, Active, (2023, 4, 5), (2024, 1, 10), "Product"),
    ("5", "Imogen Blake", "imogen.blake@company.io", Admin, Active, (2023, 1, 28), (2024, 1, 10), "Engineering"),
    ("6", "Felix Nakamura", "felix.n@company.io", Viewer, Pending, (2023, 12, 1), (2023, 12, 15), "Sales"),
    ("7", "Zara Okafor", "zara.o@company.io", Editor, Active, (2023, 5, 14), (2024, 1, 8), "Content"),
    ("8", "Theo Marchetti", "theo.m@company.io", Viewer, Active, (2023, 6, 22), (2024, 1, 7), "Finance"),
    ("9", "Lyra Osei", "lyra.osei@company.io", Editor, Inactive, (2023, 7, 30), (2023, 11, 20), "HR"),
    ("10", "Caspian Voss", "caspian.v@company.io", Admin, Active, (2023, 8, 11), (2024, 1, 10), "Engineering"),
    ("11", "Mira Delacroix", "mira.d@company.io", Viewer, Active, (2023, 9, 3), (2024, 1, 6), "Design"),
    ("12", "Orion Kestrel", "orion.k@company.io", Editor, Pending, (2023, 12, 20), (2024, 1, 2), "Marketing"),
    ("13", "Sable Huang", "sable.h@company.io", Viewer, Active, (2023, 10, 17), (2024, 1, 9), "Product"),
    ("14", "Remy Fontaine", "remy.f@company.io", Editor, Active, (2023, 3, 29), (2024, 1, 10), "Engineering"),
    ("15", "Nova Ashworth", "nova.a@company.io", Admin, Inactive, (2023, 11, 5), (2023, 12, 28), "Sales"),
    ("16", "Elio Vasquez", "elio.v@company.io", Viewer, Active, (2023, 4, 18), (2024, 1, 8), "Finance"),
    ("17", "Petra Wolff", "petra.w@company.io", Editor, Active, (2023, 5, 27), (2024, 1, 10), "Content"),
    ("18", "Idris Saleh", "idris.s@company.io", Viewer, Pending, (2023, 12, 12), (2024, 1, 3), "HR"),
    ("19", "Vesper Crane", "vesper.c@company.io", Editor, Active, (2023, 6, 9), (2024, 1, 9), "Operations"),
    ("20", "Sylvan Park", "sylvan.p@company.io", Viewer, Active, (2023, 7, 22), (2024, 1, 7), "Design"),
];

fn date((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Directory contents at startup, in insertion order.
pub fn seed_users() -> Vec<User> {
    SEED.iter()
        .map(
            |&(id, name, email, role, status, joined_at, last_active, department)| User {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                role,
                status,
                avatar: String::new(),
                joined_at: date(joined_at),
                last_active: date(last_active),
                department: department.to_string(),
            },
        )
        .collect()
}

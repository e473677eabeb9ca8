use chrono::NaiveDate;

/// `2023-01-15` -> `Jan 15, 2023`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_the_table_column() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(format_date(date), "Jan 5, 2023");
        let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        assert_eq!(format_date(date), "Nov 30, 2024");
    }
}

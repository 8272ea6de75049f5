use anyhow::Result;

pub fn format_duration(total_seconds: u32) -> String {
    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }
    if total_seconds < 3600 {
        return format!("{} min", total_seconds / 60);
    }
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    if minutes == 0 {
        format!("{} hr", hours)
    } else {
        format!("{} hr {} min", hours, minutes)
    }
}

pub fn format_distance(meters: u32) -> String {
    if meters >= 1000 {
        // halves round up: 1250 m is "1.3 km"
        format!("{:.1} km", (meters as f64 / 100.0).round() / 10.0)
    } else {
        format!("{} m", meters)
    }
}

// The backend encodes durations as protobuf-json style strings, e.g. "1234s".
// Fractional seconds ("12.5s") are truncated.
pub fn parse_duration_seconds(s: &str) -> Result<u32> {
    let number = s
        .trim()
        .strip_suffix('s')
        .ok_or_else(|| anyhow!("duration without `s` suffix: {:?}", s))?;
    let whole = number.split('.').next().unwrap_or_default();
    Ok(whole.parse()?)
}

pub mod db {
    use anyhow::Result;
    use rusqlite::{OptionalExtension, Transaction};

    pub fn init_metadata_and_get_version(tx: &Transaction) -> Result<i32> {
        let create_db_metadata_sql = "
        CREATE TABLE IF NOT EXISTS `db_metadata` (
            `key`   TEXT NOT NULL,
            `value` TEXT,
            PRIMARY KEY(`key`)
        )";
        tx.execute(create_db_metadata_sql, ())?;
        let version_str: Option<String> = tx
            .query_row(
                "SELECT `value` FROM `db_metadata` WHERE key='version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(match version_str {
            None => 0,
            Some(s) => s.parse()?,
        })
    }

    pub fn set_version_in_metadata(tx: &Transaction, version: i32) -> Result<()> {
        tx.execute(
            "INSERT OR REPLACE INTO `db_metadata` (key, value) VALUES (?1, ?2)",
            ("version", version.to_string()),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::{format_distance, format_duration, parse_duration_seconds};

    #[test]
    fn duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1 min");
        assert_eq!(format_duration(120), "2 min");
        assert_eq!(format_duration(3599), "59 min");
        assert_eq!(format_duration(3600), "1 hr");
        assert_eq!(format_duration(3661), "1 hr 1 min");
        assert_eq!(format_duration(7200 + 59), "2 hr");
    }

    #[test]
    fn distance() {
        assert_eq!(format_distance(0), "0 m");
        assert_eq!(format_distance(250), "250 m");
        assert_eq!(format_distance(999), "999 m");
        assert_eq!(format_distance(1000), "1.0 km");
        assert_eq!(format_distance(1500), "1.5 km");
        assert_eq!(format_distance(12345), "12.3 km");
        assert_eq!(format_distance(1250), "1.3 km");
        assert_eq!(format_distance(2250), "2.3 km");
        assert_eq!(format_distance(1249), "1.2 km");
        assert_eq!(format_distance(9950), "10.0 km");
    }

    #[test]
    fn parse_duration() {
        assert_eq!(parse_duration_seconds("0s").unwrap(), 0);
        assert_eq!(parse_duration_seconds("1234s").unwrap(), 1234);
        assert_eq!(parse_duration_seconds(" 12.7s").unwrap(), 12);
        assert!(parse_duration_seconds("12").is_err());
        assert!(parse_duration_seconds("s").is_err());
        assert!(parse_duration_seconds("-3s").is_err());
    }
}

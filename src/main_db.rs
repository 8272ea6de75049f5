use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::cmp::Ordering;
use std::error::Error;
use std::path::Path;
use std::str::FromStr;

use crate::report::ReportRecord;
use crate::report_store::ReportPersistence;
use crate::utils;

/* The main database. It is mostly used as a durable key-value store with
transaction support, the same way a browser would use local storage.

`kv` holds whole serialized documents keyed by name. The report set lives under
`REPORTS_KEY` as one JSON array and is always replaced in a single transaction,
so a crash leaves either the old or the new set, never a mix. An empty set
removes the key.

`setting` keeps user preferences.
*/

pub const REPORTS_KEY: &str = "coolpath-reports";

#[allow(clippy::type_complexity)]
fn run_migration(
    conn: &mut Connection,
    migrations: &[&dyn Fn(&Transaction) -> Result<()>],
) -> Result<()> {
    let tx = conn.transaction()?;

    let version = utils::db::init_metadata_and_get_version(&tx)? as usize;
    let target_version = migrations.len();
    debug!(
        "current version = {}, target_version = {}",
        version, target_version
    );
    match version.cmp(&target_version) {
        Ordering::Equal => (),
        Ordering::Less => {
            for (i, f) in migrations.iter().enumerate().skip(version) {
                info!("running migration for version: {}", i + 1);
                f(&tx)?;
            }
            utils::db::set_version_in_metadata(&tx, target_version as i32)?;
        }
        Ordering::Greater => {
            bail!(
                "version too high: current version = {}, target_version = {}",
                version,
                target_version
            );
        }
    }
    tx.commit()?;
    Ok(())
}

fn migrate(conn: &mut Connection) -> Result<()> {
    run_migration(
        conn,
        &[&|tx| {
            let sql = "
            CREATE TABLE kv (
                key               TEXT    PRIMARY KEY
                                          NOT NULL
                                          UNIQUE,
                value             TEXT    NOT NULL
            );
            CREATE TABLE setting (
                key               TEXT    PRIMARY KEY
                                          NOT NULL
                                          UNIQUE,
                value             TEXT
            );
            ";
            for s in sql_split::split(sql) {
                tx.execute(&s, ())?;
            }
            Ok(())
        }],
    )
}

pub struct Txn<'a> {
    db_txn: rusqlite::Transaction<'a>,
}

impl Txn<'_> {
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let mut query = self.db_txn.prepare("SELECT value FROM kv WHERE key = ?1;")?;
        Ok(query.query_row([key], |row| row.get(0)).optional()?)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        self.db_txn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2);",
            (key, value),
        )?;
        Ok(())
    }

    pub fn delete_value(&mut self, key: &str) -> Result<()> {
        self.db_txn.execute("DELETE FROM kv WHERE key = ?1;", (key,))?;
        Ok(())
    }
}

pub struct MainDb {
    conn: Connection,
}

impl MainDb {
    pub fn open(support_dir: &str) -> Result<MainDb> {
        debug!("opening main db in {}", support_dir);
        let mut conn = Connection::open(Path::new(support_dir).join("main.db"))?;
        migrate(&mut conn)?;
        Ok(MainDb { conn })
    }

    pub fn open_in_memory() -> Result<MainDb> {
        let mut conn = Connection::open_in_memory()?;
        migrate(&mut conn)?;
        Ok(MainDb { conn })
    }

    pub fn with_txn<F, O>(&mut self, f: F) -> Result<O>
    where
        F: FnOnce(&mut Txn) -> Result<O>,
    {
        let mut txn = Txn {
            db_txn: self.conn.transaction()?,
        };
        let output = f(&mut txn)?;
        txn.db_txn.commit()?;
        Ok(output)
    }

    pub fn flush(&self) -> Result<()> {
        self.conn.cache_flush()?;
        Ok(())
    }

    fn get_setting<T: FromStr>(&mut self, setting: Setting) -> Result<Option<T>>
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        let mut query = self
            .conn
            .prepare("SELECT value FROM setting WHERE key = ?1;")?;
        let result: Option<String> = query
            .query_row([setting.to_db_key()], |row| row.get(0))
            .optional()?;
        match result {
            None => Ok(None),
            Some(s) => {
                let v = FromStr::from_str(&s)?;
                Ok(Some(v))
            }
        }
    }

    pub fn get_setting_with_default<T: FromStr>(&mut self, setting: Setting, default: T) -> T
    where
        <T as FromStr>::Err: Error + Send + Sync + 'static,
    {
        match self.get_setting(setting) {
            Ok(v) => v,
            Err(error) => {
                warn!(
                    "[main_db.get_setting_with_default] setting:{:?}, error:{}",
                    setting, error
                );
                None
            }
        }
        .unwrap_or(default)
    }

    pub fn set_setting<T: ToString>(&mut self, setting: Setting, value: T) -> Result<()> {
        let sql = "INSERT OR REPLACE INTO setting (key, value) VALUES (?1, ?2);";
        self.conn
            .execute(sql, (setting.to_db_key(), value.to_string()))?;
        Ok(())
    }
}

impl ReportPersistence for MainDb {
    fn load(&mut self) -> Result<Vec<ReportRecord>> {
        match self.with_txn(|txn| txn.get_value(REPORTS_KEY))? {
            None => Ok(Vec::new()),
            Some(json) => Ok(serde_json::from_str(&json)?),
        }
    }

    fn save(&mut self, records: &[ReportRecord]) -> Result<()> {
        if records.is_empty() {
            return self.with_txn(|txn| txn.delete_value(REPORTS_KEY));
        }
        let json = serde_json::to_string(records)?;
        self.with_txn(|txn| txn.set_value(REPORTS_KEY, &json))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Setting {
    CondenseWalkingSteps,
    RouteSortOrder,
}

impl Setting {
    fn to_db_key(self) -> &'static str {
        match self {
            Self::CondenseWalkingSteps => "CONDENSE_WALKING_STEPS",
            Self::RouteSortOrder => "ROUTE_SORT_ORDER",
        }
    }
}

use anyhow::Result;
use std::sync::{Arc, Mutex};

use crate::main_db::{MainDb, Setting};
use crate::report_store::{ReportPersistence, ReportStore, UnavailablePersistence};
use crate::route_data::{self, RouteCandidate, RouteSortKey};
use crate::route_view::{RouteView, RouteViewCache};

pub type SessionReportStore = ReportStore<Box<dyn ReportPersistence + Send>>;

/// Per-session state. Each piece sits behind its own lock; report mutations
/// and their persist run entirely under the report store lock.
pub struct Session {
    main_db: Mutex<MainDb>,
    reports: Mutex<SessionReportStore>,
    route_views: Mutex<RouteViewCache>,
}

impl Session {
    /// Opens `{support_dir}/main.db`. If the database cannot be opened the
    /// session still starts, with settings and reports kept in memory.
    pub fn init(support_dir: &str) -> Result<Self> {
        let main_db = match MainDb::open(support_dir) {
            Ok(db) => db,
            Err(error) => {
                warn!(
                    "[storage] main db unavailable, settings are in-memory: {:#}",
                    error
                );
                MainDb::open_in_memory()?
            }
        };
        // reports get their own connection so they never wait on settings
        let persistence: Box<dyn ReportPersistence + Send> = match MainDb::open(support_dir) {
            Ok(db) => Box::new(db),
            Err(error) => {
                warn!(
                    "[storage] report storage unavailable, reports are in-memory: {:#}",
                    error
                );
                Box::new(UnavailablePersistence::new(format!("{:#}", error)))
            }
        };
        let reports = ReportStore::open(persistence);
        info!("[storage] session initialized");
        Ok(Session {
            main_db: Mutex::new(main_db),
            reports: Mutex::new(reports),
            route_views: Mutex::new(RouteViewCache::new()),
        })
    }

    pub fn with_reports<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&mut SessionReportStore) -> O,
    {
        let mut reports = self.reports.lock().unwrap();
        f(&mut reports)
    }

    pub fn condense_walking_steps(&self) -> bool {
        let mut main_db = self.main_db.lock().unwrap();
        main_db.get_setting_with_default(Setting::CondenseWalkingSteps, false)
    }

    pub fn set_condense_walking_steps(&self, enable: bool) -> Result<()> {
        debug!("[storage] condense walking steps: {}", enable);
        let mut main_db = self.main_db.lock().unwrap();
        main_db.set_setting(Setting::CondenseWalkingSteps, enable)
    }

    pub fn route_sort_order(&self) -> RouteSortKey {
        let mut main_db = self.main_db.lock().unwrap();
        main_db.get_setting_with_default(Setting::RouteSortOrder, RouteSortKey::Shade)
    }

    pub fn set_route_sort_order(&self, key: RouteSortKey) -> Result<()> {
        let mut main_db = self.main_db.lock().unwrap();
        main_db.set_setting(Setting::RouteSortOrder, key)
    }

    /// Parses a backend response and orders it by the user's sort setting.
    /// Previously built views are dropped since they belong to the old
    /// candidates.
    pub fn load_routes(&self, json: &str) -> Result<Vec<RouteCandidate>> {
        let mut routes = route_data::parse_routes(json)?;
        route_data::sort_routes(&mut routes, self.route_sort_order());
        self.route_views.lock().unwrap().clear();
        Ok(routes)
    }

    pub fn route_view(&self, route: &RouteCandidate) -> Arc<RouteView> {
        let condensed = self.condense_walking_steps();
        let mut route_views = self.route_views.lock().unwrap();
        route_views.get_or_build(route, condensed)
    }

    pub fn flush(&self) -> Result<()> {
        debug!("[storage] flushing");
        let main_db = self.main_db.lock().unwrap();
        main_db.flush()
    }
}

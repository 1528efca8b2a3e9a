use std::sync::Arc;

use anyhow::Context;
use chrono_tz::Tz;
use mongodb::Database;
use vigil_config::Settings;
use vigil_services::{
    AuthService, CheckInService, SessionStore,
    dao::{
        attendance::AttendanceDao, member::MemberDao, role::RoleDao,
        stream_config::StreamConfigDao,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub tz: Tz,
    pub auth: Arc<AuthService>,
    pub sessions: Arc<SessionStore>,
    pub members: Arc<MemberDao>,
    pub roles: Arc<RoleDao>,
    pub attendance: Arc<AttendanceDao>,
    pub stream_configs: Arc<StreamConfigDao>,
    pub check_in: Arc<CheckInService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> anyhow::Result<Self> {
        let tz: Tz = settings
            .app
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Unknown time zone '{}'", settings.app.timezone))?;

        anyhow::ensure!(
            settings.attendance.list_limit >= 1,
            "attendance.list_limit must be at least 1, got {}",
            settings.attendance.list_limit
        );

        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let sessions = Arc::new(SessionStore::new());
        let members = Arc::new(MemberDao::new(&db));
        let roles = Arc::new(RoleDao::new(&db));
        let attendance = Arc::new(AttendanceDao::new(&db));
        let stream_configs = Arc::new(StreamConfigDao::new(&db));
        let check_in = Arc::new(CheckInService::new(
            Arc::clone(&attendance),
            tz,
            settings.stream.default_title.clone(),
        ));

        Ok(Self {
            db,
            settings,
            tz,
            auth,
            sessions,
            members,
            roles,
            attendance,
            stream_configs,
            check_in,
        })
    }
}

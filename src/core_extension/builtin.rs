// Extensions shipped with the daemon, selectable from the [[extensions]] table

use crate::config::{ExtensionConfig, ExtensionKind};
use crate::core_extension::error::ExtensionError;
use crate::core_extension::extension::{Extension, ExtensionContext, FtpEvent, HookResult, Outcome};
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_listener::ServerStatistics;
use crate::session::Session;
use log::info;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Builds the extension described by one `[[extensions]]` entry.
pub fn build(config: &ExtensionConfig) -> Result<Arc<dyn Extension>, ExtensionError> {
    match config.kind {
        ExtensionKind::AuditLog => Ok(Arc::new(AuditLog::default())),
        ExtensionKind::ReadOnly => Ok(Arc::new(ReadOnly)),
        ExtensionKind::DenyPattern => {
            let pattern = config.pattern.as_deref().ok_or_else(|| {
                ExtensionError::InvalidConfig(format!(
                    "extension \"{}\" of kind deny_pattern needs a pattern",
                    config.name
                ))
            })?;
            Ok(Arc::new(DenyPattern::new(pattern)?))
        }
    }
}

const AUDIT_EVENTS: &str = "audit.events";

/// Logs every event it sees and never interferes.
#[derive(Default)]
pub struct AuditLog {
    statistics: OnceLock<Arc<ServerStatistics>>,
}

impl Extension for AuditLog {
    fn init(&self, ctx: &ExtensionContext) -> Result<(), ExtensionError> {
        let _ = self.statistics.set(Arc::clone(&ctx.statistics));
        Ok(())
    }

    fn destroy(&self) -> Result<(), ExtensionError> {
        if let Some(stats) = self.statistics.get() {
            let snapshot = stats.snapshot();
            info!(
                "audit: closing after {} connections, {} logins",
                snapshot.total_connections, snapshot.logins
            );
        }
        Ok(())
    }

    fn on_event(&self, session: &mut Session, event: FtpEvent<'_>) -> HookResult {
        let seen = session
            .attribute(AUDIT_EVENTS)
            .and_then(|n| n.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;

        let user = session.user().map(|u| u.name.as_str()).unwrap_or("-");
        match (event, event.request()) {
            (FtpEvent::Connect, _) => info!(
                "audit: session={} event=connect from={:?}",
                session.id(),
                session.client_addr()
            ),
            (_, Some(request)) => info!(
                "audit: session={} user={} event={} at={} request={:?}",
                session.id(),
                user,
                event.name(),
                request.received_at().format("%H:%M:%S%.3f"),
                request.loggable()
            ),
            (_, None) => info!(
                "audit: session={} user={} event={} events_seen={}",
                session.id(),
                user,
                event.name(),
                seen
            ),
        }

        if matches!(event, FtpEvent::Disconnect) {
            session.remove_attribute(AUDIT_EVENTS)?;
        } else {
            session.set_attribute(AUDIT_EVENTS, seen.to_string())?;
        }
        Ok(Outcome::Default)
    }
}

/// Refuses to create files, directories or rename targets whose name matches
/// a regular expression.
pub struct DenyPattern {
    pattern: Regex,
}

impl DenyPattern {
    pub fn new(pattern: &str) -> Result<Self, ExtensionError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| ExtensionError::InvalidConfig(format!("bad pattern {:?}: {}", pattern, e)))?;
        Ok(Self { pattern })
    }

    fn check(&self, session: &mut Session, request: &FtpRequest) -> HookResult {
        match request.argument() {
            Some(arg) if self.pattern.is_match(arg) => {
                session.queue_reply(FtpReply::new(553, format!("{}: file name not allowed.", arg)))?;
                Ok(Outcome::Deny)
            }
            _ => Ok(Outcome::Default),
        }
    }
}

impl Extension for DenyPattern {
    fn on_upload_start(&self, session: &mut Session, request: &FtpRequest) -> HookResult {
        self.check(session, request)
    }

    fn on_append_start(&self, session: &mut Session, request: &FtpRequest) -> HookResult {
        self.check(session, request)
    }

    fn on_upload_unique_start(&self, session: &mut Session, request: &FtpRequest) -> HookResult {
        self.check(session, request)
    }

    fn on_mkdir_start(&self, session: &mut Session, request: &FtpRequest) -> HookResult {
        self.check(session, request)
    }

    fn on_rename_start(&self, session: &mut Session, request: &FtpRequest) -> HookResult {
        self.check(session, request)
    }
}

/// Denies every action that would modify the filesystem.
pub struct ReadOnly;

impl Extension for ReadOnly {
    fn on_event(&self, session: &mut Session, event: FtpEvent<'_>) -> HookResult {
        if !event.is_mutating_start() {
            return Ok(Outcome::Default);
        }
        session.queue_reply(FtpReply::new(550, "Permission denied: server is read-only."))?;
        Ok(Outcome::Deny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: ExtensionKind, pattern: Option<&str>) -> ExtensionConfig {
        ExtensionConfig {
            name: "test".into(),
            kind,
            pattern: pattern.map(String::from),
        }
    }

    #[test]
    fn test_deny_pattern_blocks_matching_upload() {
        let ext = DenyPattern::new(r"\.exe$").unwrap();
        let mut session = Session::new(None);

        let bad = FtpRequest::parse("STOR setup.exe").unwrap();
        let outcome = ext.on_event(&mut session, FtpEvent::UploadStart(&bad)).unwrap();
        assert_eq!(outcome, Outcome::Deny);
        let replies = session.take_replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].code(), 553);

        let good = FtpRequest::parse("STOR notes.txt").unwrap();
        let outcome = ext.on_event(&mut session, FtpEvent::UploadStart(&good)).unwrap();
        assert_eq!(outcome, Outcome::Default);
        assert!(session.take_replies().is_empty());
    }

    #[test]
    fn test_deny_pattern_ignores_downloads() {
        let ext = DenyPattern::new(r"\.exe$").unwrap();
        let mut session = Session::new(None);
        let request = FtpRequest::parse("RETR setup.exe").unwrap();
        let outcome = ext.on_event(&mut session, FtpEvent::DownloadStart(&request)).unwrap();
        assert_eq!(outcome, Outcome::Default);
    }

    #[test]
    fn test_read_only_denies_mutations_only() {
        let ext = ReadOnly;
        let mut session = Session::new(None);

        let mkd = FtpRequest::parse("MKD docs").unwrap();
        assert_eq!(
            ext.on_event(&mut session, FtpEvent::MkdirStart(&mkd)).unwrap(),
            Outcome::Deny
        );
        assert_eq!(session.take_replies()[0].code(), 550);

        let retr = FtpRequest::parse("RETR a.txt").unwrap();
        assert_eq!(
            ext.on_event(&mut session, FtpEvent::DownloadStart(&retr)).unwrap(),
            Outcome::Default
        );
        assert_eq!(
            ext.on_event(&mut session, FtpEvent::MkdirEnd(&mkd)).unwrap(),
            Outcome::Default
        );
    }

    #[test]
    fn test_build_from_config() {
        assert!(build(&config(ExtensionKind::AuditLog, None)).is_ok());
        assert!(build(&config(ExtensionKind::ReadOnly, None)).is_ok());
        assert!(build(&config(ExtensionKind::DenyPattern, Some("^tmp"))).is_ok());
        assert!(matches!(
            build(&config(ExtensionKind::DenyPattern, None)),
            Err(ExtensionError::InvalidConfig(_))
        ));
        assert!(matches!(
            build(&config(ExtensionKind::DenyPattern, Some("("))),
            Err(ExtensionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_audit_log_never_interferes() {
        let ext = AuditLog::default();
        ext.init(&ExtensionContext {
            statistics: Arc::new(ServerStatistics::new()),
        })
        .unwrap();
        let mut session = Session::new(None);
        let request = FtpRequest::parse("PASS secret").unwrap();
        assert_eq!(
            ext.on_event(&mut session, FtpEvent::Login(&request)).unwrap(),
            Outcome::Default
        );
        assert!(ext.destroy().is_ok());
    }

    #[test]
    fn test_audit_log_counts_events_per_session() {
        let ext = AuditLog::default();
        let mut session = Session::new(None);
        let request = FtpRequest::parse("MKD docs").unwrap();

        ext.on_event(&mut session, FtpEvent::Connect).unwrap();
        ext.on_event(&mut session, FtpEvent::MkdirStart(&request)).unwrap();
        assert_eq!(session.attribute(AUDIT_EVENTS), Some("2"));

        ext.on_event(&mut session, FtpEvent::Disconnect).unwrap();
        assert_eq!(session.attribute(AUDIT_EVENTS), None);
    }
}

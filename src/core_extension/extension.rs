use crate::core_extension::error::ExtensionError;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_listener::ServerStatistics;
use crate::session::Session;
use std::sync::Arc;

/// What an extension wants done with the event it just saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Let the next extension, then the server, carry on.
    #[default]
    Default,
    /// Refuse: the server skips the action.
    Deny,
    /// The extension took care of it (and of the reply).
    AlreadyHandled,
}

pub type HookResult = Result<Outcome, ExtensionError>;

/// Lifecycle events run through the interception pipeline.
#[derive(Debug, Clone, Copy)]
pub enum FtpEvent<'r> {
    Connect,
    Disconnect,
    Login(&'r FtpRequest),
    DeleteStart(&'r FtpRequest),
    DeleteEnd(&'r FtpRequest),
    UploadStart(&'r FtpRequest),
    UploadEnd(&'r FtpRequest),
    DownloadStart(&'r FtpRequest),
    DownloadEnd(&'r FtpRequest),
    RmdirStart(&'r FtpRequest),
    RmdirEnd(&'r FtpRequest),
    MkdirStart(&'r FtpRequest),
    MkdirEnd(&'r FtpRequest),
    AppendStart(&'r FtpRequest),
    AppendEnd(&'r FtpRequest),
    UploadUniqueStart(&'r FtpRequest),
    UploadUniqueEnd(&'r FtpRequest),
    RenameStart(&'r FtpRequest),
    RenameEnd(&'r FtpRequest),
    Site(&'r FtpRequest),
}

impl<'r> FtpEvent<'r> {
    pub fn name(&self) -> &'static str {
        match self {
            FtpEvent::Connect => "connect",
            FtpEvent::Disconnect => "disconnect",
            FtpEvent::Login(_) => "login",
            FtpEvent::DeleteStart(_) => "delete_start",
            FtpEvent::DeleteEnd(_) => "delete_end",
            FtpEvent::UploadStart(_) => "upload_start",
            FtpEvent::UploadEnd(_) => "upload_end",
            FtpEvent::DownloadStart(_) => "download_start",
            FtpEvent::DownloadEnd(_) => "download_end",
            FtpEvent::RmdirStart(_) => "rmdir_start",
            FtpEvent::RmdirEnd(_) => "rmdir_end",
            FtpEvent::MkdirStart(_) => "mkdir_start",
            FtpEvent::MkdirEnd(_) => "mkdir_end",
            FtpEvent::AppendStart(_) => "append_start",
            FtpEvent::AppendEnd(_) => "append_end",
            FtpEvent::UploadUniqueStart(_) => "upload_unique_start",
            FtpEvent::UploadUniqueEnd(_) => "upload_unique_end",
            FtpEvent::RenameStart(_) => "rename_start",
            FtpEvent::RenameEnd(_) => "rename_end",
            FtpEvent::Site(_) => "site",
        }
    }

    pub fn request(&self) -> Option<&'r FtpRequest> {
        match *self {
            FtpEvent::Connect | FtpEvent::Disconnect => None,
            FtpEvent::Login(r)
            | FtpEvent::DeleteStart(r)
            | FtpEvent::DeleteEnd(r)
            | FtpEvent::UploadStart(r)
            | FtpEvent::UploadEnd(r)
            | FtpEvent::DownloadStart(r)
            | FtpEvent::DownloadEnd(r)
            | FtpEvent::RmdirStart(r)
            | FtpEvent::RmdirEnd(r)
            | FtpEvent::MkdirStart(r)
            | FtpEvent::MkdirEnd(r)
            | FtpEvent::AppendStart(r)
            | FtpEvent::AppendEnd(r)
            | FtpEvent::UploadUniqueStart(r)
            | FtpEvent::UploadUniqueEnd(r)
            | FtpEvent::RenameStart(r)
            | FtpEvent::RenameEnd(r)
            | FtpEvent::Site(r) => Some(r),
        }
    }

    /// Start events of actions that change the filesystem.
    pub fn is_mutating_start(&self) -> bool {
        matches!(
            self,
            FtpEvent::DeleteStart(_)
                | FtpEvent::UploadStart(_)
                | FtpEvent::RmdirStart(_)
                | FtpEvent::MkdirStart(_)
                | FtpEvent::AppendStart(_)
                | FtpEvent::UploadUniqueStart(_)
                | FtpEvent::RenameStart(_)
        )
    }
}

/// Handed to [`Extension::init`].
#[derive(Clone)]
pub struct ExtensionContext {
    pub statistics: Arc<ServerStatistics>,
}

/// A named interceptor. Every hook defaults to a no-op returning
/// [`Outcome::Default`], so an extension only overrides what it cares about.
///
/// Hooks run on the connection's worker and may queue replies with
/// [`Session::queue_reply`]; those replies are sent when the hook returns a
/// non-default outcome.
pub trait Extension: Send + Sync {
    fn init(&self, _ctx: &ExtensionContext) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn destroy(&self) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Single entry point used by the registry; routes to the per-event
    /// hooks below. Override it to observe every event at once.
    fn on_event(&self, session: &mut Session, event: FtpEvent<'_>) -> HookResult {
        match event {
            FtpEvent::Connect => self.on_connect(session),
            FtpEvent::Disconnect => self.on_disconnect(session),
            FtpEvent::Login(r) => self.on_login(session, r),
            FtpEvent::DeleteStart(r) => self.on_delete_start(session, r),
            FtpEvent::DeleteEnd(r) => self.on_delete_end(session, r),
            FtpEvent::UploadStart(r) => self.on_upload_start(session, r),
            FtpEvent::UploadEnd(r) => self.on_upload_end(session, r),
            FtpEvent::DownloadStart(r) => self.on_download_start(session, r),
            FtpEvent::DownloadEnd(r) => self.on_download_end(session, r),
            FtpEvent::RmdirStart(r) => self.on_rmdir_start(session, r),
            FtpEvent::RmdirEnd(r) => self.on_rmdir_end(session, r),
            FtpEvent::MkdirStart(r) => self.on_mkdir_start(session, r),
            FtpEvent::MkdirEnd(r) => self.on_mkdir_end(session, r),
            FtpEvent::AppendStart(r) => self.on_append_start(session, r),
            FtpEvent::AppendEnd(r) => self.on_append_end(session, r),
            FtpEvent::UploadUniqueStart(r) => self.on_upload_unique_start(session, r),
            FtpEvent::UploadUniqueEnd(r) => self.on_upload_unique_end(session, r),
            FtpEvent::RenameStart(r) => self.on_rename_start(session, r),
            FtpEvent::RenameEnd(r) => self.on_rename_end(session, r),
            FtpEvent::Site(r) => self.on_site(session, r),
        }
    }

    fn on_connect(&self, _session: &mut Session) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_disconnect(&self, _session: &mut Session) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_login(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_delete_start(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_delete_end(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_upload_start(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_upload_end(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_download_start(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_download_end(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_rmdir_start(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_rmdir_end(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_mkdir_start(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_mkdir_end(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_append_start(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_append_end(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_upload_unique_start(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_upload_unique_end(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_rename_start(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_rename_end(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }

    fn on_site(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Default)
    }
}

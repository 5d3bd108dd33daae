// Command handling over an in-memory control connection

use crate::core_extension::builtin::ReadOnly;
use crate::core_extension::{Extension, HookResult, Outcome};
use crate::core_ftpcommand::dispatch::dispatch;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::test_support::*;
use crate::core_listener::FileListener;
use crate::core_network::network::handle_connection;
use crate::core_tls::TlsError;
use crate::session::{RenameState, Session, SessionId, TransferType};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{duplex, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;

fn harness(dir: &TempDir) -> Harness {
    Harness::new(server_context(dir.path(), FakeTransportFactory::configured()))
}

struct DenyLogin;

impl Extension for DenyLogin {
    fn on_login(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        Ok(Outcome::Deny)
    }
}

struct DenyConnect;

impl Extension for DenyConnect {
    fn on_connect(&self, _session: &mut Session) -> HookResult {
        Ok(Outcome::Deny)
    }
}

#[derive(Default)]
struct CountDisconnects(AtomicUsize);

impl Extension for CountDisconnects {
    fn on_disconnect(&self, _session: &mut Session) -> HookResult {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(Outcome::Default)
    }
}

#[derive(Default)]
struct RecordDeletes(Mutex<Vec<PathBuf>>);

impl FileListener for RecordDeletes {
    fn notify_upload(&self, _file: &Path, _session_id: SessionId) {}
    fn notify_download(&self, _file: &Path, _session_id: SessionId) {}
    fn notify_delete(&self, file: &Path, _session_id: SessionId) {
        self.0.lock().unwrap().push(file.to_path_buf());
    }
}

type Trace = Arc<Mutex<Vec<&'static str>>>;

struct TraceDeleteEnd(Trace);

impl Extension for TraceDeleteEnd {
    fn on_delete_end(&self, _session: &mut Session, _request: &FtpRequest) -> HookResult {
        self.0.lock().unwrap().push("delete_end_hook");
        Ok(Outcome::Default)
    }
}

struct TraceDeleteListener(Trace);

impl FileListener for TraceDeleteListener {
    fn notify_upload(&self, _file: &Path, _session_id: SessionId) {}
    fn notify_download(&self, _file: &Path, _session_id: SessionId) {}
    fn notify_delete(&self, _file: &Path, _session_id: SessionId) {
        self.0.lock().unwrap().push("listener");
    }
}

/// Takes over MKD, optionally answering for it.
struct MkdirElsewhere {
    answer: bool,
}

impl Extension for MkdirElsewhere {
    fn on_mkdir_start(&self, session: &mut Session, _request: &FtpRequest) -> HookResult {
        if self.answer {
            session.queue_reply(FtpReply::new(257, "\"/docs\" made elsewhere."))?;
        }
        Ok(Outcome::AlreadyHandled)
    }
}

struct RewordMkdir;

impl Extension for RewordMkdir {
    fn on_mkdir_end(&self, session: &mut Session, _request: &FtpRequest) -> HookResult {
        session.queue_reply(FtpReply::new(250, "Directory registered."))?;
        Ok(Outcome::Deny)
    }
}

// -- AUTH ----------------------------------------------------------------

#[tokio::test]
async fn test_auth_without_tls_configured_is_431() {
    let dir = TempDir::new().unwrap();
    let mut h = Harness::new(server_context(dir.path(), FakeTransportFactory::unconfigured()));

    let (code, _) = h.run("AUTH SSL").await;
    assert_eq!(code, 431);
    assert!(!h.ctx.session.is_secure());

    // The plaintext channel is still usable.
    assert_eq!(h.run("NOOP").await.0, 200);
}

#[tokio::test]
async fn test_auth_ssl_and_tls_upgrade_the_channel() {
    let dir = TempDir::new().unwrap();
    let factory = FakeTransportFactory::configured();
    let mut h = Harness::new(server_context(dir.path(), factory.clone()));

    let (code, text) = h.run("AUTH SSL").await;
    assert_eq!(code, 234);
    assert!(text.contains("SSL"));
    assert!(h.ctx.session.is_secure());

    let (code, text) = h.run("auth tls").await;
    assert_eq!(code, 234);
    assert!(text.contains("TLS"));
    assert!(h.ctx.session.is_secure());
    assert_eq!(factory.upgrades.load(Ordering::SeqCst), 2);

    assert_eq!(h.run("NOOP").await.0, 200);
}

#[tokio::test]
async fn test_auth_syntax_and_unknown_mechanism() {
    let dir = TempDir::new().unwrap();
    let mut h = harness(&dir);

    assert_eq!(h.run("AUTH").await.0, 501);
    assert_eq!(h.run("AUTH KERBEROS").await.0, 502);
    assert!(!h.ctx.session.is_secure());
}

#[tokio::test]
async fn test_rejected_auth_leaves_session_state_alone() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let mut h = harness(&dir);
    h.login("alice").await;
    assert_eq!(h.run("CWD sub").await.0, 250);
    assert_eq!(h.run("TYPE I").await.0, 200);
    h.ctx.session.set_attribute("client.tag", "x").unwrap();

    assert_eq!(h.run("AUTH").await.0, 501);
    assert_eq!(h.run("AUTH KERBEROS").await.0, 502);

    let session = &h.ctx.session;
    assert_eq!(session.user().map(|u| u.name.as_str()), Some("alice"));
    assert_eq!(session.current_dir(), "/sub");
    assert_eq!(session.transfer_type(), TransferType::Image);
    assert_eq!(session.attribute("client.tag"), Some("x"));
    assert!(!session.is_secure());
    assert_eq!(h.run("PWD").await.0, 257);
}

#[tokio::test]
async fn test_auth_resets_pending_rename() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
    let mut h = harness(&dir);
    h.login("alice").await;

    assert_eq!(h.run("RNFR a.txt").await.0, 350);
    assert_eq!(h.run("AUTH TLS").await.0, 234);
    assert_eq!(h.ctx.session.rename_state(), &RenameState::Idle);
    assert_eq!(h.run("RNTO b.txt").await.0, 503);
}

#[tokio::test]
async fn test_failed_handshake_ends_the_connection() {
    let dir = TempDir::new().unwrap();
    let factory = Arc::new(BrokenTransportFactory { rejection: None });
    let mut h = Harness::new(server_context(dir.path(), factory));

    let result = dispatch(&mut h.ctx, "AUTH TLS").await;
    assert!(matches!(
        result,
        Err(FtpError::Handshake(TlsError::TlsHandshakeError(_)))
    ));
    assert_eq!(h.client.reply().await.0, 234);
    assert!(!h.ctx.session.is_secure());
    assert!(!h.ctx.channel.is_open());
}

#[tokio::test]
async fn test_refused_upgrade_ends_the_connection() {
    let dir = TempDir::new().unwrap();
    let factory = Arc::new(BrokenTransportFactory {
        rejection: Some(FtpReply::new(534, "Client certificate required.")),
    });
    let mut h = Harness::new(server_context(dir.path(), factory));

    let result = dispatch(&mut h.ctx, "AUTH TLS").await;
    assert!(matches!(
        result,
        Err(FtpError::Handshake(TlsError::Rejected(ref reply))) if reply.code() == 534
    ));
    assert_eq!(h.client.reply().await.0, 234);
    assert!(!h.ctx.session.is_secure());
    assert!(!h.ctx.channel.is_open());
    assert!(h.client.at_eof().await);
}

// -- dispatch and login ----------------------------------------------------

#[tokio::test]
async fn test_unknown_command_is_502_before_and_after_login() {
    let dir = TempDir::new().unwrap();
    let mut h = harness(&dir);

    assert_eq!(h.run("XYZZY").await.0, 502);
    h.login("alice").await;
    assert_eq!(h.run("XYZZY now").await.0, 502);
}

#[tokio::test]
async fn test_login_gate() {
    let dir = TempDir::new().unwrap();
    let mut h = harness(&dir);

    assert_eq!(h.run("PWD").await.0, 530);
    assert_eq!(h.run("SYST").await.0, 215);
    assert_eq!(h.run("PASS secret").await.0, 503);

    h.run("USER alice").await;
    assert_eq!(h.run("PASS wrong").await.0, 530);
    assert!(!h.ctx.session.is_logged_in());

    h.login("alice").await;
    assert_eq!(h.run("PWD").await.0, 257);
}

#[tokio::test]
async fn test_empty_line_gets_no_reply() {
    let dir = TempDir::new().unwrap();
    let mut h = harness(&dir);

    dispatch(&mut h.ctx, "\r\n").await.unwrap();
    assert_eq!(h.run("NOOP").await.0, 200);
}

#[tokio::test]
async fn test_extension_can_deny_login() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    server.registry.add("gate", Arc::new(DenyLogin)).unwrap();
    let mut h = Harness::new(server);

    assert_eq!(h.run("USER alice").await.0, 331);
    let (code, text) = h.run("PASS secret").await;
    assert_eq!(code, 530);
    assert_eq!(text, "Login denied.");
    assert!(!h.ctx.session.is_logged_in());
}

// -- rename ----------------------------------------------------------------

#[tokio::test]
async fn test_rnto_without_rnfr_is_503() {
    let dir = TempDir::new().unwrap();
    let mut h = harness(&dir);
    h.login("alice").await;

    assert_eq!(h.run("RNTO b.txt").await.0, 503);
}

#[tokio::test]
async fn test_pending_rename_survives_other_commands() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
    let mut h = harness(&dir);
    h.login("alice").await;

    assert_eq!(h.run("RNFR a.txt").await.0, 350);
    assert_eq!(h.run("NOOP").await.0, 200);
    assert_eq!(h.run("PWD").await.0, 257);
    assert_eq!(h.run("RNTO b.txt").await.0, 250);

    assert!(!dir.path().join("a.txt").exists());
    assert!(dir.path().join("b.txt").exists());
    assert_eq!(h.ctx.session.rename_state(), &RenameState::Idle);
}

#[tokio::test]
async fn test_failed_rnto_still_clears_pending_rename() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
    let mut h = harness(&dir);
    h.login("alice").await;

    assert_eq!(h.run("RNFR a.txt").await.0, 350);
    assert_eq!(h.run("RNTO missing/b.txt").await.0, 550);
    assert_eq!(h.run("RNTO b.txt").await.0, 503);
    assert!(dir.path().join("a.txt").exists());
}

// -- file actions ------------------------------------------------------------

#[tokio::test]
async fn test_mkd_needs_write_permission() {
    let dir = TempDir::new().unwrap();
    let mut h = harness(&dir);
    h.login("bob").await;

    assert_eq!(h.run("MKD blocked").await.0, 550);
    assert!(!dir.path().join("blocked").exists());
}

#[tokio::test]
async fn test_extension_deny_skips_the_action() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    server.registry.add("ro", Arc::new(ReadOnly)).unwrap();
    let mut h = Harness::new(server);
    h.login("alice").await;

    assert_eq!(h.run("MKD blocked").await.0, 550);
    assert!(!dir.path().join("blocked").exists());

    // Read-only commands are untouched.
    assert_eq!(h.run("CWD /").await.0, 250);
}

#[tokio::test]
async fn test_extension_can_take_over_mkd() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    server
        .registry
        .add("elsewhere", Arc::new(MkdirElsewhere { answer: true }))
        .unwrap();
    let mut h = Harness::new(server);
    h.login("alice").await;

    assert_eq!(h.run("MKD docs").await, (257, "\"/docs\" made elsewhere.".to_string()));
    assert!(!dir.path().join("docs").exists());
    assert_eq!(h.run("NOOP").await.0, 200);
}

#[tokio::test]
async fn test_silent_take_over_gets_200() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    server
        .registry
        .add("elsewhere", Arc::new(MkdirElsewhere { answer: false }))
        .unwrap();
    let mut h = Harness::new(server);
    h.login("alice").await;

    assert_eq!(h.run("MKD docs").await.0, 200);
    assert!(!dir.path().join("docs").exists());
}

#[tokio::test]
async fn test_end_hook_reply_replaces_success() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    server.registry.add("reword", Arc::new(RewordMkdir)).unwrap();
    let mut h = Harness::new(server);
    h.login("alice").await;

    assert_eq!(h.run("MKD docs").await, (250, "Directory registered.".to_string()));
    assert!(dir.path().join("docs").is_dir());
    // No 257 is left behind on the wire.
    assert_eq!(h.run("NOOP").await.0, 200);
}

#[tokio::test]
async fn test_mkd_then_rmd() {
    let dir = TempDir::new().unwrap();
    let mut h = harness(&dir);
    h.login("alice").await;

    let (code, text) = h.run("MKD docs").await;
    assert_eq!(code, 257);
    assert!(text.contains("\"/docs\""));
    assert!(dir.path().join("docs").is_dir());

    assert_eq!(h.run("MKD docs").await.0, 550);
    assert_eq!(h.run("RMD docs").await.0, 250);
    assert!(!dir.path().join("docs").exists());
}

#[tokio::test]
async fn test_dele_notifies_file_listeners() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("gone.txt"), b"x").unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    let recorder = Arc::new(RecordDeletes::default());
    server.notifier.add_file_listener(recorder.clone());
    let mut h = Harness::new(server);
    h.login("alice").await;

    assert_eq!(h.run("DELE gone.txt").await.0, 250);
    assert!(!dir.path().join("gone.txt").exists());
    assert_eq!(
        recorder.0.lock().unwrap().as_slice(),
        &[dir.path().join("gone.txt")]
    );

    assert_eq!(h.run("DELE gone.txt").await.0, 550);
    assert_eq!(recorder.0.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_end_hook_runs_before_listeners() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("gone.txt"), b"x").unwrap();
    let trace = Trace::default();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    server
        .registry
        .add("trace", Arc::new(TraceDeleteEnd(Arc::clone(&trace))))
        .unwrap();
    server
        .notifier
        .add_file_listener(Arc::new(TraceDeleteListener(Arc::clone(&trace))));
    let mut h = Harness::new(server);
    h.login("alice").await;

    assert_eq!(h.run("DELE gone.txt").await.0, 250);
    assert_eq!(
        trace.lock().unwrap().as_slice(),
        &["delete_end_hook", "listener"]
    );
}

#[tokio::test]
async fn test_stor_without_data_connection_is_425() {
    let dir = TempDir::new().unwrap();
    let mut h = harness(&dir);
    h.login("alice").await;

    assert_eq!(h.run("STOR x.bin").await.0, 425);
}

#[tokio::test]
async fn test_stor_over_passive_data_connection() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("hello.txt"), b"a much longer previous version").unwrap();
    let mut h = harness(&dir);
    h.login("alice").await;

    let (code, text) = h.run("PASV").await;
    assert_eq!(code, 227);
    let port = pasv_port(&text);

    let upload = async {
        let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        data.write_all(b"hello world").await.unwrap();
        data.shutdown().await.unwrap();
    };
    let (result, ()) = tokio::join!(dispatch(&mut h.ctx, "STOR hello.txt"), upload);
    result.unwrap();

    let (code, text) = h.client.reply().await;
    assert_eq!(code, 150);
    assert!(text.contains("/hello.txt"), "{}", text);
    assert!(!text.contains(&*dir.path().to_string_lossy()), "{}", text);
    assert_eq!(h.client.reply().await.0, 226);
    assert_eq!(
        std::fs::read(dir.path().join("hello.txt")).unwrap(),
        b"hello world"
    );
}

#[tokio::test]
async fn test_failed_data_connection_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("keep.txt"), b"original").unwrap();
    let mut h = harness(&dir);
    h.login("alice").await;

    // A port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let port_line = format!("PORT 127,0,0,1,{},{}", port / 256, port % 256);
    assert_eq!(h.run(&port_line).await.0, 200);

    dispatch(&mut h.ctx, "STOR keep.txt").await.unwrap();
    assert_eq!(h.client.reply().await.0, 150);
    assert_eq!(h.client.reply().await.0, 425);
    assert_eq!(std::fs::read(dir.path().join("keep.txt")).unwrap(), b"original");
}

// -- SITE --------------------------------------------------------------------

#[tokio::test]
async fn test_site_extensions_is_admin_only() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    server.registry.add("ro", Arc::new(ReadOnly)).unwrap();

    let mut h = Harness::new(Arc::clone(&server));
    h.login("alice").await;
    assert_eq!(h.run("SITE EXTENSIONS").await.0, 530);

    let mut h = Harness::new(server);
    h.login("root").await;
    assert_eq!(h.run("SITE EXTENSIONS").await.0, 211);
    assert_eq!(h.run("SITE HELP").await.0, 214);
    assert_eq!(h.run("SITE BOGUS").await.0, 504);
    assert_eq!(h.run("SITE").await.0, 501);
}

// -- whole connections -------------------------------------------------------

#[tokio::test]
async fn test_connection_greets_and_quits() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    let counter = Arc::new(CountDisconnects::default());
    server.registry.add("count", counter.clone()).unwrap();

    let (client_side, server_side) = duplex(4096);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(handle_connection(
        Arc::clone(&server),
        Box::new(server_side),
        None,
        shutdown_rx,
    ));

    let mut client = Client::new(client_side);
    assert_eq!(client.reply().await.0, 220);
    client.send("NOOP").await;
    assert_eq!(client.reply().await.0, 200);
    client.send("QUIT").await;
    assert_eq!(client.reply().await.0, 221);
    assert!(client.at_eof().await);

    task.await.unwrap().unwrap();
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_denied_connection_gets_421() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());
    server.registry.add("wall", Arc::new(DenyConnect)).unwrap();
    let counter = Arc::new(CountDisconnects::default());
    server.registry.add("count", counter.clone()).unwrap();

    let (client_side, server_side) = duplex(4096);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(handle_connection(server, Box::new(server_side), None, shutdown_rx));

    let mut client = Client::new(client_side);
    assert_eq!(client.reply().await.0, 421);
    assert!(client.at_eof().await);

    task.await.unwrap().unwrap();
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shutdown_closes_idle_sessions() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());

    let (client_side, server_side) = duplex(4096);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(handle_connection(server, Box::new(server_side), None, shutdown_rx));

    let mut client = Client::new(client_side);
    assert_eq!(client.reply().await.0, 220);
    shutdown_tx.send(true).unwrap();
    assert_eq!(client.reply().await.0, 421);
    assert!(client.at_eof().await);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_overlong_line_is_refused_and_session_continues() {
    let dir = TempDir::new().unwrap();
    let server = server_context(dir.path(), FakeTransportFactory::configured());

    let (client_side, server_side) = duplex(4096);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(handle_connection(server, Box::new(server_side), None, shutdown_rx));

    let mut client = Client::new(client_side);
    assert_eq!(client.reply().await.0, 220);
    client.send(&format!("USER {}", "a".repeat(64 * 1024))).await;
    assert_eq!(client.reply().await.0, 500);
    client.send("NOOP").await;
    assert_eq!(client.reply().await.0, 200);
    client.send("QUIT").await;
    assert_eq!(client.reply().await.0, 221);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_a_stuck_transfer() {
    let dir = TempDir::new().unwrap();
    let server = server_context_with(dir.path(), FakeTransportFactory::configured(), |config| {
        config.server.shutdown_grace_secs = 0;
    });
    let counter = Arc::new(CountDisconnects::default());
    server.registry.add("count", counter.clone()).unwrap();

    let (client_side, server_side) = duplex(4096);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(handle_connection(
        Arc::clone(&server),
        Box::new(server_side),
        None,
        shutdown_rx,
    ));

    let mut client = Client::new(client_side);
    assert_eq!(client.reply().await.0, 220);
    client.send("USER alice").await;
    assert_eq!(client.reply().await.0, 331);
    client.send("PASS secret").await;
    assert_eq!(client.reply().await.0, 230);
    client.send("PASV").await;
    assert_eq!(client.reply().await.0, 227);

    // Nobody connects to the passive port, so STOR waits for its data.
    client.send("STOR stuck.bin").await;
    assert_eq!(client.reply().await.0, 150);

    shutdown_tx.send(true).unwrap();
    assert_eq!(client.reply().await.0, 421);
    assert!(client.at_eof().await);

    task.await.unwrap().unwrap();
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    let snapshot = server.statistics.snapshot();
    assert_eq!(snapshot.logouts, 1);
    assert_eq!(snapshot.current_connections, 0);
}

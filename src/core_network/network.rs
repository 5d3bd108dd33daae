use crate::constants::{DEFAULT_BANNER, SHUTDOWN_TEARDOWN_SECS};
use crate::core_extension::{FtpEvent, Outcome};
use crate::core_ftpcommand::context::CommandContext;
use crate::core_ftpcommand::dispatch::dispatch;
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_listener::StatisticsEvent;
use crate::core_network::control::{ControlChannel, LineRead};
use crate::core_tls::BoxedTransport;
use crate::server::ServerContext;
use crate::session::Session;
use anyhow::Result;
use chrono::Local;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{error::Elapsed, timeout};

/// Accepts control connections until `shutdown` flips, one task each.
///
/// Open connections get `shutdown_grace_secs` to finish their current
/// command, then are stopped and torn down. A task is aborted only when its
/// teardown overruns [`SHUTDOWN_TEARDOWN_SECS`] on top of that.
pub async fn start_server(
    server: Arc<ServerContext>,
    listener: TcpListener,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    info!("Server listening on {}", listener.local_addr()?);
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((socket, addr)) => {
                    info!("New connection from {}", addr);
                    let server = Arc::clone(&server);
                    let shutdown = shutdown.clone();
                    connections.spawn(async move {
                        if let Err(e) = handle_connection(server, Box::new(socket), Some(addr), shutdown).await {
                            warn!("Connection error for {}: {}", addr, e);
                        }
                        info!("Connection closed for {}", addr);
                    });
                }
                Err(e) => error!("Failed to accept connection: {}", e),
            },
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    error!("Connection task failed: {}", e);
                }
            }
            _ = shutdown.changed() => {
                info!("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    let grace = server.config.server.shutdown_grace_secs;
    let drain = async { while connections.join_next().await.is_some() {} };
    if timeout(Duration::from_secs(grace + SHUTDOWN_TEARDOWN_SECS), drain)
        .await
        .is_err()
    {
        warn!("Aborting {} connection(s) still open", connections.len());
        connections.abort_all();
    }
    Ok(())
}

enum Next {
    Line(Result<std::io::Result<LineRead>, Elapsed>),
    Shutdown,
}

/// Runs one control connection from banner to teardown.
///
/// The disconnect interception point and the session teardown run exactly
/// once, whichever way the command loop ends. A command still running
/// `shutdown_grace_secs` after shutdown is dropped so teardown can run.
pub async fn handle_connection(
    server: Arc<ServerContext>,
    transport: BoxedTransport,
    client_addr: Option<SocketAddr>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), FtpError> {
    server
        .notifier
        .statistics_event(StatisticsEvent::Connection)
        .await;

    let session = Session::new(client_addr);
    debug!("Session {} created for {:?}", session.id(), client_addr);
    let mut ctx = CommandContext::new(server, session, ControlChannel::new(transport));

    let grace = Duration::from_secs(ctx.server.config.server.shutdown_grace_secs);
    let mut deadline = shutdown.clone();
    let served = {
        let serving = serve(&mut ctx, &mut shutdown);
        tokio::pin!(serving);
        tokio::select! {
            result = &mut serving => Some(result),
            () = forced_stop(&mut deadline, grace) => None,
        }
    };

    let result = match served {
        Some(result) => result,
        None => {
            warn!(
                "Session {}: still busy {}s after shutdown, stopping it",
                ctx.session.id(),
                grace.as_secs()
            );
            if let Err(e) = ctx.reply(FtpReply::new(421, "Server is shutting down.")).await {
                debug!("Session {}: goodbye not delivered: {}", ctx.session.id(), e);
            }
            Ok(())
        }
    };
    end_session(&mut ctx).await;
    result
}

/// Completes `grace` after the shutdown flag is raised. Never completes if
/// the server goes away without raising it.
async fn forced_stop(shutdown: &mut watch::Receiver<bool>, grace: Duration) {
    let raised = shutdown.wait_for(|stopping| *stopping).await.is_ok();
    if !raised {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

async fn serve(ctx: &mut CommandContext, shutdown: &mut watch::Receiver<bool>) -> Result<(), FtpError> {
    if !greet(ctx).await? {
        return Ok(());
    }

    let idle = Duration::from_secs(ctx.server.config.server.idle_timeout_secs);
    let mut line = String::new();
    loop {
        let stopping = *shutdown.borrow();
        if stopping {
            ctx.reply(FtpReply::new(421, "Server is shutting down.")).await?;
            return Ok(());
        }

        line.clear();
        let next = tokio::select! {
            read = timeout(idle, ctx.channel.read_line(&mut line)) => Next::Line(read),
            Ok(()) = shutdown.changed() => Next::Shutdown,
        };

        match next {
            Next::Shutdown => {
                info!("Session {}: closing for server shutdown", ctx.session.id());
                ctx.reply(FtpReply::new(421, "Server is shutting down.")).await?;
                return Ok(());
            }
            Next::Line(Err(_)) => {
                info!("Session {}: idle timeout", ctx.session.id());
                ctx.reply(FtpReply::new(421, "Idle timeout, closing control connection."))
                    .await?;
                return Ok(());
            }
            Next::Line(Ok(Err(e))) => return Err(e.into()),
            Next::Line(Ok(Ok(LineRead::Eof))) => {
                debug!("Session {}: client closed the connection", ctx.session.id());
                return Ok(());
            }
            Next::Line(Ok(Ok(LineRead::TooLong))) => {
                warn!("Session {}: dropped an overlong command line", ctx.session.id());
                ctx.reply(FtpReply::new(500, "Command line too long.")).await?;
                continue;
            }
            Next::Line(Ok(Ok(LineRead::Line(_)))) => {}
        }

        dispatch(ctx, &line).await?;
        if ctx.session.quit_requested() {
            return Ok(());
        }
    }
}

/// Runs the connect interception point and sends the banner. Returns
/// `false` when an extension refused the connection.
async fn greet(ctx: &mut CommandContext) -> Result<bool, FtpError> {
    let outcome = ctx.intercept(FtpEvent::Connect);
    let sent = ctx.flush_replies().await?;

    match outcome {
        Outcome::Deny => {
            info!("Session {}: connection refused by extension", ctx.session.id());
            if sent == 0 {
                ctx.reply(FtpReply::with_detail(421, "CONNECT")).await?;
            }
            Ok(false)
        }
        Outcome::AlreadyHandled if sent > 0 => Ok(true),
        _ => {
            let banner = ctx
                .server
                .config
                .server
                .banner
                .clone()
                .unwrap_or_else(|| DEFAULT_BANNER.to_string());
            ctx.reply(FtpReply::new(220, banner)).await?;
            Ok(true)
        }
    }
}

async fn end_session(ctx: &mut CommandContext) {
    if !ctx.session.is_live() {
        return;
    }

    let outcome = ctx.intercept(FtpEvent::Disconnect);
    if outcome != Outcome::Default {
        debug!("Session {}: disconnect returned {:?}", ctx.session.id(), outcome);
    }
    let discarded = ctx.session.take_replies();
    if !discarded.is_empty() {
        debug!(
            "Session {}: dropping {} reply(ies) queued on disconnect",
            ctx.session.id(),
            discarded.len()
        );
    }

    if let Some(since) = ctx.session.login_time() {
        debug!(
            "Session {}: logging out user logged in since {}",
            ctx.session.id(),
            since.format("%Y-%m-%d %H:%M:%S")
        );
        ctx.server
            .notifier
            .statistics_event(StatisticsEvent::Logout)
            .await;
    }
    ctx.server.statistics.connection_closed();
    ctx.session.close();
    ctx.channel.shutdown().await;
    let lasted = Local::now() - ctx.session.connected_at();
    info!(
        "Session {} ended after {}s",
        ctx.session.id(),
        lasted.num_seconds()
    );
}

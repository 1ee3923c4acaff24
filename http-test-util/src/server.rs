//! A local HTTP target answering with a programmable sequence of status codes.
//!
//! Requests get an arrival index from a [`SharedCounter`], and the
//! [`StatusPlan`] maps that index to the status of the response. Paths can also
//! be set up to redirect elsewhere. The server runs on the ambient tokio runtime
//! until the [`TargetServer`] is dropped.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, LOCATION};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::{byte_body, SharedCounter};

const TARGET_BODY: &[u8] = b"load test target\n";

/// Decides how the target answers.
///
/// Requests to a path registered with [`StatusPlan::with_redirect`] get that
/// redirect. Every other request claims an arrival index and is answered with
/// the status the plan picks for it.
#[derive(Clone)]
pub struct StatusPlan {
    pick: Arc<dyn Fn(usize) -> StatusCode + Send + Sync>,
    redirects: Arc<Vec<Redirect>>,
}

#[derive(Clone)]
struct Redirect {
    from: String,
    status: StatusCode,
    location: String,
}

impl StatusPlan {
    fn from_fn(pick: impl Fn(usize) -> StatusCode + Send + Sync + 'static) -> Self {
        Self {
            pick: Arc::new(pick),
            redirects: Arc::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn always(status: StatusCode) -> Self {
        Self::from_fn(move |_| status)
    }

    /// `first` for the first `count` requests, `rest` afterwards.
    #[must_use]
    pub fn first_then(count: usize, first: StatusCode, rest: StatusCode) -> Self {
        Self::from_fn(move |idx| if idx < count { first } else { rest })
    }

    /// Answers requests for `from` with `status` and a `Location: location` header.
    #[must_use]
    pub fn with_redirect(self, from: &str, status: StatusCode, location: &str) -> Self {
        let mut redirects = (*self.redirects).clone();
        redirects.push(Redirect {
            from: from.to_owned(),
            status,
            location: location.to_owned(),
        });
        Self {
            pick: self.pick,
            redirects: Arc::new(redirects),
        }
    }

    #[inline]
    #[must_use]
    pub fn status_for(&self, index: usize) -> StatusCode {
        (self.pick)(index)
    }

    fn redirect_for(&self, path: &str) -> Option<&Redirect> {
        self.redirects.iter().find(|r| r.from == path)
    }
}

#[derive(Clone, Default)]
struct Counters {
    served: SharedCounter,
    redirected: SharedCounter,
}

pub struct TargetServer {
    addr: SocketAddr,
    counters: Counters,
    accept_loop: JoinHandle<()>,
}

impl TargetServer {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Requests answered by the status plan so far.
    #[must_use]
    pub fn served(&self) -> usize {
        self.counters.served.get()
    }

    /// Requests answered with a redirect so far.
    #[must_use]
    pub fn redirected(&self) -> usize {
        self.counters.redirected.get()
    }
}

impl Drop for TargetServer {
    fn drop(&mut self) {
        self.accept_loop.abort();
    }
}

/// Binds an ephemeral port on loopback and starts serving `plan`.
pub async fn spawn_target(plan: StatusPlan) -> anyhow::Result<TargetServer> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind target listener")?;
    let addr = listener
        .local_addr()
        .context("Failed to read target listener address")?;
    let counters = Counters::default();
    let accept_loop = tokio::spawn(run_accept_loop(listener, plan, counters.clone()));
    tracing::debug!(%addr, "Target server listening");
    Ok(TargetServer {
        addr,
        counters,
        accept_loop,
    })
}

async fn run_accept_loop(listener: TcpListener, plan: StatusPlan, counters: Counters) {
    loop {
        let (tcp, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to accept connection");
                continue;
            }
        };
        let tcp = TokioIo::new(tcp);
        let plan = plan.clone();
        let counters = counters.clone();
        tokio::task::spawn(async move {
            let service = service_fn(move |req| respond(plan.clone(), counters.clone(), req));
            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(tcp, service)
                .await
            {
                tracing::debug!(%peer, error = %e, "Connection ended with error");
            }
        });
    }
}

async fn respond(
    plan: StatusPlan,
    counters: Counters,
    incoming: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let mut resp = Response::new(byte_body(TARGET_BODY));
    if let Some(redirect) = plan.redirect_for(incoming.uri().path()) {
        counters.redirected.claim();
        *resp.status_mut() = redirect.status;
        if let Ok(location) = HeaderValue::from_str(&redirect.location) {
            resp.headers_mut().insert(LOCATION, location);
        }
        return Ok(resp);
    }
    *resp.status_mut() = plan.status_for(counters.served.claim());
    Ok(resp)
}

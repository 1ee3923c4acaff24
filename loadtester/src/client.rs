use std::future::Future;

use anyhow::{anyhow, bail, Context, Result};
use bytes::Bytes;
use http_body_util::Full;
use http_test_util::drain::DrainBodyFuture;
use http_test_util::empty_body;
use hyper::header::LOCATION;
use hyper::{Request, Response, StatusCode, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

/// Requests issued for one `get`, the first one included, before giving up on
/// a redirect chain.
pub const MAX_REQUESTS_PER_GET: usize = 10;

/// One `GET` against a target, resolving to the status of the response.
///
/// An `Err` means no response was obtained at all (refused connection, DNS
/// failure, broken transport). Implementors are shared by every worker of a run.
pub trait HttpGet: Clone + Send + Sync + 'static {
    fn get(&self, uri: &Uri) -> impl Future<Output = Result<StatusCode>> + Send;
}

/// hyper client speaking plain http and https (rustls, webpki roots).
///
/// Redirects (301, 302, 303, 307, 308) are followed, the reported status is the
/// one of the last response.
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        let https = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
            .context("Failed to set up tls")?
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);
        let client = Client::builder(TokioExecutor::new()).build(https);
        Ok(Self { client })
    }
}

impl HttpGet for HttpClient {
    fn get(&self, uri: &Uri) -> impl Future<Output = Result<StatusCode>> + Send {
        let client = self.client.clone();
        let mut uri = uri.clone();
        async move {
            for _ in 0..MAX_REQUESTS_PER_GET {
                let request = Request::get(uri.clone())
                    .body(empty_body())
                    .context("Failed to build get")?;
                let resp = client
                    .request(request)
                    .await
                    .context("Failed to send request")?;
                let status = resp.status();
                let next = redirect_location(&uri, &resp);
                // The connection only goes back to the pool once the body is consumed.
                if let Err(e) = DrainBodyFuture::new(resp.into_body()).await {
                    tracing::debug!(%status, error = %e, "Response body ended early");
                }
                match next {
                    Some(next) => {
                        uri = next?;
                        tracing::trace!(%status, to = %uri, "Following redirect");
                    }
                    None => return Ok(status),
                }
            }
            bail!("Stopped after {MAX_REQUESTS_PER_GET} redirects")
        }
    }
}

#[inline]
fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// `None` if the response is final. A redirect without `Location` is final too.
fn redirect_location<B>(current: &Uri, resp: &Response<B>) -> Option<Result<Uri>> {
    if !is_redirect(resp.status()) {
        return None;
    }
    let location = resp.headers().get(LOCATION)?;
    Some(
        location
            .to_str()
            .context("Redirect location is not valid text")
            .and_then(|location| resolve_location(current, location)),
    )
}

/// Resolves a `Location` value against the uri that produced it.
fn resolve_location(base: &Uri, location: &str) -> Result<Uri> {
    let scheme = base.scheme_str().unwrap_or("http");
    let authority = base
        .authority()
        .ok_or_else(|| anyhow!("Cannot resolve {location:?} against {base}"))?;
    let resolved = if location.contains("://") {
        location.to_owned()
    } else if location.starts_with("//") {
        format!("{scheme}:{location}")
    } else if location.starts_with('/') {
        format!("{scheme}://{authority}{location}")
    } else {
        let path = base.path();
        let dir = path.rfind('/').map_or("/", |idx| &path[..=idx]);
        format!("{scheme}://{authority}{dir}{location}")
    };
    resolved
        .parse()
        .with_context(|| format!("Invalid redirect location {location:?}"))
}

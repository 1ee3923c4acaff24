use bytes::Buf;
use hyper::body::Body;
use pin_project_lite::pin_project;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Polls a body until its last frame, discarding data and counting the bytes seen.
    pub struct DrainBodyFuture<B: Body> {
        #[pin]
        body: B,
        drained: usize,
    }
}

impl<B> DrainBodyFuture<B>
where
    B: Body,
{
    #[inline]
    #[must_use]
    pub fn new(body: B) -> Self {
        Self { body, drained: 0 }
    }
}

impl<B> Future for DrainBodyFuture<B>
where
    B: Body,
    B::Error: Display,
{
    type Output = Result<usize, anyhow::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slf = self.project();
        // Keep polling while frames are ready, only a `Pending` registers the waker.
        loop {
            match slf.body.as_mut().poll_frame(cx) {
                Poll::Ready(Some(Ok(frame))) => {
                    if let Some(data) = frame.data_ref() {
                        *slf.drained += data.remaining();
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Err(anyhow::anyhow!("Failed to poll next frame: {e}")));
                }
                Poll::Ready(None) => return Poll::Ready(Ok(*slf.drained)),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DrainBodyFuture;
    use crate::{byte_body, empty_body};
    use bytes::Bytes;
    use futures_util::stream;
    use http_body_util::StreamBody;
    use hyper::body::Frame;
    use hyper::HeaderMap;
    use std::convert::Infallible;
    use std::io;

    #[tokio::test]
    async fn drains_every_frame_of_a_chunked_body() {
        let frames = vec![
            Ok::<_, Infallible>(Frame::data(Bytes::from_static(b"abc"))),
            Ok(Frame::data(Bytes::from_static(b"defgh"))),
            Ok(Frame::data(Bytes::from_static(b"ij"))),
            Ok(Frame::trailers(HeaderMap::new())),
        ];
        let body = StreamBody::new(stream::iter(frames));
        let drained = DrainBodyFuture::new(body).await.unwrap();
        assert_eq!(drained, 10);
    }

    #[tokio::test]
    async fn failing_frame_ends_the_drain_with_an_error() {
        let frames = vec![
            Ok(Frame::data(Bytes::from_static(b"abc"))),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let body = StreamBody::new(stream::iter(frames));
        let err = DrainBodyFuture::new(body).await.unwrap_err();
        assert!(err.to_string().contains("reset"));
    }

    #[tokio::test]
    async fn counts_every_byte_of_a_full_body() {
        let drained = DrainBodyFuture::new(byte_body("hello world")).await.unwrap();
        assert_eq!(drained, 11);
    }

    #[tokio::test]
    async fn empty_body_drains_to_zero() {
        let drained = DrainBodyFuture::new(empty_body()).await.unwrap();
        assert_eq!(drained, 0);
    }
}

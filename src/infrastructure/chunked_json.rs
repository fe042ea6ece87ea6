// Chunked JSON streaming utilities
use crate::infrastructure::json_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;

/// Create a chunked streaming response where every message is one
/// length-prefixed JSON chunk
pub async fn chunked_json_stream<S, T>(
    stream: S,
    compress: bool,
) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(&msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // Chunks are compressed individually, so no Content-Encoding header here.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson-chunked")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize one message: 4-byte big-endian length, then the payload
pub async fn serialize_chunk<T: Serialize>(msg: &T, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(msg).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(&json).await?
    } else {
        json
    };

    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(payload.len() as u32);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver<T>(
    mut rx: tokio::sync::mpsc::Receiver<T>,
    compress: bool,
) -> impl IntoResponse
where
    T: Serialize + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_chunk_is_length_prefixed() {
        let chunk = serialize_chunk(&json!({ "type": "complete" }), false)
            .await
            .unwrap();

        let len = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(len, chunk.len() - 4);
        assert_eq!(&chunk[4..], br#"{"type":"complete"}"#);
    }

    #[tokio::test]
    async fn test_receiver_stream_concatenates_chunks() {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tx.send(json!({ "n": 1 })).await.unwrap();
        tx.send(json!({ "n": 2 })).await.unwrap();
        drop(tx);

        let response = stream_from_receiver(rx, false).await.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let first = serialize_chunk(&json!({ "n": 1 }), false).await.unwrap();
        let second = serialize_chunk(&json!({ "n": 2 }), false).await.unwrap();
        assert_eq!(body.len(), first.len() + second.len());
        assert_eq!(&body[..first.len()], &first[..]);
    }
}

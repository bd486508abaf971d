//! Thin JSON-over-HTTP layer shared by both backends.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::envelope;
use crate::error::{ApiError, ApiResult};
use crate::models::Ack;
use crate::session::Session;

/// HTTP client bound to one base URL.
///
/// When built with a [`Session`], every request carries
/// `Authorization: Bearer <token>` while the session holds one, and a 403
/// clears the session.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    session: Option<Session>,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration, session: Option<Session>) -> ApiResult<Self> {
        let base_url = Url::parse(base_url.trim())?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL for `segments` below the base path. Segments are
    /// percent-encoded; an empty last segment yields a trailing slash.
    pub fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one request and normalize the envelope.
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
        list_key: Option<&str>,
    ) -> ApiResult<Value> {
        let url = self.url(segments)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.session.as_ref().and_then(Session::token) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(status = status.as_u16(), "{} {}", method, url);

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) if status.is_success() => return Err(ApiError::Decode(e)),
                Err(_) => Value::String(text),
            }
        };

        let result = envelope::normalize(status.as_u16(), body, list_key);
        if let Err(ApiError::Forbidden) = &result {
            tracing::warn!("{} {} forbidden, clearing session", method, url);
            if let Some(session) = &self.session {
                session.clear();
            }
        }
        result
    }

    /// GET a list; an empty body is an empty list.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        list_key: Option<&str>,
    ) -> ApiResult<Vec<T>> {
        let value = self
            .execute::<()>(Method::GET, segments, query, None, list_key)
            .await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// GET a single record.
    pub async fn get_one<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let value = self
            .execute::<()>(Method::GET, segments, &[], None, None)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a mutating request and read its acknowledgement.
    pub async fn mutate<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ApiResult<Ack> {
        let value = self.execute(method, segments, &[], body, None).await?;
        Ok(ack_from(value))
    }
}

/// Mutations answer with anything from `{success, message}` to an empty body.
fn ack_from(value: Value) -> Ack {
    match value {
        Value::String(message) => Ack {
            message: Some(message),
        },
        Value::Object(object) => Ack {
            message: object
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        _ => Ack::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_keeps_base_path_and_encodes_segments() {
        let client = HttpClient::new("http://localhost:5000/api", Duration::from_secs(1), None).unwrap();
        assert_eq!(
            client.url(&["cliente", "nome", "Loja Centro"]).unwrap().as_str(),
            "http://localhost:5000/api/cliente/nome/Loja%20Centro"
        );
        assert_eq!(
            client.url(&["groups", ""]).unwrap().as_str(),
            "http://localhost:5000/api/groups/"
        );

        let client = HttpClient::new("http://localhost:3000/", Duration::from_secs(1), None).unwrap();
        assert_eq!(
            client.url(&["tintim", "listar"]).unwrap().as_str(),
            "http://localhost:3000/tintim/listar"
        );
    }

    #[test]
    fn rejects_bad_base() {
        assert!(HttpClient::new("not a url", Duration::from_secs(1), None).is_err());
    }

    #[test]
    fn ack_reads_message_when_present() {
        assert_eq!(ack_from(json!({"success": true, "message": "ok"})).message.as_deref(), Some("ok"));
        assert_eq!(ack_from(json!("Criado")).message.as_deref(), Some("Criado"));
        assert_eq!(ack_from(Value::Null), Ack::default());
    }
}

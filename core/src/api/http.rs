use super::{ApiError, ApiResult, EcgBackend};
use crate::model::{
    ActivePatient, ActivePatientsEnvelope, NewReading, ReadingEnvelope, ReadingsEnvelope, SaveAck,
    SessionStatus, SessionStatusUpdate, StoredReading,
};
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// REST implementation of the backend collaborators.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReadingsBody {
    Bare(Vec<StoredReading>),
    Wrapped(ReadingsEnvelope),
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl EcgBackend for HttpBackend {
    fn active_patients(&self) -> BoxFuture<'static, ApiResult<Vec<ActivePatient>>> {
        let request = self.client.get(self.url("ecg-readings/patients-active"));
        async move {
            let envelope: ActivePatientsEnvelope = send(request).await?;
            Ok(envelope.patients.unwrap_or_default())
        }
        .boxed()
    }

    fn update_session_status(
        &self,
        session_id: u64,
        status: SessionStatus,
    ) -> BoxFuture<'static, ApiResult<()>> {
        let request = self
            .client
            .put(self.url(&format!("ecg-sessions/{session_id}")))
            .json(&SessionStatusUpdate { status });
        async move {
            let _: Value = send(request).await?;
            Ok(())
        }
        .boxed()
    }

    fn create_reading(&self, reading: NewReading) -> BoxFuture<'static, ApiResult<SaveAck>> {
        let request = self.client.post(self.url("ecg-readings")).json(&reading);
        async move { send(request).await }.boxed()
    }

    fn reading(&self, id: u64) -> BoxFuture<'static, ApiResult<StoredReading>> {
        let request = self.client.get(self.url(&format!("ecg-readings/{id}")));
        async move {
            let envelope: ReadingEnvelope = send(request).await?;
            envelope
                .reading
                .ok_or_else(|| ApiError::NotFound("Reading not found.".into()))
        }
        .boxed()
    }

    fn readings(&self) -> BoxFuture<'static, ApiResult<Vec<StoredReading>>> {
        let request = self.client.get(self.url("ecg-readings"));
        async move {
            Ok(match send::<ReadingsBody>(request).await? {
                ReadingsBody::Bare(readings) => readings,
                ReadingsBody::Wrapped(envelope) => envelope.readings,
            })
        }
        .boxed()
    }
}

async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> ApiResult<T> {
    let response = request
        .send()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

/// Pulls `error` or `message` out of a JSON error body.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_reads_error_then_message() {
        assert_eq!(
            error_detail(r#"{"error": "missing session"}"#).as_deref(),
            Some("missing session")
        );
        assert_eq!(
            error_detail(r#"{"ok": false, "message": "bad count"}"#).as_deref(),
            Some("bad count")
        );
        assert_eq!(error_detail("<html>boom</html>"), None);
        assert_eq!(error_detail(r#"{"error": 5}"#), None);
    }

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let backend = HttpBackend::new("http://localhost:4000/api/");
        assert_eq!(
            backend.url("ecg-readings/7"),
            "http://localhost:4000/api/ecg-readings/7"
        );
    }

    #[test]
    fn readings_body_accepts_bare_and_wrapped_lists() {
        let bare: ReadingsBody =
            serde_json::from_str(r#"[{"id": 1, "ecg_session_id": 2}]"#).unwrap();
        assert!(matches!(bare, ReadingsBody::Bare(ref list) if list.len() == 1));
        let wrapped: ReadingsBody =
            serde_json::from_str(r#"{"readings": [{"id": 1, "ecg_session_id": 2}]}"#).unwrap();
        assert!(matches!(wrapped, ReadingsBody::Wrapped(ref env) if env.readings.len() == 1));
    }
}

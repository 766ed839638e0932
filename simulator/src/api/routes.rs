use super::store::{ClinicStore, StoreError};
use crate::generator::profile::GeneratorConfig;
use crate::workflow::config::SimulatorConfig;
use crate::workflow::feed::{block_stream, sse_events};
use anyhow::Context;
use ecgcore::model::{
    ActivePatientsEnvelope, NewReading, ReadingEnvelope, ReadingsEnvelope, SaveAck,
    SessionStatusUpdate,
};
use ecgcore::telemetry::LogManager;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::RwLock;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

pub type SharedStore = Arc<RwLock<ClinicStore>>;

#[derive(Debug, Deserialize)]
struct FeedQuery {
    device_id: Option<String>,
}

fn json_status<T: serde::Serialize>(body: &T, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

/// The `/api` surface the ECG core consumes.
pub fn routes(
    store: SharedStore,
    generator: GeneratorConfig,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let store_filter = warp::any().map(move || store.clone());
    let generator_filter = warp::any().map(move || generator.clone());
    let api = warp::path("api");

    let feed_route = api
        .and(warp::path!("ecgstream" / "stream"))
        .and(warp::get())
        .and(warp::query::<FeedQuery>())
        .and(generator_filter)
        .map(|query: FeedQuery, generator: GeneratorConfig| {
            LogManager::new("api").record(&format!(
                "feed opened (device {})",
                query.device_id.as_deref().unwrap_or("any")
            ));
            let events = sse_events(block_stream(generator, query.device_id));
            warp::sse::reply(warp::sse::keep_alive().stream(events))
        });

    let patients_route = api
        .and(warp::path!("ecg-readings" / "patients-active"))
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(|store: SharedStore| async move {
            let patients = store.read().await.active_patients();
            Ok::<_, Rejection>(json_status(
                &ActivePatientsEnvelope {
                    patients: Some(patients),
                },
                StatusCode::OK,
            ))
        });

    let session_route = api
        .and(warp::path!("ecg-sessions" / u64))
        .and(warp::put())
        .and(warp::body::json())
        .and(store_filter.clone())
        .and_then(
            |session_id: u64, update: SessionStatusUpdate, store: SharedStore| async move {
                let reply = match store.write().await.update_session(session_id, update.status) {
                    Ok(()) => json_status(&json!({"ok": true}), StatusCode::OK),
                    Err(err) => json_status(&json!({"error": err.to_string()}), StatusCode::NOT_FOUND),
                };
                Ok::<_, Rejection>(reply)
            },
        );

    let create_route = api
        .and(warp::path!("ecg-readings"))
        .and(warp::post())
        .and(warp::body::json())
        .and(store_filter.clone())
        .and_then(|reading: NewReading, store: SharedStore| async move {
            let reply = match store.write().await.create_reading(reading) {
                Ok(stored) => {
                    LogManager::new("api").record(&format!(
                        "reading {} stored for session {}",
                        stored.id, stored.session_id
                    ));
                    json_status(
                        &SaveAck {
                            ok: true,
                            message: None,
                            reading: Some(stored),
                        },
                        StatusCode::CREATED,
                    )
                }
                Err(err) => {
                    let status = match err {
                        StoreError::UnknownSession(_) => StatusCode::NOT_FOUND,
                        StoreError::InvalidRecordCount => StatusCode::BAD_REQUEST,
                        StoreError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    };
                    json_status(
                        &SaveAck {
                            ok: false,
                            message: Some(err.to_string()),
                            reading: None,
                        },
                        status,
                    )
                }
            };
            Ok::<_, Rejection>(reply)
        });

    let reading_route = api
        .and(warp::path!("ecg-readings" / u64))
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(|id: u64, store: SharedStore| async move {
            let reply = match store.read().await.reading(id) {
                Some(reading) => json_status(
                    &ReadingEnvelope {
                        reading: Some(reading.clone()),
                    },
                    StatusCode::OK,
                ),
                None => json_status(
                    &json!({"error": "Reading not found."}),
                    StatusCode::NOT_FOUND,
                ),
            };
            Ok::<_, Rejection>(reply)
        });

    let list_route = api
        .and(warp::path!("ecg-readings"))
        .and(warp::get())
        .and(store_filter)
        .and_then(|store: SharedStore| async move {
            let readings = store.read().await.readings();
            Ok::<_, Rejection>(json_status(&ReadingsEnvelope { readings }, StatusCode::OK))
        });

    feed_route
        .or(patients_route)
        .or(session_route)
        .or(create_route)
        .or(reading_route)
        .or(list_route)
        .recover(handle_rejection)
        .with(warp::log("ecg_simulator::api"))
}

async fn handle_rejection(err: Rejection) -> Result<WithStatus<Json>, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(body) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, body.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        LogManager::new("api").error(&format!("unhandled rejection: {err:?}"));
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
    };
    Ok(json_status(&json!({ "error": message }), status))
}

/// Serves until Ctrl+C.
pub async fn serve(config: SimulatorConfig) -> anyhow::Result<()> {
    let logger = LogManager::new("api");
    let store = Arc::new(RwLock::new(ClinicStore::new(config.patients.clone())));
    let (addr, server) = warp::serve(routes(store, config.generator.clone()))
        .try_bind_with_graceful_shutdown(config.bind, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                LogManager::new("api").error(&format!("awaiting Ctrl+C failed: {err}"));
            }
        })
        .with_context(|| format!("binding simulator to {}", config.bind))?;

    logger.record(&format!("serving ECG simulator on http://{addr}/api (Ctrl+C to stop)"));
    server.await;
    logger.record("simulator stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::fixture_patients;
    use ecgcore::api::{EcgBackend, HttpBackend};
    use ecgcore::config::ReconnectPolicy;
    use ecgcore::model::SessionStatus;
    use ecgcore::processing::normalize_samples;
    use ecgcore::stream::{HttpFeedConnector, StreamClient};
    use futures::StreamExt;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::runtime::Handle;
    use tokio::time::timeout;

    fn store() -> SharedStore {
        Arc::new(RwLock::new(ClinicStore::new(fixture_patients())))
    }

    fn fast_generator() -> GeneratorConfig {
        GeneratorConfig {
            sampling_rate_hz: 500,
            block_size: 10,
            ..GeneratorConfig::default()
        }
    }

    fn body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn patients_lookup_lists_fixture_patients() {
        let api = routes(store(), fast_generator());
        let res = warp::test::request()
            .method("GET")
            .path("/api/ecg-readings/patients-active")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let json = body(res.body());
        assert_eq!(json["patients"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["patients"][0]["assigned_device"]["device_id"], "5001");
    }

    #[tokio::test]
    async fn session_update_changes_status_or_404s() {
        let shared = store();
        let api = routes(shared.clone(), fast_generator());
        let res = warp::test::request()
            .method("PUT")
            .path("/api/ecg-sessions/1")
            .json(&json!({"status": "stopped"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            shared.read().await.session_status(1),
            Some(&SessionStatus::Stopped)
        );

        let res = warp::test::request()
            .method("PUT")
            .path("/api/ecg-sessions/77")
            .json(&json!({"status": "stopped"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(body(res.body())["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn readings_round_trip_with_encoded_samples() {
        let api = routes(store(), fast_generator());
        let res = warp::test::request()
            .method("POST")
            .path("/api/ecg-readings")
            .json(&json!({
                "ecg_session_id": 1, "record_count": 3, "observations": "rest",
                "data": [0.1, 0.2, 0.3], "sample_rate": 250
            }))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created = body(res.body());
        assert_eq!(created["ok"], true);
        assert!(created["reading"]["data"].is_string());

        let res = warp::test::request()
            .path("/api/ecg-readings/1")
            .reply(&api)
            .await;
        let envelope: ReadingEnvelope = serde_json::from_slice(res.body()).unwrap();
        let reading = envelope.reading.unwrap();
        assert_eq!(normalize_samples(&reading.raw_samples()), vec![0.1, 0.2, 0.3]);

        let res = warp::test::request().path("/api/ecg-readings").reply(&api).await;
        assert_eq!(body(res.body())["readings"].as_array().map(Vec::len), Some(1));

        let res = warp::test::request()
            .path("/api/ecg-readings/404")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(res.body())["error"], "Reading not found.");
    }

    #[tokio::test]
    async fn invalid_readings_are_refused_with_a_message() {
        let api = routes(store(), fast_generator());
        let res = warp::test::request()
            .method("POST")
            .path("/api/ecg-readings")
            .json(&json!({
                "ecg_session_id": 1, "record_count": 0, "observations": "",
                "data": [], "sample_rate": 250
            }))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body(res.body());
        assert_eq!(json["ok"], false);
        assert!(json["message"].as_str().is_some());

        let res = warp::test::request()
            .method("POST")
            .path("/api/ecg-readings")
            .body("not json")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn core_clients_work_against_the_simulator() {
        let (addr, server) =
            warp::serve(routes(store(), fast_generator())).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        let base = format!("http://{addr}/api");

        let backend = HttpBackend::new(&base);
        let patients = backend.active_patients().await.unwrap();
        assert_eq!(patients.len(), 3);
        assert_eq!(patients[0].active_session_id(), Some(1));

        let mut client = StreamClient::new(
            Arc::new(HttpFeedConnector::new(&base)),
            ReconnectPolicy::default(),
            Handle::current(),
        );
        let mut blocks = Box::pin(client.blocks());
        client.connect(Some("5001".into()));
        let block = timeout(Duration::from_secs(5), blocks.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(block.device_id, "5001");
        assert_eq!(block.samples.len(), 10);
        client.disconnect();
        assert!(!client.is_connected());

        backend
            .update_session_status(1, SessionStatus::Stopped)
            .await
            .unwrap();
        let ack = backend
            .create_reading(NewReading {
                ecg_session_id: 1,
                record_count: 1,
                observations: String::new(),
                data: block.samples.clone(),
                sample_rate: 500,
            })
            .await
            .unwrap();
        assert!(ack.ok);
        let id = ack.reading.map(|reading| reading.id).unwrap();

        let stored = backend.reading(id).await.unwrap();
        assert_eq!(normalize_samples(&stored.raw_samples()).len(), 10);
        assert_eq!(backend.readings().await.unwrap().len(), 1);

        let missing = backend.reading(999).await.unwrap_err();
        assert_eq!(missing.user_message("fallback"), "Reading not found.");
    }
}

// src/web/mod.rs - HTTP surface over the job service

pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, patch, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

use crate::jobs::{Caller, JobService};
use crate::types::{Interview, InterviewDraft, Job, JobDraft, JobPatch};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/jobs?<refresh>")]
pub async fn list_jobs(
    caller: Caller,
    refresh: Option<bool>,
    service: &State<JobService>,
) -> Result<Json<DataResponse<Vec<crate::types::JobListing>>>, ApiError> {
    handlers::list_jobs_handler(caller, refresh.unwrap_or(false), service).await
}

#[get("/jobs/public?<refresh>")]
pub async fn list_public_jobs(
    refresh: Option<bool>,
    service: &State<JobService>,
) -> Result<Json<DataResponse<Vec<crate::types::JobListing>>>, ApiError> {
    handlers::list_public_jobs_handler(refresh.unwrap_or(false), service).await
}

#[post("/jobs", data = "<draft>")]
pub async fn create_job(
    caller: Caller,
    draft: Json<JobDraft>,
    service: &State<JobService>,
) -> Result<Json<DataResponse<Identified<Job>>>, ApiError> {
    handlers::create_job_handler(caller, draft, service).await
}

#[patch("/jobs/<job_id>", data = "<patch>")]
pub async fn update_job(
    caller: Caller,
    job_id: &str,
    patch: Json<JobPatch>,
    service: &State<JobService>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::update_job_handler(caller, job_id, patch, service).await
}

#[delete("/jobs/<job_id>")]
pub async fn delete_job(
    caller: Caller,
    job_id: &str,
    service: &State<JobService>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_job_handler(caller, job_id, service).await
}

#[post("/jobs/<job_id>/restore")]
pub async fn restore_job(
    caller: Caller,
    job_id: &str,
    service: &State<JobService>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::restore_job_handler(caller, job_id, service).await
}

#[post("/jobs/cleanup")]
pub async fn cleanup_jobs(
    caller: Caller,
    service: &State<JobService>,
) -> Result<Json<DataResponse<CleanupData>>, ApiError> {
    handlers::cleanup_handler(caller, service).await
}

#[get("/jobs/<job_id>/applicants/<applicant_id>/interviews")]
pub async fn list_interviews(
    caller: Caller,
    job_id: &str,
    applicant_id: &str,
    service: &State<JobService>,
) -> Result<Json<DataResponse<Vec<Identified<Interview>>>>, ApiError> {
    handlers::list_interviews_handler(caller, job_id, applicant_id, service).await
}

#[post("/jobs/<job_id>/applicants/<applicant_id>/interviews", data = "<draft>")]
pub async fn schedule_interview(
    caller: Caller,
    job_id: &str,
    applicant_id: &str,
    draft: Json<InterviewDraft>,
    service: &State<JobService>,
) -> Result<Json<DataResponse<Identified<Interview>>>, ApiError> {
    handlers::schedule_interview_handler(caller, job_id, applicant_id, draft, service).await
}

#[get("/health")]
pub async fn health(caller: Caller) -> Json<TextResponse> {
    handlers::health_handler(caller).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "BAD_REQUEST".to_string(),
        vec!["Verify field names and value types".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Rocket instance with all routes mounted under `/api`
pub fn build_rocket(service: JobService, port: u16) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .attach(Cors)
        .manage(service)
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                list_jobs,
                list_public_jobs,
                create_job,
                update_job,
                delete_job,
                restore_job,
                cleanup_jobs,
                list_interviews,
                schedule_interview,
                health,
                options,
            ],
        )
}

pub async fn start_web_server(service: JobService, port: u16) -> Result<()> {
    info!("Starting HR job API server on http://0.0.0.0:{}", port);

    build_rocket(service, port)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Web server failed: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DocumentStore, ManualClock, MemoryStore};
    use crate::jobs::JobSettings;
    use chrono::Utc;
    use rocket::http::{ContentType, Header};
    use rocket::local::asynchronous::Client;
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn client() -> (Client, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store
            .set("users/hr-1", json!({"universityId": "u1"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        let service = JobService::new(
            store.clone(),
            Arc::new(ManualClock::new(Utc::now())),
            JobSettings::default(),
        );
        let client = Client::tracked(build_rocket(service, 0)).await.unwrap();
        (client, store)
    }

    #[rocket::async_test]
    async fn test_post_list_and_trash_job() {
        let (client, _store) = client().await;

        let created = client
            .post("/api/jobs")
            .header(ContentType::JSON)
            .header(Header::new(USER_HEADER, "hr-1"))
            .body(
                json!({
                    "title": "Librarian",
                    "keyDuties": "Catalogue\nLend",
                    "availableSlots": 1,
                    "criteriaWeights": {"experience": 50, "skills": 30, "education": 20}
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(created.status(), Status::Ok);
        let body: Value = created.into_json().await.unwrap();
        let job_id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["keyDuties"], json!(["Catalogue", "Lend"]));

        let listed: Value = client
            .get("/api/jobs")
            .header(Header::new(USER_HEADER, "hr-1"))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(listed["data"][0]["id"], json!(job_id));
        assert_eq!(listed["data"][0]["postedLabel"], json!("Today"));

        let trashed = client
            .delete(format!("/api/jobs/{}", job_id))
            .header(Header::new(USER_HEADER, "hr-1"))
            .dispatch()
            .await;
        assert_eq!(trashed.status(), Status::Ok);

        let public: Value = client
            .get("/api/jobs/public")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(public["data"], json!([]));
    }

    #[rocket::async_test]
    async fn test_rejects_bad_weights_and_anonymous_writes() {
        let (client, store) = client().await;

        let rejected = client
            .post("/api/jobs")
            .header(ContentType::JSON)
            .header(Header::new(USER_HEADER, "hr-1"))
            .body(
                json!({
                    "title": "Librarian",
                    "availableSlots": 1,
                    "criteriaWeights": {"experience": 40, "skills": 30, "education": 20}
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(rejected.status(), Status::UnprocessableEntity);
        let body: Value = rejected.into_json().await.unwrap();
        assert_eq!(body["error_code"], json!("VALIDATION_ERROR"));
        assert!(store.list("jobs").await.unwrap().is_empty());

        let anonymous = client.delete("/api/jobs/j1").dispatch().await;
        assert_eq!(anonymous.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_unknown_job_is_404() {
        let (client, _store) = client().await;

        let missing = client
            .delete("/api/jobs/no-such-job")
            .header(Header::new(USER_HEADER, "hr-1"))
            .dispatch()
            .await;
        assert_eq!(missing.status(), Status::NotFound);
        let body: Value = missing.into_json().await.unwrap();
        assert_eq!(body["error_code"], json!("DELETE_ERROR"));

        let patched = client
            .patch("/api/jobs/no-such-job")
            .header(ContentType::JSON)
            .header(Header::new(USER_HEADER, "hr-1"))
            .body(json!({"salary": 52000}).to_string())
            .dispatch()
            .await;
        assert_eq!(patched.status(), Status::NotFound);
    }
}

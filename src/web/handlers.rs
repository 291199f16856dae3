// src/web/handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use crate::jobs::{Caller, JobError, JobService};
use crate::types::{Interview, InterviewDraft, Job, JobDraft, JobListing, JobPatch};
use crate::web::types::*;

type JobsResult = Result<Json<DataResponse<Vec<JobListing>>>, ApiError>;

fn failure(e: anyhow::Error, error_code: &str, suggestions: &[&str]) -> ApiError {
    let message = format!("{:#}", e);
    let status = if JobError::find(&e).is_some() {
        Status::NotFound
    } else if error_code == "VALIDATION_ERROR" {
        Status::UnprocessableEntity
    } else {
        Status::InternalServerError
    };
    error!("{} ({}): {}", error_code, status, message);
    api_error(status, message, error_code, suggestions)
}

async fn require_tenant(service: &JobService, caller: &Caller) -> Result<String, ApiError> {
    if *caller == Caller::Anonymous {
        return Err(api_error(
            Status::Unauthorized,
            "Authentication required".to_string(),
            "AUTHENTICATION_ERROR",
            &["Send the X-User-Id header set by the gateway"],
        ));
    }

    match service.resolve_tenant(caller).await {
        Ok(Some(tenant)) => Ok(tenant),
        Ok(None) => Err(api_error(
            Status::Forbidden,
            "No university is linked to this account".to_string(),
            "TENANT_ERROR",
            &["Ask an administrator to link your account to a university"],
        )),
        Err(e) => Err(failure(e, "TENANT_ERROR", &["Try again in a few moments"])),
    }
}

/// Tenant for read paths: a signed-in user without one falls back to the
/// global list, as the resolver logs.
async fn optional_tenant(service: &JobService, caller: &Caller) -> Result<Option<String>, ApiError> {
    service
        .resolve_tenant(caller)
        .await
        .map_err(|e| failure(e, "TENANT_ERROR", &["Try again in a few moments"]))
}

fn listing_response(jobs: &[JobListing]) -> Json<DataResponse<Vec<JobListing>>> {
    Json(DataResponse::success(
        format!("{} jobs", jobs.len()),
        jobs.to_vec(),
    ))
}

pub async fn list_jobs_handler(
    caller: Caller,
    refresh: bool,
    service: &State<JobService>,
) -> JobsResult {
    if caller == Caller::Anonymous {
        return Err(api_error(
            Status::Unauthorized,
            "Authentication required".to_string(),
            "AUTHENTICATION_ERROR",
            &["Use /api/jobs/public for the unscoped listing"],
        ));
    }
    let tenant = optional_tenant(service, &caller).await?;

    service
        .jobs(tenant.as_deref(), refresh)
        .await
        .map(|jobs| listing_response(&jobs))
        .map_err(|e| failure(e, "FETCH_ERROR", &["Retry with ?refresh=true"]))
}

pub async fn list_public_jobs_handler(refresh: bool, service: &State<JobService>) -> JobsResult {
    service
        .jobs(None, refresh)
        .await
        .map(|jobs| listing_response(&jobs))
        .map_err(|e| failure(e, "FETCH_ERROR", &["Retry with ?refresh=true"]))
}

pub async fn create_job_handler(
    caller: Caller,
    draft: Json<JobDraft>,
    service: &State<JobService>,
) -> Result<Json<DataResponse<Identified<Job>>>, ApiError> {
    let tenant = require_tenant(service, &caller).await?;
    let draft = draft.into_inner();
    if let Err(e) = draft.validate() {
        return Err(failure(e, "VALIDATION_ERROR", &["Criteria weights must total 100"]));
    }

    let job = service
        .create_job(Some(&tenant), draft)
        .await
        .map_err(|e| failure(e, "CREATE_ERROR", &["Try again in a few moments"]))?;

    info!("Job {} posted by tenant {}", job.id, tenant);
    Ok(Json(DataResponse::success(
        format!("Job '{}' posted", job.title),
        Identified::new(job.id.clone(), job),
    )))
}

pub async fn update_job_handler(
    caller: Caller,
    job_id: &str,
    patch: Json<JobPatch>,
    service: &State<JobService>,
) -> Result<Json<ActionResponse>, ApiError> {
    let tenant = require_tenant(service, &caller).await?;
    if let Err(e) = patch.validate() {
        return Err(failure(e, "VALIDATION_ERROR", &["Check the submitted fields"]));
    }

    service
        .update_job(Some(&tenant), job_id, &patch)
        .await
        .map_err(|e| failure(e, "UPDATE_ERROR", &["Reload the job list and retry"]))?;

    Ok(Json(ActionResponse::success(
        format!("Job {} updated", job_id),
        "update".to_string(),
    )))
}

pub async fn delete_job_handler(
    caller: Caller,
    job_id: &str,
    service: &State<JobService>,
) -> Result<Json<ActionResponse>, ApiError> {
    let tenant = require_tenant(service, &caller).await?;

    service
        .soft_delete_job(Some(&tenant), job_id)
        .await
        .map_err(|e| failure(e, "DELETE_ERROR", &["Reload the job list and retry"]))?;

    Ok(Json(ActionResponse::success(
        format!("Job {} moved to trash", job_id),
        "soft_delete".to_string(),
    )))
}

pub async fn restore_job_handler(
    caller: Caller,
    job_id: &str,
    service: &State<JobService>,
) -> Result<Json<ActionResponse>, ApiError> {
    let tenant = require_tenant(service, &caller).await?;

    service
        .restore_job(Some(&tenant), job_id)
        .await
        .map_err(|e| failure(e, "RESTORE_ERROR", &["Jobs can only be restored before they are purged"]))?;

    Ok(Json(ActionResponse::success(
        format!("Job {} restored", job_id),
        "restore".to_string(),
    )))
}

pub async fn cleanup_handler(
    caller: Caller,
    service: &State<JobService>,
) -> Result<Json<DataResponse<CleanupData>>, ApiError> {
    require_tenant(service, &caller).await?;

    let purged = service
        .cleanup_expired()
        .await
        .map_err(|e| failure(e, "CLEANUP_ERROR", &["Try again in a few moments"]))?;

    Ok(Json(DataResponse::success(
        format!("{} expired jobs purged", purged),
        CleanupData { purged },
    )))
}

pub async fn list_interviews_handler(
    caller: Caller,
    job_id: &str,
    applicant_id: &str,
    service: &State<JobService>,
) -> Result<Json<DataResponse<Vec<Identified<Interview>>>>, ApiError> {
    let tenant = require_tenant(service, &caller).await?;

    let interviews = service
        .list_interviews(&tenant, job_id, applicant_id)
        .await
        .map_err(|e| failure(e, "FETCH_ERROR", &["Try again in a few moments"]))?;

    Ok(Json(DataResponse::success(
        format!("{} interviews", interviews.len()),
        interviews
            .into_iter()
            .map(|interview| Identified::new(interview.id.clone(), interview))
            .collect(),
    )))
}

pub async fn schedule_interview_handler(
    caller: Caller,
    job_id: &str,
    applicant_id: &str,
    draft: Json<InterviewDraft>,
    service: &State<JobService>,
) -> Result<Json<DataResponse<Identified<Interview>>>, ApiError> {
    let tenant = require_tenant(service, &caller).await?;
    let draft = draft.into_inner();
    if let Err(e) = draft.validate() {
        return Err(failure(e, "VALIDATION_ERROR", &["Title and interviewer are required"]));
    }

    let interview = service
        .schedule_interview(&tenant, job_id, applicant_id, draft)
        .await
        .map_err(|e| failure(e, "SCHEDULE_ERROR", &["Check that the applicant still exists"]))?;

    Ok(Json(DataResponse::success(
        format!("Interview '{}' scheduled", interview.title),
        Identified::new(interview.id.clone(), interview),
    )))
}

pub async fn health_handler(caller: Caller) -> Json<TextResponse> {
    match caller {
        Caller::User { uid } => info!("Health check by user {}", uid),
        Caller::Anonymous => info!("Health check by anonymous caller"),
    }
    Json(TextResponse::success("OK".to_string()))
}

use actix_web::{
    web::{post, scope, Data, ServiceConfig},
    HttpResponse,
};
use actix_web_validator::Json;

use super::models::CreateJobRequest;
use super::service::{JobService, ServiceError};
use crate::upstream::UpstreamApi;

async fn create_job<A: UpstreamApi>(
    service: Data<JobService<A>>,
    job: Json<CreateJobRequest>,
) -> Result<HttpResponse, ServiceError> {
    let created = service.create_job(&job).await?;
    Ok(HttpResponse::Created().json(created))
}

pub fn job_config<A: UpstreamApi>(config: &mut ServiceConfig) {
    config.service(scope("jobs").route("", post().to(create_job::<A>)));
}

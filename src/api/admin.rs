use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::logging::RequestId;
use crate::model::{
    api::election::{CandidateSpec, ElectionDescription, ElectionSpec},
    auth::AuthToken,
    candidate::Candidate,
    clock::{Clock, SharedClock},
    registry::{ElectionId, ElectionRegistry},
};

pub fn routes() -> Vec<Route> {
    routes![
        create_election,
        add_candidate,
        start_registration,
        start_voting,
        end_election,
    ]
}

/// Anyone may create an election; they become its admin.
#[post("/elections", data = "<spec>", format = "json")]
fn create_election(
    token: AuthToken,
    spec: Json<ElectionSpec>,
    registry: &State<ElectionRegistry>,
    clock: &State<SharedClock>,
    request: &RequestId,
) -> Result<Json<ElectionDescription>> {
    let (id, election) = registry.create(
        token.principal(),
        &spec.title,
        &spec.description,
        spec.registration_duration(),
        spec.voting_duration(),
        clock.now(),
    )?;
    info!("{request} election {id} created by {}", token.principal());
    Ok(Json(election.describe()))
}

#[post("/elections/<election_id>/candidates", data = "<candidate>", format = "json")]
fn add_candidate(
    token: AuthToken,
    election_id: ElectionId,
    candidate: Json<CandidateSpec>,
    registry: &State<ElectionRegistry>,
    request: &RequestId,
) -> Result<Json<Candidate>> {
    let candidate = registry
        .get(election_id)?
        .add_candidate(token.principal(), &candidate.name)?;
    info!(
        "{request} election {election_id} gained candidate {} ({})",
        candidate.id, candidate.name
    );
    Ok(Json(candidate))
}

#[post("/elections/<election_id>/registration")]
fn start_registration(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    request: &RequestId,
) -> Result<()> {
    registry
        .get(election_id)?
        .start_registration(token.principal())?;
    info!("{request} election {election_id} opened registration");
    Ok(())
}

#[post("/elections/<election_id>/voting")]
fn start_voting(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    request: &RequestId,
) -> Result<()> {
    registry.get(election_id)?.start_voting(token.principal())?;
    info!("{request} election {election_id} opened voting");
    Ok(())
}

#[post("/elections/<election_id>/end")]
fn end_election(
    token: AuthToken,
    election_id: ElectionId,
    registry: &State<ElectionRegistry>,
    request: &RequestId,
) -> Result<()> {
    registry.get(election_id)?.end(token.principal())?;
    info!("{request} election {election_id} ended");
    Ok(())
}
